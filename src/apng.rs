/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::io::Write;

use byteorder::{WriteBytesExt, BE};

use crate::chunk::{write_chunk, ChunkId};
use crate::color::infer_color_model;
use crate::encode::{compress_image, split_chunks};
use crate::error::Error;
use crate::image::RasterImage;
use crate::options::ApngOptions;
use crate::palette::build_palette;
use crate::png::{write_ancillary_chunks, write_ihdr, SIGNATURE};

/// Resolved per-frame control fields, after broadcasting [`crate::options::Broadcast`]
/// values across the frame count.
struct FrameControl {
    delay_num: u16,
    delay_den: u16,
    dispose_op: u8,
    blend_op: u8,
    x_offset: u32,
    y_offset: u32,
}

/// Encodes a sequence of equal-shape raster images as a complete APNG byte stream.
///
/// `frames` must be non-empty; every frame after the first must share the first
/// frame's width, height, channel layout, and sample width, or [`Error::FrameShapeMismatch`]
/// is returned.
pub fn write_apng<W: Write>(mut sink: W, frames: &[RasterImage], options: &ApngOptions) -> Result<(), Error> {
    options.png.validate()?;
    if frames.is_empty() {
        return Err(Error::InvalidOption { detail: "write_apng requires at least one frame" });
    }
    let first = &frames[0];
    for frame in &frames[1..] {
        if frame.width() != first.width()
            || frame.height() != first.height()
            || frame.channels() != first.channels()
            || frame.is_u8() != first.is_u8()
        {
            return Err(Error::FrameShapeMismatch);
        }
    }

    let n = frames.len();
    let controls = resolve_controls(options, n)?;

    let model = infer_color_model(first, &options.png)?;
    let is_palette = model.color_type == crate::color::ColorType::Index;

    sink.write_all(&SIGNATURE)?;
    write_ihdr(&mut sink, first.width() as u32, first.height() as u32, model)?;
    let first_palette = if is_palette { Some(build_palette(first)?) } else { None };
    write_ancillary_chunks(&mut sink, model.color_type, &options.png, first_palette.as_ref())?;

    let mut payload = Vec::with_capacity(8);
    payload.write_u32::<BE>(n as u32)?;
    payload.write_u32::<BE>(options.num_plays)?;
    write_chunk(&mut sink, ChunkId::acTL, &payload)?;

    let mut seq: u32 = 0;
    for (k, frame) in frames.iter().enumerate() {
        let control = &controls[k];
        write_fctl(&mut sink, seq, frame, control)?;
        seq += 1;

        let later_palette = if is_palette && k > 0 { Some(build_palette(frame)?) } else { None };
        let index_override = if k == 0 {
            first_palette.as_ref().map(|p| p.indices.as_slice())
        } else {
            later_palette.as_ref().map(|p| p.indices.as_slice())
        };
        let compressed = compress_image(frame, model.color_type, model.bit_depth, index_override)?;

        if k == 0 {
            for slice in split_chunks(&compressed, options.png.max_chunk_len) {
                write_chunk(&mut sink, ChunkId::IDAT, slice)?;
            }
        } else {
            for slice in split_chunks(&compressed, options.png.max_chunk_len) {
                let mut fdat_payload = Vec::with_capacity(4 + slice.len());
                fdat_payload.write_u32::<BE>(seq)?;
                fdat_payload.extend_from_slice(slice);
                write_chunk(&mut sink, ChunkId::fdAT, &fdat_payload)?;
                seq += 1;
            }
        }
    }

    write_chunk(&mut sink, ChunkId::IEND, &[])?;
    Ok(())
}

fn write_fctl<W: Write>(sink: &mut W, seq: u32, frame: &RasterImage, control: &FrameControl) -> Result<(), Error> {
    let mut payload = Vec::with_capacity(26);
    payload.write_u32::<BE>(seq)?;
    payload.write_u32::<BE>(frame.width() as u32)?;
    payload.write_u32::<BE>(frame.height() as u32)?;
    payload.write_u32::<BE>(control.x_offset)?;
    payload.write_u32::<BE>(control.y_offset)?;
    payload.write_u16::<BE>(control.delay_num)?;
    payload.write_u16::<BE>(control.delay_den)?;
    payload.write_u8(control.dispose_op)?;
    payload.write_u8(control.blend_op)?;
    write_chunk(sink, ChunkId::fcTL, &payload)
}

fn resolve_controls(options: &ApngOptions, n: usize) -> Result<Vec<FrameControl>, Error> {
    let delay_num = options.delay_num.clone().resolve(n)?;
    let delay_den = options.delay_den.clone().resolve(n)?;
    let dispose_op = options.dispose_op.clone().resolve(n)?;
    let blend_op = options.blend_op.clone().resolve(n)?;
    let x_offset = options.x_offset.clone().resolve(n)?;
    let y_offset = options.y_offset.clone().resolve(n)?;

    if delay_den.iter().any(|&d| d == 0) {
        return Err(Error::InvalidOption { detail: "delay_den must be non-zero" });
    }

    Ok((0..n)
        .map(|i| FrameControl {
            delay_num: delay_num[i],
            delay_den: delay_den[i],
            dispose_op: dispose_op[i],
            blend_op: blend_op[i],
            x_offset: x_offset[i],
            y_offset: y_offset[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PngOptions;

    fn chunks_of(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut out = Vec::new();
        let mut rest = &bytes[8..];
        while !rest.is_empty() {
            let len = u32::from_be_bytes(rest[0..4].try_into().unwrap()) as usize;
            let id = std::str::from_utf8(&rest[4..8]).unwrap().to_string();
            let payload = rest[8..8 + len].to_vec();
            out.push((id, payload));
            rest = &rest[12 + len..];
        }
        out
    }

    #[test]
    fn four_frame_rgba_sequence_numbers() {
        let frames: Vec<RasterImage> =
            (0..4).map(|_| RasterImage::rgba8(25, 15, vec![0u8; 25 * 15 * 4]).unwrap()).collect();
        let options = ApngOptions { png: PngOptions::default(), ..Default::default() };
        let mut out = Vec::new();
        write_apng(&mut out, &frames, &options).unwrap();

        let chunks = chunks_of(&out);
        assert_eq!(chunks[0].0, "IHDR");
        assert_eq!(chunks[1].0, "acTL");
        assert_eq!(chunks[1].1, vec![0, 0, 0, 4, 0, 0, 0, 0]);
        assert_eq!(chunks[2].0, "fcTL");
        assert_eq!(u32::from_be_bytes(chunks[2].1[0..4].try_into().unwrap()), 0);
        assert_eq!(chunks[3].0, "IDAT");

        let mut seqs = Vec::new();
        for (id, payload) in &chunks {
            if id == "fcTL" || id == "fdAT" {
                seqs.push(u32::from_be_bytes(payload[0..4].try_into().unwrap()));
            }
        }
        assert_eq!(seqs, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(chunks.last().unwrap().0, "IEND");
    }

    #[test]
    fn rejects_mismatched_frame_shapes() {
        let frames = vec![
            RasterImage::rgba8(4, 4, vec![0u8; 4 * 4 * 4]).unwrap(),
            RasterImage::rgba8(5, 4, vec![0u8; 5 * 4 * 4]).unwrap(),
        ];
        let options = ApngOptions::default();
        assert!(matches!(write_apng(Vec::new(), &frames, &options), Err(Error::FrameShapeMismatch)));
    }

    #[test]
    fn rejects_empty_frame_sequence() {
        let frames: Vec<RasterImage> = Vec::new();
        let options = ApngOptions::default();
        assert!(matches!(write_apng(Vec::new(), &frames, &options), Err(Error::InvalidOption { .. })));
    }
}
