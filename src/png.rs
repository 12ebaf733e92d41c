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
use crate::color::{infer_color_model, ColorModel, ColorType};
use crate::encode::{compress_image, split_chunks};
use crate::error::Error;
use crate::image::RasterImage;
use crate::options::{PngOptions, Transparent};
use crate::palette::{build_palette, Palette};

/// The 8-byte sequence every PNG stream begins with.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Encodes a single raster image as a complete PNG byte stream, writing it to `sink`.
pub fn write_png<W: Write>(mut sink: W, image: &RasterImage, options: &PngOptions) -> Result<(), Error> {
    options.validate()?;
    let model = infer_color_model(image, options)?;

    sink.write_all(&SIGNATURE)?;
    write_ihdr(&mut sink, image.width() as u32, image.height() as u32, model)?;

    let palette = if model.color_type == ColorType::Index { Some(build_palette(image)?) } else { None };
    write_ancillary_chunks(&mut sink, model.color_type, options, palette.as_ref())?;

    let index_override = palette.as_ref().map(|p| p.indices.as_slice());
    let compressed = compress_image(image, model.color_type, model.bit_depth, index_override)?;
    for slice in split_chunks(&compressed, options.max_chunk_len) {
        write_chunk(&mut sink, ChunkId::IDAT, slice)?;
    }

    write_chunk(&mut sink, ChunkId::IEND, &[])?;
    Ok(())
}

/// Writes the `IHDR` chunk.
pub(crate) fn write_ihdr<W: Write>(sink: &mut W, width: u32, height: u32, model: ColorModel) -> Result<(), Error> {
    let mut payload = Vec::with_capacity(13);
    payload.write_u32::<BE>(width)?;
    payload.write_u32::<BE>(height)?;
    payload.write_u8(model.bit_depth)?;
    payload.write_u8(model.color_type as u8)?;
    payload.write_u8(0)?; // compression method
    payload.write_u8(0)?; // filter method
    payload.write_u8(0)?; // interlace method
    write_chunk(sink, ChunkId::IHDR, &payload)
}

/// Writes the ancillary chunks that may follow `IHDR` and precede the image data:
/// `PLTE`/`tRNS` (palette), `tRNS` (transparent color), `tIME`, `gAMA`.
pub(crate) fn write_ancillary_chunks<W: Write>(
    sink: &mut W,
    color_type: ColorType,
    options: &PngOptions,
    palette: Option<&Palette>,
) -> Result<(), Error> {
    if let Some(palette) = palette {
        write_plte(sink, palette)?;
        if let Some(alphas) = &palette.alphas {
            write_chunk(sink, ChunkId::tRNS, alphas)?;
        }
    }

    if let (ColorType::Gray | ColorType::Rgb, Some(transparent)) = (color_type, options.transparent) {
        write_transparent(sink, transparent)?;
    }

    if let Some(timestamp) = &options.timestamp {
        let mut payload = Vec::with_capacity(7);
        payload.write_u16::<BE>(timestamp.year)?;
        payload.write_u8(timestamp.month)?;
        payload.write_u8(timestamp.day)?;
        payload.write_u8(timestamp.hour)?;
        payload.write_u8(timestamp.minute)?;
        payload.write_u8(timestamp.second)?;
        write_chunk(sink, ChunkId::tIME, &payload)?;
    }

    if let Some(gamma) = options.gamma {
        let mut payload = Vec::with_capacity(4);
        payload.write_u32::<BE>((gamma * 100_000.0).round() as u32)?;
        write_chunk(sink, ChunkId::gAMA, &payload)?;
    }

    Ok(())
}

fn write_plte<W: Write>(sink: &mut W, palette: &Palette) -> Result<(), Error> {
    let mut payload = Vec::with_capacity(palette.colors.len() * 3);
    for color in &palette.colors {
        payload.extend_from_slice(color);
    }
    write_chunk(sink, ChunkId::PLTE, &payload)
}

fn write_transparent<W: Write>(sink: &mut W, transparent: Transparent) -> Result<(), Error> {
    let mut payload = Vec::with_capacity(6);
    match transparent {
        Transparent::Gray(value) => payload.write_u16::<BE>(value)?,
        Transparent::Rgb(r, g, b) => {
            payload.write_u16::<BE>(r)?;
            payload.write_u16::<BE>(g)?;
            payload.write_u16::<BE>(b)?;
        },
    }
    write_chunk(sink, ChunkId::tRNS, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RasterImage;

    fn decompress(mut data: &[u8]) -> Vec<u8> {
        use std::io::Read;
        let mut out = Vec::new();
        flate2::read::ZlibDecoder::new(&mut data).read_to_end(&mut out).unwrap();
        out
    }

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
    fn grayscale_1bit_with_transparency() {
        let image = RasterImage::gray8(11, 3, vec![1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1].repeat(3)).unwrap();
        let options = PngOptions {
            bit_depth: Some(1),
            transparent: Some(Transparent::Gray(0)),
            ..Default::default()
        };
        let mut out = Vec::new();
        write_png(&mut out, &image, &options).unwrap();

        assert_eq!(&out[0..8], &SIGNATURE);
        let chunks = chunks_of(&out);
        assert_eq!(chunks[0].0, "IHDR");
        assert_eq!(chunks[0].1, vec![0, 0, 0, 11, 0, 0, 0, 3, 1, 0, 0, 0, 0]);
        assert_eq!(chunks[1].0, "tRNS");
        assert_eq!(chunks[1].1, vec![0, 0]);
        assert_eq!(chunks[2].0, "IDAT");
        assert_eq!(chunks.last().unwrap().0, "IEND");

        let decompressed = decompress(&chunks[2].1);
        assert_eq!(decompressed.len(), 3 * (1 + 2));
        for row in decompressed.chunks(3) {
            assert_eq!(row[0], 0);
        }
    }

    #[test]
    fn rgba_8bit_single_idat() {
        let samples = vec![0u8; 25 * 15 * 4];
        let image = RasterImage::rgba8(25, 15, samples).unwrap();
        let mut out = Vec::new();
        write_png(&mut out, &image, &PngOptions::default()).unwrap();
        let chunks = chunks_of(&out);
        assert_eq!(chunks[0].1[8], 8); // bit depth
        assert_eq!(chunks[0].1[9], 6); // color type
        assert_eq!(chunks[1].0, "IDAT");
        let decompressed = decompress(&chunks[1].1);
        assert_eq!(decompressed.len(), 15 * (1 + 100));
    }

    #[test]
    fn rgb_16bit_transparent_triplet() {
        let samples = vec![0u16; 24 * 10 * 3];
        let image = RasterImage::rgb16(24, 10, samples).unwrap();
        let options = PngOptions { transparent: Some(Transparent::Rgb(0, 0, 0)), ..Default::default() };
        let mut out = Vec::new();
        write_png(&mut out, &image, &options).unwrap();
        let chunks = chunks_of(&out);
        assert_eq!(chunks[0].1, vec![0, 0, 0, 24, 0, 0, 0, 10, 16, 2, 0, 0, 0]);
        assert_eq!(chunks[1].0, "tRNS");
        assert_eq!(chunks[1].1, vec![0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn palette_from_ramp() {
        let samples: Vec<u8> = (0..60).collect();
        let image = RasterImage::rgb8(5, 4, samples).unwrap();
        let options = PngOptions { use_palette: true, ..Default::default() };
        let mut out = Vec::new();
        write_png(&mut out, &image, &options).unwrap();
        let chunks = chunks_of(&out);
        assert_eq!(chunks[0].1, vec![0, 0, 0, 5, 0, 0, 0, 4, 8, 3, 0, 0, 0]);
        assert_eq!(chunks[1].0, "PLTE");
        assert_eq!(chunks[1].1.len(), 60);
        assert_eq!(chunks[1].1, (0..60).collect::<Vec<u8>>());
        let idat = &chunks.iter().find(|(id, _)| id == "IDAT").unwrap().1;
        let decompressed = decompress(idat);
        assert_eq!(decompressed.len(), 4 * (1 + 5));
        let mut expected_index = 0u8;
        for row in decompressed.chunks(6) {
            assert_eq!(row[0], 0);
            for &b in &row[1..] {
                assert_eq!(b, expected_index);
                expected_index += 1;
            }
        }
    }

    #[test]
    fn chunk_splitting_respects_max_chunk_len() {
        let samples = vec![0u8; 250 * 150];
        let image = RasterImage::gray8(250, 150, samples).unwrap();
        let options = PngOptions { max_chunk_len: Some(500), ..Default::default() };
        let mut out = Vec::new();
        write_png(&mut out, &image, &options).unwrap();
        let chunks = chunks_of(&out);
        let idat_chunks: Vec<_> = chunks.iter().filter(|(id, _)| id == "IDAT").collect();
        assert!(idat_chunks.len() > 1);
        for (_, payload) in &idat_chunks {
            assert!(payload.len() <= 500);
        }
        let mut compressed = Vec::new();
        for (_, payload) in &idat_chunks {
            compressed.extend_from_slice(payload);
        }
        let decompressed = decompress(&compressed);
        assert_eq!(decompressed.len(), 150 * (1 + 250));
    }

    #[test]
    fn rejects_palette_combined_with_transparent() {
        let samples: Vec<u8> = vec![0; 4 * 4 * 3];
        let image = RasterImage::rgb8(4, 4, samples).unwrap();
        let options = PngOptions {
            use_palette: true,
            transparent: Some(Transparent::Rgb(0, 0, 0)),
            ..Default::default()
        };
        assert!(matches!(write_png(Vec::new(), &image, &options), Err(Error::InvalidOption { .. })));
    }
}
