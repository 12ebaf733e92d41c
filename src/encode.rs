/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::color::ColorType;
use crate::compress::Compressor;
use crate::error::Error;
use crate::filter::RowFilterer;
use crate::image::RasterImage;
use crate::pack::PixelPacker;

/// Number of bytes in one packed, unfiltered row.
pub(crate) fn bytes_per_row(width: usize, bit_depth: u8, channels: usize) -> usize {
    match bit_depth {
        1 | 2 | 4 => (width * bit_depth as usize + 7) / 8,
        8 => width * channels,
        16 => width * channels * 2,
        _ => unreachable!("bit depths are validated to be one of 1, 2, 4, 8, 16"),
    }
}

/// Filters every row of `image` (prefixing it with a `0x00` filter-type byte) and
/// zlib-compresses the result, returning the compressed byte stream.
///
/// For palette images, `samples_override` supplies the per-pixel index values in place
/// of `image`'s own samples (see [`crate::palette`]).
pub(crate) fn compress_image(
    image: &RasterImage,
    color_type: ColorType,
    bit_depth: u8,
    index_override: Option<&[u8]>,
) -> Result<Vec<u8>, Error> {
    let bytes_per_row = bytes_per_row(image.width(), bit_depth, color_type.channel_count());
    let compressor = Compressor::new(Vec::new());
    let filterer = RowFilterer::new(compressor, bytes_per_row, image.height());
    let mut packer = PixelPacker::new(filterer, bit_depth);

    if let Some(indices) = index_override {
        for row in indices.chunks(image.width()) {
            for &index in row {
                packer.pack(&[index as u16], 1)?;
            }
            packer.pad_row()?;
        }
    } else {
        let mut samples = [0u16; 4];
        for y in 0..image.height() {
            for x in 0..image.width() {
                let n = image.pixel_into(x, y, &mut samples);
                packer.pack(&samples, n)?;
            }
            packer.pad_row()?;
        }
    }

    let filterer = packer.finish()?;
    let compressor = filterer.into_inner();
    Ok(compressor.finish()?)
}

/// Splits a compressed byte stream into contiguous slices of at most `max_chunk_len`
/// bytes, in the stream's natural order. `None` yields the whole stream as one slice.
/// Always yields at least one slice, even for an empty stream.
pub(crate) fn split_chunks(data: &[u8], max_chunk_len: Option<usize>) -> Vec<&[u8]> {
    if data.is_empty() {
        return vec![data];
    }
    match max_chunk_len {
        None => vec![data],
        Some(max) => data.chunks(max).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_per_row_rounds_up_for_sub_byte_depths() {
        assert_eq!(bytes_per_row(11, 1, 1), 2);
        assert_eq!(bytes_per_row(11, 2, 1), 3);
        assert_eq!(bytes_per_row(11, 4, 1), 6);
        assert_eq!(bytes_per_row(25, 8, 4), 100);
    }

    #[test]
    fn split_chunks_respects_max_len() {
        let data = vec![0u8; 10];
        let slices = split_chunks(&data, Some(4));
        assert_eq!(slices.iter().map(|s| s.len()).collect::<Vec<_>>(), vec![4, 4, 2]);
        assert_eq!(slices.concat(), data);
    }

    #[test]
    fn split_chunks_with_no_bound_is_one_slice() {
        let data = vec![1, 2, 3];
        assert_eq!(split_chunks(&data, None), vec![&data[..]]);
    }
}
