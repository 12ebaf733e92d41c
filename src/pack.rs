/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::io::Write;

use byteorder::{WriteBytesExt, BE};

/// Packs one pixel's worth of samples at a time into a byte stream at a given bit
/// depth, MSB-first for sub-byte depths, zero-padding the final byte of each row.
///
/// For 1/2/4-bit depths only a single sample per pixel is expected (grayscale or
/// palette index); for 8/16-bit depths up to 4 channels are packed per pixel,
/// interleaved in channel order.
pub struct PixelPacker<W: Write> {
    bit_depth: u8,
    byte: u8,
    inner: W,
    mask: u8,
    pos: u8,
}

impl<W: Write> PixelPacker<W> {
    pub fn new(inner: W, bit_depth: u8) -> PixelPacker<W> {
        debug_assert!(matches!(bit_depth, 1 | 2 | 4 | 8 | 16));
        PixelPacker {
            bit_depth,
            byte: 0,
            inner,
            mask: ((1u32 << bit_depth) - 1) as u8,
            pos: 0,
        }
    }

    /// Packs `samples[..n]` (one 16-bit-widened value per channel) as a single pixel.
    pub fn pack(&mut self, samples: &[u16], n: usize) -> std::io::Result<()> {
        match self.bit_depth {
            1 | 2 | 4 => {
                let sample = samples[0] as u8;
                self.byte |= (sample & self.mask) << (8 - self.bit_depth - self.pos);
                self.pos += self.bit_depth;
                if self.pos == 8 {
                    let byte = self.byte;
                    self.byte = 0;
                    self.pos = 0;
                    self.inner.write_u8(byte)?;
                }
                Ok(())
            },
            8 => {
                let mut bytes = [0u8; 4];
                for i in 0..n {
                    bytes[i] = samples[i] as u8;
                }
                self.inner.write_all(&bytes[..n])
            },
            16 => {
                let mut bytes = [0u8; 8];
                for i in 0..n {
                    <BE as byteorder::ByteOrder>::write_u16(&mut bytes[(i * 2)..], samples[i]);
                }
                self.inner.write_all(&bytes[..(n * 2)])
            },
            _ => unreachable!(),
        }
    }

    /// Zero-pads and flushes any partially packed byte, then resets state so the next
    /// sample starts a fresh byte. Every row of sub-byte-depth pixels ends with a call
    /// to this, independent of whether the row's sample count divides evenly into
    /// whole bytes. A no-op at 8/16-bit depths, which never leave a partial byte.
    pub fn pad_row(&mut self) -> std::io::Result<()> {
        if self.pos != 0 {
            let byte = self.byte;
            self.byte = 0;
            self.pos = 0;
            self.inner.write_u8(byte)?;
        }
        Ok(())
    }

    /// Pads any partial final row and returns the inner writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.pad_row()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_sub_byte_samples_msb_first_with_padding() {
        let mut out = Vec::new();
        {
            let mut packer = PixelPacker::new(&mut out, 1);
            for bit in [1u16, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1] {
                packer.pack(&[bit], 1).unwrap();
            }
            packer.finish().unwrap();
        }
        // 11 bits -> ceil(11/8) = 2 bytes, final byte zero-padded in the low bits.
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], 0b1011_0101);
        assert_eq!(out[1], 0b1010_0000);
    }

    #[test]
    fn pad_row_resets_between_rows_at_sub_byte_depth() {
        let mut out = Vec::new();
        {
            // Two 3-bit-wide rows at 1-bit depth: each must pad independently to a
            // whole byte rather than packing continuously across the row boundary.
            let mut packer = PixelPacker::new(&mut out, 1);
            for bit in [1u16, 0, 1] {
                packer.pack(&[bit], 1).unwrap();
            }
            packer.pad_row().unwrap();
            for bit in [0u16, 1, 1] {
                packer.pack(&[bit], 1).unwrap();
            }
            packer.pad_row().unwrap();
            packer.finish().unwrap();
        }
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], 0b1010_0000);
        assert_eq!(out[1], 0b0110_0000);
    }

    #[test]
    fn packs_16_bit_multichannel_big_endian() {
        let mut out = Vec::new();
        {
            let mut packer = PixelPacker::new(&mut out, 16);
            packer.pack(&[0x0102, 0x0304, 0x0506], 3).unwrap();
            packer.finish().unwrap();
        }
        assert_eq!(out, vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }
}
