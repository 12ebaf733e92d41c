/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::error::Error;

/// A requested transparent color, to be emitted as `tRNS`.
///
/// Only valid for `Gray`/`Rgb` color types; requesting one for an image that already
/// carries an alpha channel is an [`Error::TransparentWithAlpha`].
#[derive(Clone, Copy, Debug)]
pub enum Transparent {
    /// A single sample, for grayscale images.
    Gray(u16),
    /// An (r, g, b) triplet, for RGB images.
    Rgb(u16, u16, u16),
}

/// A calendar timestamp for the `tIME` chunk.
#[derive(Clone, Copy, Debug)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Options controlling how [`crate::write_png`] encodes an image.
#[derive(Clone, Debug, Default)]
pub struct PngOptions {
    /// Bit-depth override; only valid for 8-bit grayscale input, with a value in
    /// `{1, 2, 4}`.
    pub bit_depth: Option<u8>,
    /// A transparent color to emit as `tRNS`.
    pub transparent: Option<Transparent>,
    /// Build a palette (`PLTE`/color type 3) for 8-bit RGB/RGBA input.
    pub use_palette: bool,
    /// Upper bound on the payload length of any `IDAT`/`fdAT` chunk. `None` means no
    /// bound: the whole compressed stream is written as a single chunk.
    pub max_chunk_len: Option<usize>,
    /// Timestamp to emit as `tIME`.
    pub timestamp: Option<Timestamp>,
    /// Gamma value to emit as `gAMA`, stored as `round(gamma * 100000)`.
    pub gamma: Option<f64>,
}

impl PngOptions {
    /// Validates option values that don't depend on the image being encoded.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if let Some(max_chunk_len) = self.max_chunk_len {
            if max_chunk_len == 0 {
                return Err(Error::InvalidOption { detail: "max_chunk_len must be positive" });
            }
        }
        if let Some(gamma) = self.gamma {
            if !gamma.is_finite() || gamma < 0.0 {
                return Err(Error::InvalidOption { detail: "gamma must be a non-negative, finite number" });
            }
        }
        Ok(())
    }
}

/// A per-frame control value that may be given once (and broadcast to every frame) or
/// once per frame.
///
/// Mirrors the scalar-or-vector convenience the APNG writer offers for its per-frame
/// control lists (`delay_num`, `delay_den`, `dispose_op`, `blend_op`, `x_offset`,
/// `y_offset`).
#[derive(Clone, Debug)]
pub enum Broadcast<T> {
    Scalar(T),
    PerFrame(Vec<T>),
}

impl<T: Copy> Broadcast<T> {
    /// Resolves this value into exactly `n` entries, one per frame.
    pub fn resolve(self, n: usize) -> Result<Vec<T>, Error> {
        match self {
            Broadcast::Scalar(value) => Ok(vec![value; n]),
            Broadcast::PerFrame(values) => {
                if values.len() != n {
                    return Err(Error::InvalidOption {
                        detail: "per-frame control list length must match the number of frames",
                    });
                }
                Ok(values)
            },
        }
    }
}

impl<T> From<T> for Broadcast<T> {
    fn from(value: T) -> Broadcast<T> {
        Broadcast::Scalar(value)
    }
}

/// Options controlling how [`crate::write_apng`] encodes a frame sequence.
#[derive(Clone, Debug)]
pub struct ApngOptions {
    pub png: PngOptions,
    /// Number of times the animation plays; `0` means loop forever.
    pub num_plays: u32,
    pub delay_num: Broadcast<u16>,
    pub delay_den: Broadcast<u16>,
    pub dispose_op: Broadcast<u8>,
    pub blend_op: Broadcast<u8>,
    pub x_offset: Broadcast<u32>,
    pub y_offset: Broadcast<u32>,
}

impl Default for ApngOptions {
    fn default() -> Self {
        ApngOptions {
            png: PngOptions::default(),
            num_plays: 0,
            delay_num: Broadcast::Scalar(0),
            delay_den: Broadcast::Scalar(1),
            dispose_op: Broadcast::Scalar(0),
            blend_op: Broadcast::Scalar(1),
            x_offset: Broadcast::Scalar(0),
            y_offset: Broadcast::Scalar(0),
        }
    }
}
