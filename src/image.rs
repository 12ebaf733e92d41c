/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::error::Error;

/// Channel layout of a [`RasterImage`], independent of element width.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Channels {
    /// Single-channel grayscale.
    Gray,
    /// Grayscale plus alpha.
    GrayAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
}

impl Channels {
    /// Number of samples per pixel for this channel layout.
    pub const fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::GrayAlpha => 2,
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }
}

/// The sample buffer backing a [`RasterImage`], tagged by element width.
///
/// Samples are stored row-major, with channels interleaved per pixel (matching the
/// `(H, W)` / `(H, W, C)` layout described by the pixel array data model).
#[derive(Clone, Debug)]
pub enum SampleBuf {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl SampleBuf {
    fn len(&self) -> usize {
        match self {
            SampleBuf::U8(v) => v.len(),
            SampleBuf::U16(v) => v.len(),
        }
    }

    /// Bit depth of a single raw sample, before any bit-depth override is applied.
    pub fn native_bit_depth(&self) -> u8 {
        match self {
            SampleBuf::U8(_) => 8,
            SampleBuf::U16(_) => 16,
        }
    }
}

/// A rectangular array of pixel samples: the encoder's input data model.
///
/// This is the tagged-variant stand-in for the shape/dtype inspection a dynamically
/// typed encoder would perform at runtime: `channels` and `samples` together carry
/// everything [`crate::color::infer_color_model`] needs.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) channels: Channels,
    pub(crate) samples: SampleBuf,
}

impl RasterImage {
    /// Constructs a raster image, validating that `samples` holds exactly
    /// `width * height * channels.count()` elements.
    pub fn new(width: usize, height: usize, channels: Channels, samples: SampleBuf) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::UnsupportedShape { width, height, channels: channels.count() });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels.count()))
            .ok_or(Error::UnsupportedShape { width, height, channels: channels.count() })?;
        if samples.len() != expected {
            return Err(Error::UnsupportedShape { width, height, channels: channels.count() });
        }
        Ok(RasterImage { width, height, channels, samples })
    }

    /// Constructs an 8-bit grayscale image from row-major samples.
    pub fn gray8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::Gray, SampleBuf::U8(samples))
    }

    /// Constructs a 16-bit grayscale image from row-major samples.
    pub fn gray16(width: usize, height: usize, samples: Vec<u16>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::Gray, SampleBuf::U16(samples))
    }

    /// Constructs an 8-bit gray+alpha image from row-major, channel-interleaved samples.
    pub fn gray_alpha8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::GrayAlpha, SampleBuf::U8(samples))
    }

    /// Constructs a 16-bit gray+alpha image from row-major, channel-interleaved samples.
    pub fn gray_alpha16(width: usize, height: usize, samples: Vec<u16>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::GrayAlpha, SampleBuf::U16(samples))
    }

    /// Constructs an 8-bit RGB image from row-major, channel-interleaved samples.
    pub fn rgb8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::Rgb, SampleBuf::U8(samples))
    }

    /// Constructs a 16-bit RGB image from row-major, channel-interleaved samples.
    pub fn rgb16(width: usize, height: usize, samples: Vec<u16>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::Rgb, SampleBuf::U16(samples))
    }

    /// Constructs an 8-bit RGBA image from row-major, channel-interleaved samples.
    pub fn rgba8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::Rgba, SampleBuf::U8(samples))
    }

    /// Constructs a 16-bit RGBA image from row-major, channel-interleaved samples.
    pub fn rgba16(width: usize, height: usize, samples: Vec<u16>) -> Result<Self, Error> {
        RasterImage::new(width, height, Channels::Rgba, SampleBuf::U16(samples))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Returns the samples for one pixel at `(x, y)` as up to 4 16-bit-widened values,
    /// along with how many of `out`'s slots are populated.
    pub(crate) fn pixel_into(&self, x: usize, y: usize, out: &mut [u16; 4]) -> usize {
        let n = self.channels.count();
        let index = (y * self.width + x) * n;
        match &self.samples {
            SampleBuf::U8(v) => {
                for i in 0..n {
                    out[i] = v[index + i] as u16;
                }
            },
            SampleBuf::U16(v) => {
                for i in 0..n {
                    out[i] = v[index + i];
                }
            },
        }
        n
    }

    /// True if every sample is stored as `u8`.
    pub(crate) fn is_u8(&self) -> bool {
        matches!(self.samples, SampleBuf::U8(_))
    }

    /// Returns the raw sample slice if this image is 8-bit, or `None` for 16-bit.
    pub(crate) fn u8_samples(&self) -> Option<&[u8]> {
        match &self.samples {
            SampleBuf::U8(v) => Some(v),
            SampleBuf::U16(_) => None,
        }
    }
}
