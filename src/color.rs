/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Display, Formatter};

use crate::error::Error;
use crate::image::{Channels, RasterImage};
use crate::options::PngOptions;

/// PNG color type, as recorded in the `IHDR` chunk.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum ColorType {
    Gray = 0,
    Rgb = 2,
    Index = 3,
    GrayAlpha = 4,
    RgbAlpha = 6,
}

impl ColorType {
    /// Returns the number of channels in each pixel for this color type.
    pub const fn channel_count(self) -> usize {
        match self {
            ColorType::Gray => 1,
            ColorType::Rgb => 3,
            ColorType::Index => 1,
            ColorType::GrayAlpha => 2,
            ColorType::RgbAlpha => 4,
        }
    }

    /// Validates a bit depth against this color type, per the PNG 1.2 table.
    pub fn check_bit_depth(self, bit_depth: u8) -> Result<u8, Error> {
        let ok = match self {
            ColorType::Gray => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
            ColorType::Rgb => matches!(bit_depth, 8 | 16),
            ColorType::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
            ColorType::GrayAlpha => matches!(bit_depth, 8 | 16),
            ColorType::RgbAlpha => matches!(bit_depth, 8 | 16),
        };
        if ok {
            Ok(bit_depth)
        } else {
            Err(Error::BitDepthConflict { bit_depth, color_type: self })
        }
    }

    const fn description(self) -> &'static str {
        match self {
            ColorType::Gray => "gray",
            ColorType::Rgb => "rgb",
            ColorType::Index => "index",
            ColorType::GrayAlpha => "gray alpha",
            ColorType::RgbAlpha => "rgb alpha",
        }
    }
}

impl Display for ColorType {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        fmt.write_str(self.description())
    }
}

/// The inferred PNG color model for an image: its `IHDR` color type and bit depth.
#[derive(Clone, Copy, Debug)]
pub struct ColorModel {
    pub color_type: ColorType,
    pub bit_depth: u8,
}

/// Infers the PNG color model for `image` under `options`, per the color-model inference table.
///
/// Rules are checked in order; the first match wins. Fails with
/// [`Error::UnsupportedShape`] if nothing matches, [`Error::BitDepthConflict`] if a
/// bit-depth override is incompatible with the color type it would apply to, and
/// [`Error::TransparentWithAlpha`] if a transparent color is requested for a
/// color type that already carries an alpha channel.
pub fn infer_color_model(image: &RasterImage, options: &PngOptions) -> Result<ColorModel, Error> {
    let wants_palette =
        options.use_palette && matches!(image.channels, Channels::Rgb | Channels::Rgba) && image.is_u8();

    let color_type = if wants_palette {
        ColorType::Index
    } else {
        match image.channels {
            Channels::Gray => ColorType::Gray,
            Channels::GrayAlpha => ColorType::GrayAlpha,
            Channels::Rgb => ColorType::Rgb,
            Channels::Rgba => ColorType::RgbAlpha,
        }
    };

    // A bit-depth override only applies to 8-bit grayscale input packing down to a
    // sub-byte depth; anything else is a conflict rather than a silent no-op.
    let bit_depth = match options.bit_depth {
        None => {
            if color_type == ColorType::Index {
                8
            } else {
                image.samples.native_bit_depth()
            }
        },
        Some(bit_depth) => {
            let applies = color_type == ColorType::Gray && image.is_u8() && matches!(bit_depth, 1 | 2 | 4);
            if !applies {
                return Err(Error::BitDepthConflict { bit_depth, color_type });
            }
            bit_depth
        },
    };
    let bit_depth = color_type.check_bit_depth(bit_depth)?;
    let model = ColorModel { color_type, bit_depth };

    if options.transparent.is_some() {
        if matches!(model.color_type, ColorType::GrayAlpha | ColorType::RgbAlpha) {
            return Err(Error::TransparentWithAlpha { color_type: model.color_type });
        }
        if options.use_palette {
            return Err(Error::InvalidOption {
                detail: "use_palette combined with an explicit transparent color is not supported",
            });
        }
    }

    Ok(model)
}
