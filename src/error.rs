/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Display, Formatter};

use crate::color::ColorType;

/// Errors produced while encoding a PNG or APNG stream.
#[derive(Debug)]
pub enum Error {
    /// Input array rank/channel combination doesn't match any recognized color model.
    UnsupportedShape { width: usize, height: usize, channels: usize },
    /// A bit-depth override is incompatible with the inferred color type.
    BitDepthConflict { bit_depth: u8, color_type: ColorType },
    /// A transparent color was requested for a color type that already carries alpha.
    TransparentWithAlpha { color_type: ColorType },
    /// More than 256 distinct colors were found while building a palette.
    PaletteOverflow { found: usize },
    /// An APNG frame's shape or sample width differs from the first frame's.
    FrameShapeMismatch,
    /// An option value is invalid, or an invalid combination of options was given.
    InvalidOption { detail: &'static str },
    /// A chunk payload exceeds the PNG length limit of 2^31 - 1 bytes.
    OversizedChunk { len: usize },
    /// Propagated unchanged from the byte sink.
    Io { source: std::io::Error },
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        match self {
            Error::UnsupportedShape { width, height, channels } => write!(
                fmt,
                "unsupported image shape: {}x{} with {} channel(s)",
                width, height, channels
            ),
            Error::BitDepthConflict { bit_depth, color_type } => {
                write!(fmt, "bit depth {} is not valid for color type {}", bit_depth, color_type)
            },
            Error::TransparentWithAlpha { color_type } => {
                write!(fmt, "transparent color is not valid for color type {} (already has alpha)", color_type)
            },
            Error::PaletteOverflow { found } => {
                write!(fmt, "palette overflow: found {} distinct colors, limit is 256", found)
            },
            Error::FrameShapeMismatch => fmt.write_str("apng frame shape/dtype does not match the first frame"),
            Error::InvalidOption { detail } => write!(fmt, "invalid option: {}", detail),
            Error::OversizedChunk { len } => {
                write!(fmt, "chunk payload of {} bytes exceeds the 2^31-1 byte limit", len)
            },
            Error::Io { source } => write!(fmt, "i/o error: {}", source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Error {
        Error::Io { source }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn 'static + std::error::Error)> {
        match self {
            Error::Io { source } => Some(source),
            _ => None,
        }
    }
}
