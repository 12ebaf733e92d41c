/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Encodes in-memory raster images into PNG, and frame sequences into Animated PNG
//! (APNG), writing the byte stream directly to a caller-supplied sink.
//!
//! The two entry points are [`write_png`] and [`write_apng`]. Both take a
//! [`RasterImage`] (or a slice of them, for APNG) plus an options struct, and write a
//! complete, CRC-framed chunk stream. Decoding is out of scope.

mod apng;
mod chunk;
mod color;
mod compress;
mod encode;
mod error;
mod filter;
mod image;
mod options;
mod pack;
mod palette;
mod png;

pub use apng::write_apng;
pub use color::{ColorModel, ColorType};
pub use error::Error;
pub use image::{Channels, RasterImage, SampleBuf};
pub use options::{ApngOptions, Broadcast, PngOptions, Timestamp, Transparent};
pub use png::write_png;
