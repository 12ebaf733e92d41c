/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use crate::error::Error;
use crate::image::{Channels, RasterImage};

const MAX_PALETTE_LEN: usize = 256;

/// An ordered, de-duplicated set of colors built from an 8-bit RGB(A) image, plus the
/// per-pixel index plane referencing it.
pub struct Palette {
    /// Up to 256 distinct RGB triplets, in first-seen order.
    pub colors: Vec<[u8; 3]>,
    /// Alpha values for a prefix of `colors`; trailing fully-opaque entries are omitted,
    /// per the `tRNS` chunk's "implicitly opaque" convention. `None` if the source had
    /// no alpha channel, or every pixel was fully opaque.
    pub alphas: Option<Vec<u8>>,
    /// One index into `colors` per pixel, in row-major order.
    pub indices: Vec<u8>,
}

/// Builds a palette from an 8-bit, 3- or 4-channel image, per the first-seen-order
/// palette rules. Fails with [`Error::PaletteOverflow`] if more than 256 distinct
/// colors are found.
pub fn build_palette(image: &RasterImage) -> Result<Palette, Error> {
    let has_alpha = image.channels() == Channels::Rgba;
    let channel_count = image.channels().count();
    let samples = image
        .u8_samples()
        .expect("build_palette is only called for 8-bit RGB(A) images");

    let mut index_of: HashMap<(u8, u8, u8, u8), u8> = HashMap::new();
    let mut colors = Vec::new();
    let mut alphas = Vec::new();
    let mut indices = Vec::with_capacity(image.width() * image.height());

    for pixel in samples.chunks_exact(channel_count) {
        let key = if has_alpha {
            (pixel[0], pixel[1], pixel[2], pixel[3])
        } else {
            (pixel[0], pixel[1], pixel[2], 255)
        };

        let index = match index_of.get(&key) {
            Some(&index) => index,
            None => {
                if colors.len() >= MAX_PALETTE_LEN {
                    return Err(Error::PaletteOverflow { found: colors.len() + 1 });
                }
                let index = colors.len() as u8;
                colors.push([key.0, key.1, key.2]);
                alphas.push(key.3);
                index_of.insert(key, index);
                index
            },
        };
        indices.push(index);
    }

    let alphas = if has_alpha && alphas.iter().any(|&a| a != 255) {
        let mut trimmed = alphas;
        while trimmed.last() == Some(&255) {
            trimmed.pop();
        }
        Some(trimmed)
    } else {
        None
    };

    Ok(Palette { colors, alphas, indices })
}
