/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Wraps a writer, compressing everything written to it into a zlib stream.
///
/// PNG pixel data is always zlib-compressed (`compression_method = 0` in `IHDR`); this
/// is a thin wrapper so `encode.rs` doesn't need to know about `flate2` directly.
pub struct Compressor<W: Write> {
    inner: ZlibEncoder<W>,
}

impl<W: Write> Compressor<W> {
    pub fn new(inner: W) -> Compressor<W> {
        Compressor { inner: ZlibEncoder::new(inner, Compression::best()) }
    }

    /// Finishes the zlib stream and returns the inner writer.
    pub fn finish(self) -> std::io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write> Write for Compressor<W> {
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }
}
