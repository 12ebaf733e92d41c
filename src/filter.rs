/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::io::Write;

use byteorder::WriteBytesExt;

/// Prefixes every row of pixel data with a single filter-type byte before it reaches
/// the compressor.
///
/// Only filter type 0 ("None") is produced — adaptive filter selection (types 1-4)
/// would change the compressed output but not the decoded image, and is a deliberate
/// non-goal here.
pub struct RowFilterer<W: Write> {
    bytes_per_row: usize,
    height: usize,
    inner: W,
    row_byte_index: usize,
    row_index: usize,
    row_prefix_written: bool,
}

impl<W: Write> RowFilterer<W> {
    pub fn new(inner: W, bytes_per_row: usize, height: usize) -> RowFilterer<W> {
        RowFilterer {
            bytes_per_row,
            height,
            inner,
            row_byte_index: 0,
            row_index: 0,
            row_prefix_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for RowFilterer<W> {
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.bytes_per_row == 0 || self.row_index == self.height || buf.is_empty() {
            return Ok(0);
        }

        if !self.row_prefix_written {
            self.inner.write_u8(0)?;
            self.row_prefix_written = true;
        }

        let n_to_write = std::cmp::min(buf.len(), self.bytes_per_row - self.row_byte_index);
        let n_written = self.inner.write(&buf[..n_to_write])?;
        if n_written == 0 {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        }
        self.row_byte_index += n_written;

        if self.row_byte_index == self.bytes_per_row {
            self.row_byte_index = 0;
            self.row_index += 1;
            self.row_prefix_written = false;
        }

        Ok(n_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_each_row_with_a_zero_byte() {
        let mut out = Vec::new();
        {
            let mut filterer = RowFilterer::new(&mut out, 3, 2);
            filterer.write_all(&[1, 2, 3, 4, 5, 6]).unwrap();
        }
        assert_eq!(out, vec![0, 1, 2, 3, 0, 4, 5, 6]);
    }
}
