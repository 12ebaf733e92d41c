/*
 * Copyright (c) 2024 pngforge contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::io::Write;

use byteorder::{WriteBytesExt, BE};
use crc32fast::Hasher;

use crate::error::Error;

/// 4-byte ASCII PNG chunk type code, e.g. `IHDR` or `fdAT`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ChunkId {
    raw: [u8; 4],
}

impl ChunkId {
    pub const IHDR: ChunkId = ChunkId::from_str("IHDR");
    pub const PLTE: ChunkId = ChunkId::from_str("PLTE");
    pub const IDAT: ChunkId = ChunkId::from_str("IDAT");
    pub const IEND: ChunkId = ChunkId::from_str("IEND");
    #[allow(non_upper_case_globals)]
    pub const tRNS: ChunkId = ChunkId::from_str("tRNS");
    #[allow(non_upper_case_globals)]
    pub const tIME: ChunkId = ChunkId::from_str("tIME");
    #[allow(non_upper_case_globals)]
    pub const gAMA: ChunkId = ChunkId::from_str("gAMA");
    #[allow(non_upper_case_globals)]
    pub const acTL: ChunkId = ChunkId::from_str("acTL");
    #[allow(non_upper_case_globals)]
    pub const fcTL: ChunkId = ChunkId::from_str("fcTL");
    #[allow(non_upper_case_globals)]
    pub const fdAT: ChunkId = ChunkId::from_str("fdAT");

    const fn from_str(s: &str) -> ChunkId {
        let bytes = s.as_bytes();
        ChunkId { raw: [bytes[0], bytes[1], bytes[2], bytes[3]] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// Buffers a single PNG chunk's payload and writes it on [`finish`](ChunkWriter::finish)
/// as `length(4) || type(4) || payload || crc32(4)`.
///
/// Dropping the writer without calling `finish` discards the chunk, including its
/// header — nothing can be written until the payload length is known.
pub struct ChunkWriter<W: Write> {
    chunk_id: ChunkId,
    crc: Hasher,
    data: Vec<u8>,
    inner: W,
}

impl<W: Write> ChunkWriter<W> {
    /// Constructs a writer for a single chunk.
    pub fn new(inner: W, chunk_id: ChunkId) -> ChunkWriter<W> {
        ChunkWriter { chunk_id, crc: init_crc(chunk_id), data: Vec::new(), inner }
    }

    /// Writes the buffered payload as a chunk and returns the inner writer.
    pub fn finish(mut self) -> Result<W, Error> {
        let len = u32::try_from(self.data.len())
            .map_err(|_| Error::OversizedChunk { len: self.data.len() })?;
        let crc = self.crc.finalize();

        self.inner.write_u32::<BE>(len)?;
        self.inner.write_all(self.chunk_id.as_bytes())?;
        self.inner.write_all(&self.data[..])?;
        self.inner.write_u32::<BE>(crc)?;

        Ok(self.inner)
    }
}

impl<W: Write> Write for ChunkWriter<W> {
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n_written = self.data.write(buf)?;
        self.crc.update(&buf[..n_written]);
        Ok(n_written)
    }
}

/// Writes a standalone chunk with no payload splitting (`IHDR`, `PLTE`, `tRNS`, `tIME`,
/// `gAMA`, `acTL`, `fcTL`, `IEND`).
pub fn write_chunk<W: Write>(w: &mut W, chunk_id: ChunkId, payload: &[u8]) -> Result<(), Error> {
    let mut chunk = ChunkWriter::new(w, chunk_id);
    chunk.write_all(payload)?;
    chunk.finish()?;
    Ok(())
}

fn init_crc(chunk_id: ChunkId) -> Hasher {
    let mut hasher = Hasher::new_with_initial(0);
    hasher.update(chunk_id.as_bytes());
    hasher
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_crc_matches_reference_implementation() {
        let mut out = Vec::new();
        write_chunk(&mut out, ChunkId::IEND, &[]).unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(&out[0..4], &[0, 0, 0, 0]);
        assert_eq!(&out[4..8], b"IEND");
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(b"IEND");
        assert_eq!(u32::from_be_bytes(out[8..12].try_into().unwrap()), hasher.finalize());
    }
}
