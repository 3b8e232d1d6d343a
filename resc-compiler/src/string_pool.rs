// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;

use deku::prelude::*;
use deku::DekuContainerWrite;
use resc_common::*;

use crate::binary_xml::{emit_chunk, ChunkKind, PoolRef};

// Chunk header (8) plus this struct; string offsets follow immediately.
const POOL_HEADER_SIZE: u32 = 8 + 20;
const UTF8_POOL_FLAG: u32 = 1 << 8;

// Entry lengths are one or two bytes, high bit of the first marking the
// two-byte form, so 15 bits is as long as a pool string gets.
const MAX_STRING_BYTES: usize = 0x7FFF;

#[derive(Debug, PartialEq, DekuWrite)]
struct PoolHeader {
    string_count: u32,
    style_count: u32,
    flags: u32,
    strings_start: u32,
    styles_start: u32
}

/// Interning builder for the UTF-8 string pool that precedes a flattened
/// XML document. Returns a stable index per distinct string; indices are
/// dense in first-use order, which keeps flattening deterministic.
#[derive(Default)]
pub struct StringPoolBuilder {
    strings: Vec<String>,
    ids: HashMap<String, PoolRef>
}

impl StringPoolBuilder {
    pub fn intern(&mut self, string: &str) -> PoolRef {
        if let Some(id) = self.ids.get(string) {
            return *id;
        }
        let new_id = self.strings.len() as PoolRef;
        self.strings.push(string.to_string());
        self.ids.insert(string.to_string(), new_id);
        new_id
    }

    /// Serializes the pool chunk: header, one heap offset per string, then
    /// the heap itself, padded out to a 32-bit boundary.
    pub fn build(self) -> Result<Vec<u8>> {
        let mut offsets: Vec<u8> = Vec::with_capacity(4 * self.strings.len());
        let mut heap: Vec<u8> = vec![];
        for string in &self.strings {
            offsets.extend((heap.len() as u32).to_le_bytes());
            encode_entry(string, &mut heap)?;
        }
        while heap.len() % 4 != 0 {
            heap.push(0);
        }

        let header = PoolHeader {
            string_count: self.strings.len() as u32,
            style_count: 0,
            flags: UTF8_POOL_FLAG,
            strings_start: POOL_HEADER_SIZE + offsets.len() as u32,
            styles_start: 0
        };
        let mut body = offsets;
        body.extend(heap);
        emit_chunk(ChunkKind::StringPool, &header.to_bytes()?, &body)
    }
}

/// One heap entry: character count, byte count, the UTF-8 bytes, and a
/// terminating NUL.
fn encode_entry(string: &str, heap: &mut Vec<u8>) -> Result<()> {
    if string.len() > MAX_STRING_BYTES {
        return Err(RescError::ResourceParsingFailed(format!(
            "string of {} bytes exceeds the string pool limit",
            string.len()
        )));
    }
    push_length(heap, string.chars().count());
    push_length(heap, string.len());
    heap.extend_from_slice(string.as_bytes());
    heap.push(0);
    Ok(())
}

// Each count is encoded on its own: values above 0x7F spill their high
// bits into a marker byte.
fn push_length(heap: &mut Vec<u8>, length: usize) {
    if length > 0x7F {
        heap.push(0x80 | (length >> 8) as u8);
    }
    heap.push(length as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_reuses_indices() {
        let mut pool = StringPoolBuilder::default();
        let a = pool.intern("LinearLayout");
        let b = pool.intern("orientation");
        let a_again = pool.intern("LinearLayout");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a_again, a);
    }

    #[test]
    fn pool_chunk_is_aligned_and_counts_strings() {
        let mut pool = StringPoolBuilder::default();
        pool.intern("a");
        pool.intern("bc");
        let bytes = pool.build().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        // chunk kind StringPool, header size 28
        assert_eq!(&bytes[0..2], &[0x01, 0x00]);
        assert_eq!(&bytes[2..4], &[0x1C, 0x00]);
        // string_count right after the chunk header
        assert_eq!(&bytes[8..12], &[0x02, 0x00, 0x00, 0x00]);
        // strings_start covers the header and both offsets
        assert_eq!(&bytes[20..24], &[0x24, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn multibyte_strings_count_chars_and_bytes_separately() {
        let mut pool = StringPoolBuilder::default();
        pool.intern("é");
        let bytes = pool.build().unwrap();
        // One string: heap starts after the header (28) and one offset (4).
        // "é" is 1 character but 2 bytes.
        assert_eq!(bytes[0x20], 1);
        assert_eq!(bytes[0x21], 2);
        assert_eq!(&bytes[0x22..0x24], "é".as_bytes());
        assert_eq!(bytes[0x24], 0);
    }

    #[test]
    fn long_lengths_spill_into_a_marker_byte() {
        let text = "x".repeat(300);
        let mut pool = StringPoolBuilder::default();
        pool.intern(&text);
        let bytes = pool.build().unwrap();
        // 300 = 0x012C: marker byte carries the high bits, for the
        // character count and the byte count alike
        assert_eq!(&bytes[0x20..0x24], &[0x81, 0x2C, 0x81, 0x2C]);
    }

    #[test]
    fn boundary_length_stays_single_byte() {
        let text = "y".repeat(0x7F);
        let mut pool = StringPoolBuilder::default();
        pool.intern(&text);
        let bytes = pool.build().unwrap();
        assert_eq!(&bytes[0x20..0x22], &[0x7F, 0x7F]);
    }

    #[test]
    fn oversized_strings_are_rejected() {
        let text = "z".repeat(MAX_STRING_BYTES + 1);
        let mut pool = StringPoolBuilder::default();
        pool.intern(&text);
        assert!(pool.build().is_err());
    }
}
