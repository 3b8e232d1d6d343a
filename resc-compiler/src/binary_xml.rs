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

// Emission layer for the flattened binary XML format. Every chunk on the
// wire is an 8-byte header (kind, header size, total size), an optional
// extended header, and a body; the helpers here assemble those three spans
// so no caller ever computes a size by hand. All multi-byte fields are
// little-endian and every chunk falls on a 32-bit boundary.
use deku::prelude::*;
use deku::DekuContainerWrite;
use resc_common::*;

/// Index into the document's string pool.
pub type PoolRef = u32;
/// Pool reference meaning "absent" (no namespace, no comment).
pub const NO_ENTRY: PoolRef = 0xFFFF_FFFF;

#[derive(Debug, PartialEq, DekuWrite)]
#[deku(id_type = "u16")]
pub enum ChunkKind {
    #[deku(id = 0x0001)]
    StringPool,
    /// Outer chunk of a whole flattened document
    #[deku(id = 0x0003)]
    Xml,
    #[deku(id = 0x0100)]
    StartNamespace,
    #[deku(id = 0x0101)]
    EndNamespace,
    #[deku(id = 0x0102)]
    StartElement,
    #[deku(id = 0x0103)]
    EndElement
}

#[derive(Debug, PartialEq, DekuWrite)]
struct ChunkHeader {
    kind: ChunkKind,
    header_size: u16,
    // Header, extended header and body together
    total_size: u32
}

/// Assembles one chunk from its spans. The header sizes are derived from
/// the span lengths, which keeps them impossible to get out of sync with
/// the content.
pub fn emit_chunk(kind: ChunkKind, extended_header: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let header = ChunkHeader {
        kind,
        header_size: (8 + extended_header.len()) as u16,
        total_size: (8 + extended_header.len() + body.len()) as u32
    };
    let mut chunk = header.to_bytes()?;
    chunk.extend_from_slice(extended_header);
    chunk.extend_from_slice(body);
    debug_assert!(chunk.len() % 4 == 0, "unaligned chunk of {} bytes", chunk.len());
    Ok(chunk)
}

// Every node chunk inside a document carries its source line and an
// optional comment as the extended header. The tree keeps no line
// numbers, so nodes all claim line 1; nothing downstream reads it except
// debug tooling.
#[derive(Debug, PartialEq, DekuWrite)]
struct NodeHeader {
    line_number: u32,
    comment: PoolRef
}

fn emit_node_chunk(kind: ChunkKind, body: &[u8]) -> Result<Vec<u8>> {
    let node_header = NodeHeader {
        line_number: 1,
        comment: NO_ENTRY
    };
    emit_chunk(kind, &node_header.to_bytes()?, body)
}

/// Wraps a string pool and a node stream into the outer document chunk.
pub fn xml_document_chunk(string_pool: &[u8], nodes: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(string_pool.len() + nodes.len());
    body.extend_from_slice(string_pool);
    body.extend_from_slice(nodes);
    emit_chunk(ChunkKind::Xml, &[], &body)
}

#[derive(Debug, PartialEq, DekuWrite)]
struct NamespaceNode {
    prefix: PoolRef,
    uri: PoolRef
}

pub fn namespace_chunk(start: bool, prefix: PoolRef, uri: PoolRef) -> Result<Vec<u8>> {
    let kind = if start {
        ChunkKind::StartNamespace
    } else {
        ChunkKind::EndNamespace
    };
    emit_node_chunk(kind, &NamespaceNode { prefix, uri }.to_bytes()?)
}

// Fixed part of an element-start body, and one attribute record; both
// happen to serialize to 20 bytes.
const ELEMENT_HEAD_SIZE: u16 = 20;
const ATTRIBUTE_RECORD_SIZE: u16 = 20;

// Field meanings (the 1-based id/class/style indices included) are fixed
// by the wire format; the compiler leaves the indices unset.
#[derive(Debug, PartialEq, DekuWrite)]
struct ElementHead {
    namespace: PoolRef,
    name: PoolRef,
    attribute_start: u16,
    attribute_size: u16,
    attribute_count: u16,
    id_index: u16,
    class_index: u16,
    style_index: u16
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct AttributeRecord {
    pub namespace: PoolRef,
    pub name: PoolRef,
    pub raw_value: PoolRef,
    pub typed_value: TypedValue
}

const TYPED_VALUE_SIZE: u16 = 8;
const VALUE_KIND_STRING: u8 = 0x03;

/// Typed slot of an attribute. Compilation never resolves values, so the
/// only form the flattener emits points back at the raw pool entry; the
/// linker rewrites these slots in place.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct TypedValue {
    size: u16,
    reserved: u8,
    kind: u8,
    data: u32
}

impl TypedValue {
    pub fn raw_string(value: PoolRef) -> TypedValue {
        TypedValue {
            size: TYPED_VALUE_SIZE,
            reserved: 0,
            kind: VALUE_KIND_STRING,
            data: value
        }
    }
}

pub fn element_start_chunk(
    namespace: PoolRef,
    name: PoolRef,
    attributes: &[AttributeRecord]
) -> Result<Vec<u8>> {
    let head = ElementHead {
        namespace,
        name,
        attribute_start: ELEMENT_HEAD_SIZE,
        attribute_size: ATTRIBUTE_RECORD_SIZE,
        attribute_count: attributes.len() as u16,
        id_index: 0,
        class_index: 0,
        style_index: 0
    };
    let mut body = head.to_bytes()?;
    for attribute in attributes {
        body.extend(attribute.to_bytes()?);
    }
    emit_node_chunk(ChunkKind::StartElement, &body)
}

#[derive(Debug, PartialEq, DekuWrite)]
struct ElementEnd {
    namespace: PoolRef,
    name: PoolRef
}

pub fn element_end_chunk(namespace: PoolRef, name: PoolRef) -> Result<Vec<u8>> {
    emit_node_chunk(ChunkKind::EndElement, &ElementEnd { namespace, name }.to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_derive_from_spans() {
        let chunk = emit_chunk(ChunkKind::Xml, &[1, 2, 3, 4], &[5, 6, 7, 8]).unwrap();
        assert_eq!(chunk.len(), 16);
        // kind, then header size 12, then total size 16
        assert_eq!(&chunk[0..2], &[0x03, 0x00]);
        assert_eq!(&chunk[2..4], &[0x0C, 0x00]);
        assert_eq!(&chunk[4..8], &[0x10, 0x00, 0x00, 0x00]);
        assert_eq!(&chunk[8..16], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn element_end_serialises_little_endian() {
        let chunk = element_end_chunk(NO_ENTRY, 3).unwrap();
        // 8-byte header + 8-byte node header + 8-byte body
        assert_eq!(chunk.len(), 24);
        assert_eq!(&chunk[0..2], &[0x03, 0x01]);
        assert_eq!(&chunk[2..4], &[0x10, 0x00]);
        assert_eq!(&chunk[4..8], &[0x18, 0x00, 0x00, 0x00]);
        // line 1, no comment, no namespace, name index 3
        assert_eq!(&chunk[8..12], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&chunk[12..16], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&chunk[16..20], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&chunk[20..24], &[0x03, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn attribute_records_match_their_declared_size() {
        let record = AttributeRecord {
            namespace: NO_ENTRY,
            name: 1,
            raw_value: 2,
            typed_value: TypedValue::raw_string(2)
        };
        let bytes = record.to_bytes().unwrap();
        assert_eq!(bytes.len(), ATTRIBUTE_RECORD_SIZE as usize);
        // The typed slot mirrors the raw pool entry as a string
        assert_eq!(bytes[15], VALUE_KIND_STRING);
        assert_eq!(&bytes[16..20], &[0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn element_start_counts_its_attributes() {
        let attributes = vec![
            AttributeRecord {
                namespace: NO_ENTRY,
                name: 0,
                raw_value: 1,
                typed_value: TypedValue::raw_string(1)
            },
            AttributeRecord {
                namespace: NO_ENTRY,
                name: 2,
                raw_value: 3,
                typed_value: TypedValue::raw_string(3)
            },
        ];
        let chunk = element_start_chunk(NO_ENTRY, 4, &attributes).unwrap();
        // header 8 + node header 8 + element head 20 + 2 records
        assert_eq!(chunk.len(), 16 + 20 + 2 * ATTRIBUTE_RECORD_SIZE as usize);
        // attribute_count sits after namespace, name, start and size
        assert_eq!(&chunk[28..30], &[0x02, 0x00]);
    }
}
