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

use resc_common::*;

use crate::{
    binary_xml::{
        element_end_chunk, element_start_chunk, namespace_chunk, xml_document_chunk,
        AttributeRecord, PoolRef, TypedValue, NO_ENTRY
    },
    string_pool::StringPoolBuilder,
    xml_tree::XmlElement
};

/// Flattens one element tree to the binary XML format: a UTF-8 string pool
/// followed by namespace/element/attribute chunks in document order.
///
/// Attribute values stay raw. Reference and type resolution belong to the
/// link phase, so the typed slot of every attribute just mirrors its raw
/// string pool entry.
pub fn flatten_document(root: &XmlElement) -> Result<Vec<u8>> {
    let mut pool = StringPoolBuilder::default();
    let mut nodes: Vec<u8> = vec![];
    flatten_element(root, &mut pool, &mut nodes)?;
    xml_document_chunk(&pool.build()?, &nodes)
}

fn flatten_element(
    element: &XmlElement,
    pool: &mut StringPoolBuilder,
    nodes: &mut Vec<u8>
) -> Result<()> {
    let mut opened_namespaces = vec![];
    for (prefix, uri) in &element.namespaces {
        let prefix_id = pool.intern(prefix);
        let uri_id = pool.intern(uri);
        nodes.extend(namespace_chunk(true, prefix_id, uri_id)?);
        opened_namespaces.push((prefix_id, uri_id));
    }

    let namespace_id = intern_optional(pool, element.namespace.as_deref());
    let name_id = pool.intern(&element.name);
    let attributes: Vec<AttributeRecord> = element
        .attributes
        .iter()
        .map(|attr| {
            let raw_value = pool.intern(&attr.value);
            AttributeRecord {
                namespace: intern_optional(pool, attr.namespace.as_deref()),
                name: pool.intern(&attr.name),
                raw_value,
                typed_value: TypedValue::raw_string(raw_value)
            }
        })
        .collect();
    nodes.extend(element_start_chunk(namespace_id, name_id, &attributes)?);

    for child in &element.children {
        flatten_element(child, pool, nodes)?;
    }

    nodes.extend(element_end_chunk(namespace_id, name_id)?);
    for (prefix_id, uri_id) in opened_namespaces.iter().rev() {
        nodes.extend(namespace_chunk(false, *prefix_id, *uri_id)?);
    }
    Ok(())
}

fn intern_optional(pool: &mut StringPoolBuilder, string: Option<&str>) -> PoolRef {
    match string {
        Some(string) => pool.intern(string),
        None => NO_ENTRY
    }
}
