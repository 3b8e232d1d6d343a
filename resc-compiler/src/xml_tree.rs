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

use std::io::Read;

use resc_common::*;
use xml::reader::{EventReader, XmlEvent};

/// Namespace marking compiler-consumed elements such as inline `attr`
/// fragments. It never survives into the flattened output.
pub const AAPT_NAMESPACE: &str = "http://schemas.android.com/aapt";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    /// Namespaces first declared on this element, fake prefixes filtered.
    pub namespaces: Vec<(String, String)>,
    pub children: Vec<XmlElement>
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub value: String
}

/// A document synthesized from an `<aapt:attr>` child, owned by the
/// compilation until the primary envelope has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFragment {
    /// Synthesized resource name, `$<file name>__<index>`.
    pub name: String,
    pub root: XmlElement
}

/// Inflates a whole document into an element tree, keeping namespace scoping
/// and dropping text nodes (layout and drawable grammars carry no text).
pub fn parse_tree<R: Read>(byte_source: R) -> Result<XmlElement> {
    let mut root: Option<XmlElement> = None;
    let mut child_idx_stack: Vec<usize> = vec![];
    let mut seen_namespaces: Vec<String> = vec![];

    let xml_source = EventReader::new(byte_source);
    for event in xml_source {
        match event {
            Ok(XmlEvent::StartElement {
                name,
                attributes,
                namespace
            }) => {
                let mut namespaces_defined_this_element = vec![];
                for ns in namespace.iter() {
                    // These are kind of fake namespaces, the flattened
                    // output doesn't carry nodes for them.
                    if ns.0.is_empty() || ns.0 == "xml" || ns.0 == "xmlns" || ns.0 == "tools" {
                        continue;
                    }
                    // The compiler consumes aapt-namespaced elements itself
                    if ns.1 == AAPT_NAMESPACE {
                        continue;
                    }
                    if seen_namespaces.iter().any(|seen| seen == ns.0) {
                        continue;
                    }
                    seen_namespaces.push(ns.0.to_string());
                    namespaces_defined_this_element.push((ns.0.to_string(), ns.1.to_string()));
                }

                let element = XmlElement {
                    prefix: name.prefix,
                    namespace: name.namespace,
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|attr| XmlAttribute {
                            prefix: attr.name.prefix,
                            namespace: attr.name.namespace,
                            name: attr.name.local_name,
                            value: attr.value
                        })
                        .collect(),
                    namespaces: namespaces_defined_this_element,
                    children: vec![]
                };

                match &mut root {
                    Some(tree_root) => {
                        let mut parent = &mut *tree_root;
                        for child_idx in &child_idx_stack {
                            parent = &mut parent.children[*child_idx];
                        }
                        child_idx_stack.push(parent.children.len());
                        parent.children.push(element);
                    }
                    empty => *empty = Some(element)
                }
            }
            Ok(XmlEvent::EndElement { .. }) => {
                child_idx_stack.pop();
            }
            Ok(XmlEvent::EndDocument) => break,
            Err(e) => return Err(RescError::XmlParsingFailed(e)),
            // Text, CDATA, comments and processing instructions have no
            // place in the flattened formats
            _ => {}
        }
    }

    root.ok_or_else(|| {
        RescError::ResourceParsingFailed("document contains no root element".into())
    })
}

/// Collects every ID this document defines through `@+id/name` attribute
/// values, in document order, first definition wins.
pub fn collect_ids(root: &XmlElement) -> Vec<String> {
    let mut ids = vec![];
    collect_ids_in(root, &mut ids);
    ids
}

fn collect_ids_in(element: &XmlElement, ids: &mut Vec<String>) {
    for attr in &element.attributes {
        if let Some(id) = attr.value.strip_prefix("@+id/") {
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
    }
    for child in &element.children {
        collect_ids_in(child, ids);
    }
}

/// Removes every `<aapt:attr name="X">` child from the tree, replacing it
/// with a reference-valued attribute `X` on its parent and returning the
/// synthesized sub-documents in depth-first document order. Fragments nested
/// inside extracted fragments are extracted too.
pub fn extract_inline_fragments(
    root: &mut XmlElement,
    type_dir: &str,
    file_name: &str
) -> Result<Vec<ExtractedFragment>> {
    let mut fragments = vec![];
    let mut scope: Vec<(String, String)> = vec![];
    extract_in(root, type_dir, file_name, &mut fragments, &mut scope)?;
    Ok(fragments)
}

fn extract_in(
    element: &mut XmlElement,
    type_dir: &str,
    file_name: &str,
    fragments: &mut Vec<ExtractedFragment>,
    scope: &mut Vec<(String, String)>
) -> Result<()> {
    let scope_depth = scope.len();
    scope.extend(element.namespaces.iter().cloned());

    let mut i = 0;
    while i < element.children.len() {
        if !is_inline_attr(&element.children[i]) {
            extract_in(&mut element.children[i], type_dir, file_name, fragments, scope)?;
            i += 1;
            continue;
        }

        let fragment_element = element.children.remove(i);
        let target = fragment_element
            .attributes
            .iter()
            .find(|attr| attr.prefix.is_none() && attr.name == "name")
            .map(|attr| attr.value.clone())
            .ok_or_else(|| {
                RescError::ResourceParsingFailed(
                    "inline attribute element is missing its \"name\" attribute".into()
                )
            })?;
        if fragment_element.children.len() != 1 {
            return Err(RescError::ResourceParsingFailed(format!(
                "inline attribute \"{}\" must contain exactly one element, found {}",
                target,
                fragment_element.children.len()
            )));
        }

        let index = fragments.len();
        let resource_name = format!("${file_name}__{index}");
        set_target_attribute(
            element,
            &target,
            format!("@{type_dir}/{resource_name}"),
            scope
        );

        let mut sub_root = fragment_element.children.into_iter().next().ok_or_else(
            || RescError::ResourceParsingFailed("inline attribute lost its child".into())
        )?;
        // The extracted document leaves its ancestors behind, so it
        // redeclares every namespace that was in scope at the cut.
        sub_root.namespaces = merge_namespaces(scope, &sub_root.namespaces);

        // Reserve the slot before recursing so document order holds even
        // when the fragment contains further fragments.
        fragments.push(ExtractedFragment {
            name: resource_name,
            root: XmlElement::default()
        });
        extract_in(&mut sub_root, type_dir, file_name, fragments, scope)?;
        fragments[index].root = sub_root;
    }

    scope.truncate(scope_depth);
    Ok(())
}

fn is_inline_attr(element: &XmlElement) -> bool {
    element.namespace.as_deref() == Some(AAPT_NAMESPACE) && element.name == "attr"
}

fn set_target_attribute(
    element: &mut XmlElement,
    target: &str,
    value: String,
    scope: &[(String, String)]
) {
    let (prefix, local) = match target.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, target.to_string())
    };
    let namespace = prefix.as_ref().and_then(|p| {
        scope
            .iter()
            .rev()
            .find(|(declared, _)| declared == p)
            .map(|(_, uri)| uri.clone())
    });

    if let Some(attr) = element
        .attributes
        .iter_mut()
        .find(|attr| attr.prefix == prefix && attr.name == local)
    {
        attr.value = value;
        return;
    }
    element.attributes.push(XmlAttribute {
        prefix,
        namespace,
        name: local,
        value
    });
}

fn merge_namespaces(
    scope: &[(String, String)],
    own: &[(String, String)]
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = vec![];
    for (prefix, uri) in scope.iter().chain(own.iter()) {
        match merged.iter().position(|(p, _)| p == prefix) {
            Some(idx) => merged[idx].1 = uri.clone(),
            None => merged.push((prefix.clone(), uri.clone()))
        }
    }
    merged
}
