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

// Value documents are parsed separately and specially. They are not
// path-referenced resources like drawables, their entries all go directly
// into the resource table.
use std::io::Read;

use resc_common::*;
use xml::{
    attribute::OwnedAttribute,
    common::Position,
    reader::{EventReader, XmlEvent}
};

use crate::{
    config::ConfigDescription,
    table::{Item, PluralArity, ResourceTable, Value}
};

pub struct ValuesParserOptions {
    /// Whether entries are translatable unless they opt out. `false` for
    /// files whose name contains `donottranslate`.
    pub translatable_default: bool,
    /// Downgrades positional-argument errors in strings to warnings.
    pub legacy: bool
}

/// Parses one values document into `table`, keyed under `config`.
pub fn parse_values<R: Read>(
    byte_source: R,
    source: &str,
    config: &ConfigDescription,
    package: &str,
    options: &ValuesParserOptions,
    table: &mut ResourceTable,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let mut reader = EventReader::new(byte_source);

    // The document root must be <resources>
    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name != "resources" {
                    return Err(parse_error(&reader, "root element must be <resources>"));
                }
                break;
            }
            XmlEvent::EndDocument => {
                return Err(parse_error(&reader, "document contains no <resources> element"))
            }
            _ => {}
        }
    }

    loop {
        match reader.next()? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let (type_name, entry_name, weak, value) = parse_resource_element(
                    &mut reader,
                    &name.local_name,
                    &attributes,
                    source,
                    options,
                    diag
                )?;
                if let Some(value) = value {
                    table.insert(package, &type_name, &entry_name, config.clone(), weak, value)?;
                }
            }
            XmlEvent::EndElement { .. } | XmlEvent::EndDocument => break,
            _ => {}
        }
    }
    Ok(())
}

type ParsedResource = (String, String, bool, Option<Value>);

fn parse_resource_element<R: Read>(
    reader: &mut EventReader<R>,
    element: &str,
    attributes: &[OwnedAttribute],
    source: &str,
    options: &ValuesParserOptions,
    diag: &mut dyn Diagnostics
) -> Result<ParsedResource> {
    // Editorial markers with no table footprint
    if element == "skip" || element == "eat-comment" {
        skip_element(reader)?;
        return Ok((String::new(), String::new(), false, None));
    }

    let name = find_attribute(attributes, "name")
        .ok_or_else(|| parse_error(reader, &format!("<{element}> is missing its name")))?;

    match element {
        "string" => {
            let translatable = match find_attribute(attributes, "translatable") {
                Some(flag) => flag == "true",
                None => options.translatable_default
            };
            let text = read_text(reader)?;
            if contains_positional_argument(&text) {
                let message = format!(
                    "string \"{name}\" uses positional arguments; these are not allowed"
                );
                if options.legacy {
                    diag.log(source, Severity::Warning, &message);
                } else {
                    return Err(RescError::ResourceParsingFailed(message));
                }
            }
            let item = reference_or(&text, || Item::Str {
                value: text.clone(),
                translatable
            });
            Ok(("string".into(), name, false, Some(Value::Item(item))))
        }
        "plurals" => {
            let mut entries = vec![];
            for (item_attrs, text) in read_item_children(reader)? {
                let quantity = find_attribute(&item_attrs, "quantity").ok_or_else(|| {
                    RescError::ResourceParsingFailed(format!(
                        "plurals \"{name}\" has an <item> without a quantity"
                    ))
                })?;
                let arity = parse_arity(&quantity).ok_or_else(|| {
                    RescError::ResourceParsingFailed(format!(
                        "plurals \"{name}\" has unknown quantity \"{quantity}\""
                    ))
                })?;
                let item = reference_or(&text, || Item::Str {
                    value: text.clone(),
                    translatable: options.translatable_default
                });
                entries.push((arity, item));
            }
            Ok(("plurals".into(), name, false, Some(Value::Plurals(entries))))
        }
        "string-array" => {
            let items = read_item_children(reader)?
                .into_iter()
                .map(|(_, text)| {
                    reference_or(&text, || Item::Str {
                        value: text.clone(),
                        translatable: options.translatable_default
                    })
                })
                .collect();
            Ok(("array".into(), name, false, Some(Value::Array(items))))
        }
        "integer-array" => {
            let items = read_item_children(reader)?
                .into_iter()
                .map(|(_, text)| parse_integer(&name, &text))
                .collect::<Result<Vec<Item>>>()?;
            Ok(("array".into(), name, false, Some(Value::Array(items))))
        }
        "array" => {
            let items = read_item_children(reader)?
                .into_iter()
                .map(|(_, text)| reference_or(&text, || Item::Raw(text.clone())))
                .collect();
            Ok(("array".into(), name, false, Some(Value::Array(items))))
        }
        "bool" => {
            let text = read_text(reader)?;
            let item = match text.as_str() {
                "true" => Item::Bool(true),
                "false" => Item::Bool(false),
                other => {
                    return Err(RescError::ResourceParsingFailed(format!(
                        "bool \"{name}\" must be true or false, found \"{other}\""
                    )))
                }
            };
            Ok(("bool".into(), name, false, Some(Value::Item(item))))
        }
        "integer" => {
            let text = read_text(reader)?;
            let item = parse_integer(&name, &text)?;
            Ok(("integer".into(), name, false, Some(Value::Item(item))))
        }
        "color" => {
            let text = read_text(reader)?;
            let item = reference_or_try(&text, || parse_color(&name, &text))?;
            Ok(("color".into(), name, false, Some(Value::Item(item))))
        }
        "dimen" => {
            let text = read_text(reader)?;
            let item = reference_or(&text, || Item::Raw(text.clone()));
            Ok(("dimen".into(), name, false, Some(Value::Item(item))))
        }
        "id" => {
            skip_element(reader)?;
            Ok(("id".into(), name, false, Some(Value::Item(Item::Id))))
        }
        "item" => {
            let type_name = find_attribute(attributes, "type").ok_or_else(|| {
                parse_error(reader, &format!("<item> \"{name}\" is missing its type"))
            })?;
            let text = read_text(reader)?;
            let item = parse_typed_text(&type_name, &name, &text, options)?;
            Ok((type_name, name, false, Some(Value::Item(item))))
        }
        "style" => {
            let parent = find_attribute(attributes, "parent");
            let mut entries = vec![];
            for (item_attrs, text) in read_item_children(reader)? {
                let key = find_attribute(&item_attrs, "name").ok_or_else(|| {
                    RescError::ResourceParsingFailed(format!(
                        "style \"{name}\" has an <item> without a name"
                    ))
                })?;
                entries.push((key, reference_or(&text, || Item::Raw(text.clone()))));
            }
            Ok((
                "style".into(),
                name,
                false,
                Some(Value::Style { parent, entries })
            ))
        }
        other => Err(parse_error(
            reader,
            &format!("unknown resource element <{other}>")
        ))
    }
}

fn parse_typed_text(
    type_name: &str,
    name: &str,
    text: &str,
    options: &ValuesParserOptions
) -> Result<Item> {
    match type_name {
        "string" => Ok(reference_or(text, || Item::Str {
            value: text.to_string(),
            translatable: options.translatable_default
        })),
        "bool" => match text {
            "true" => Ok(Item::Bool(true)),
            "false" => Ok(Item::Bool(false)),
            _ => Err(RescError::ResourceParsingFailed(format!(
                "bool \"{name}\" must be true or false"
            )))
        },
        "integer" => parse_integer(name, text),
        "color" => reference_or_try(text, || parse_color(name, text)),
        "id" => Ok(Item::Id),
        _ => Ok(reference_or(text, || Item::Raw(text.to_string())))
    }
}

fn parse_integer(name: &str, text: &str) -> Result<Item> {
    text.parse::<i32>().map(Item::Int).map_err(|_e| {
        RescError::ResourceParsingFailed(format!(
            "integer \"{name}\" has non-integer value \"{text}\""
        ))
    })
}

/// `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB`, normalized to ARGB8.
fn parse_color(name: &str, text: &str) -> Result<Item> {
    let bad = || {
        RescError::ResourceParsingFailed(format!(
            "color \"{name}\" has invalid value \"{text}\""
        ))
    };
    let digits = text.strip_prefix('#').ok_or_else(bad)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let expand = |c: char| {
        let nibble = c.to_digit(16).unwrap_or(0);
        nibble << 4 | nibble
    };
    let argb = match digits.len() {
        3 | 4 => {
            let mut chars = digits.chars();
            let a = if digits.len() == 4 {
                expand(chars.next().ok_or_else(bad)?)
            } else {
                0xFF
            };
            let r = expand(chars.next().ok_or_else(bad)?);
            let g = expand(chars.next().ok_or_else(bad)?);
            let b = expand(chars.next().ok_or_else(bad)?);
            a << 24 | r << 16 | g << 8 | b
        }
        6 => 0xFF00_0000 | u32::from_str_radix(digits, 16).map_err(|_e| bad())?,
        8 => u32::from_str_radix(digits, 16).map_err(|_e| bad())?,
        _ => return Err(bad())
    };
    Ok(Item::Color(argb))
}

fn parse_arity(quantity: &str) -> Option<PluralArity> {
    match quantity {
        "zero" => Some(PluralArity::Zero),
        "one" => Some(PluralArity::One),
        "two" => Some(PluralArity::Two),
        "few" => Some(PluralArity::Few),
        "many" => Some(PluralArity::Many),
        "other" => Some(PluralArity::Other),
        _ => None
    }
}

/// Values beginning with `@` or `?` stay unresolved references; everything
/// else goes through `fallback`.
fn reference_or(text: &str, fallback: impl FnOnce() -> Item) -> Item {
    if text.starts_with('@') || text.starts_with('?') {
        Item::Ref(text.to_string())
    } else {
        fallback()
    }
}

fn reference_or_try(text: &str, fallback: impl FnOnce() -> Result<Item>) -> Result<Item> {
    if text.starts_with('@') || text.starts_with('?') {
        Ok(Item::Ref(text.to_string()))
    } else {
        fallback()
    }
}

fn find_attribute(attributes: &[OwnedAttribute], name: &str) -> Option<String> {
    attributes
        .iter()
        .find(|attr| attr.name.local_name == name && attr.name.prefix.is_none())
        .map(|attr| attr.value.clone())
}

/// Concatenated character data of the current element, trimmed. Inline
/// markup (`<b>`, `<xliff:g>`) contributes its text only.
// TODO: Record span boundaries for inline markup so the linker can rebuild
//   styled strings instead of receiving flattened text.
fn read_text<R: Read>(reader: &mut EventReader<R>) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.next()? {
            XmlEvent::Characters(chars) | XmlEvent::CData(chars) => text.push_str(&chars),
            XmlEvent::Whitespace(chars) => text.push_str(&chars),
            XmlEvent::StartElement { .. } => depth += 1,
            XmlEvent::EndElement { .. } => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }
    Ok(text.trim().to_string())
}

/// Reads the `<item>` children of the current element until it closes.
fn read_item_children<R: Read>(
    reader: &mut EventReader<R>
) -> Result<Vec<(Vec<OwnedAttribute>, String)>> {
    let mut items = vec![];
    loop {
        match reader.next()? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                if name.local_name != "item" {
                    return Err(parse_error(
                        reader,
                        &format!("expected <item>, found <{}>", name.local_name)
                    ));
                }
                let text = read_text(reader)?;
                items.push((attributes, text));
            }
            XmlEvent::EndElement { .. } | XmlEvent::EndDocument => break,
            _ => {}
        }
    }
    Ok(items)
}

fn skip_element<R: Read>(reader: &mut EventReader<R>) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match reader.next()? {
            XmlEvent::StartElement { .. } => depth += 1,
            XmlEvent::EndElement { .. } => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            XmlEvent::EndDocument => return Ok(()),
            _ => {}
        }
    }
}

fn parse_error<R: Read>(reader: &EventReader<R>, message: &str) -> RescError {
    RescError::ResourceParsingFailed(format!(
        "line {}: {message}",
        reader.position().row + 1
    ))
}

fn contains_positional_argument(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'%' {
            if bytes[i + 1] == b'%' {
                i += 2;
                continue;
            }
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b'$' {
                return true;
            }
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options() -> ValuesParserOptions {
        ValuesParserOptions {
            translatable_default: true,
            legacy: false
        }
    }

    fn parse(doc: &str, opts: &ValuesParserOptions) -> Result<ResourceTable> {
        let mut table = ResourceTable::default();
        let mut diag = RecordingDiagnostics::default();
        parse_values(
            doc.as_bytes(),
            "res/values/test.xml",
            &ConfigDescription::default(),
            "",
            opts,
            &mut table,
            &mut diag
        )?;
        Ok(table)
    }

    fn only_value(table: &ResourceTable) -> &Value {
        &table.packages[0].types[0].entries[0].values[0].value
    }

    #[test]
    fn parses_plain_string() {
        let table = parse(
            r#"<resources><string name="hi">Hi</string></resources>"#,
            &options()
        )
        .unwrap();
        assert_eq!(
            *only_value(&table),
            Value::Item(Item::Str {
                value: "Hi".into(),
                translatable: true
            })
        );
    }

    #[test]
    fn translatable_default_can_be_off_and_overridden() {
        let opts = ValuesParserOptions {
            translatable_default: false,
            legacy: false
        };
        let table = parse(
            r#"<resources>
                <string name="skip_me">untranslated</string>
                <string name="translate_me" translatable="true">translated</string>
            </resources>"#,
            &opts
        )
        .unwrap();
        let entries = &table.packages[0].types[0].entries;
        assert_eq!(
            entries[0].values[0].value,
            Value::Item(Item::Str {
                value: "untranslated".into(),
                translatable: false
            })
        );
        assert_eq!(
            entries[1].values[0].value,
            Value::Item(Item::Str {
                value: "translated".into(),
                translatable: true
            })
        );
    }

    #[test]
    fn positional_arguments_fail_unless_legacy() {
        let doc = r#"<resources><string name="fmt">a %1$s b</string></resources>"#;
        assert!(parse(doc, &options()).is_err());

        let legacy = ValuesParserOptions {
            translatable_default: true,
            legacy: true
        };
        let table = parse(doc, &legacy).unwrap();
        assert_eq!(table.packages[0].types[0].entries.len(), 1);
    }

    #[test]
    fn escaped_percent_is_not_positional() {
        let doc = r#"<resources><string name="pct">100%% done %s</string></resources>"#;
        assert!(parse(doc, &options()).is_ok());
    }

    #[test]
    fn parses_plurals_and_arrays() {
        let table = parse(
            r#"<resources>
                <plurals name="apples">
                    <item quantity="one">an apple</item>
                    <item quantity="other">%d apples</item>
                </plurals>
                <integer-array name="sizes"><item>1</item><item>42</item></integer-array>
            </resources>"#,
            &options()
        )
        .unwrap();
        let package = &table.packages[0];
        let plurals = &package.types[0].entries[0].values[0].value;
        match plurals {
            Value::Plurals(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].0, PluralArity::One);
            }
            other => panic!("expected plurals, got {other:?}")
        }
        let array = &package.types[1].entries[0].values[0].value;
        assert_eq!(
            *array,
            Value::Array(vec![Item::Int(1), Item::Int(42)])
        );
    }

    #[test]
    fn parses_typed_scalars_and_references() {
        let table = parse(
            r#"<resources>
                <bool name="flag">true</bool>
                <color name="accent">#ff8800</color>
                <color name="alias">@color/accent</color>
                <dimen name="gap">16dp</dimen>
                <item name="indirect" type="integer">7</item>
                <id name="widget"/>
            </resources>"#,
            &options()
        )
        .unwrap();
        let types = &table.packages[0].types;
        let by_name = |type_name: &str| {
            types
                .iter()
                .find(|t| t.name == type_name)
                .unwrap_or_else(|| panic!("no type {type_name}"))
        };
        assert_eq!(
            by_name("bool").entries[0].values[0].value,
            Value::Item(Item::Bool(true))
        );
        assert_eq!(
            by_name("color").entries[0].values[0].value,
            Value::Item(Item::Color(0xFFFF8800))
        );
        assert_eq!(
            by_name("color").entries[1].values[0].value,
            Value::Item(Item::Ref("@color/accent".into()))
        );
        assert_eq!(
            by_name("dimen").entries[0].values[0].value,
            Value::Item(Item::Raw("16dp".into()))
        );
        assert_eq!(
            by_name("integer").entries[0].values[0].value,
            Value::Item(Item::Int(7))
        );
        assert_eq!(
            by_name("id").entries[0].values[0].value,
            Value::Item(Item::Id)
        );
    }

    #[test]
    fn parses_styles() {
        let table = parse(
            r#"<resources>
                <style name="Title" parent="@style/Base">
                    <item name="android:textSize">20sp</item>
                </style>
            </resources>"#,
            &options()
        )
        .unwrap();
        match only_value(&table) {
            Value::Style { parent, entries } => {
                assert_eq!(parent.as_deref(), Some("@style/Base"));
                assert_eq!(entries[0].0, "android:textSize");
                assert_eq!(entries[0].1, Item::Raw("20sp".into()));
            }
            other => panic!("expected style, got {other:?}")
        }
    }

    #[test]
    fn short_color_forms_expand() {
        let table = parse(
            r#"<resources><color name="c">#8ace</color></resources>"#,
            &options()
        )
        .unwrap();
        assert_eq!(
            *only_value(&table),
            Value::Item(Item::Color(0x88AACCEE))
        );
    }

    #[test]
    fn unknown_element_and_missing_name_fail() {
        assert!(parse(r#"<resources><widget name="x"/></resources>"#, &options()).is_err());
        assert!(parse(r#"<resources><string>text</string></resources>"#, &options()).is_err());
        assert!(parse(r#"<wrong-root/>"#, &options()).is_err());
    }

    #[test]
    fn duplicate_key_in_one_file_fails() {
        let doc = r#"<resources>
            <string name="hi">a</string>
            <string name="hi">b</string>
        </resources>"#;
        assert!(matches!(
            parse(doc, &options()),
            Err(RescError::DuplicateResource(_))
        ));
    }
}
