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

use crate::{config::ConfigDescription, proto};

/// A single typed value. The compiler interprets only what it needs for
/// validation and pseudo-localization; everything else stays raw text for
/// the linker.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Str { value: String, translatable: bool },
    Raw(String),
    Ref(String),
    Bool(bool),
    Int(i32),
    Color(u32),
    Id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralArity {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Item(Item),
    Plurals(Vec<(PluralArity, Item)>),
    Array(Vec<Item>),
    Style {
        parent: Option<String>,
        entries: Vec<(String, Item)>
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConfigValue {
    pub config: ConfigDescription,
    /// Weak values lose to strong ones instead of colliding with them.
    pub weak: bool,
    pub value: Value
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub name: String,
    /// Insertion-ordered; synthesized variants follow the entry they were
    /// derived from.
    pub values: Vec<TableConfigValue>
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableType {
    pub name: String,
    pub entries: Vec<TableEntry>
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePackage {
    pub name: String,
    /// 8-bit package block. Left unset by the parser; the driver assigns
    /// its default to every package still lacking one at end of parse.
    pub id: Option<u8>,
    pub types: Vec<TableType>
}

/// In-memory resource table one values document parses into. Lives exactly
/// as long as one compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTable {
    pub packages: Vec<TablePackage>
}

impl ResourceTable {
    pub fn get_or_create_package(&mut self, name: &str) -> &mut TablePackage {
        if let Some(idx) = self.packages.iter().position(|pkg| pkg.name == name) {
            return &mut self.packages[idx];
        }
        self.packages.push(TablePackage {
            name: name.to_string(),
            id: None,
            types: vec![]
        });
        let last = self.packages.len() - 1;
        &mut self.packages[last]
    }

    /// Inserts one config value. Returns whether the table changed; the only
    /// silent no-op is a weak value meeting an existing strong one.
    pub fn insert(
        &mut self,
        package: &str,
        type_name: &str,
        entry_name: &str,
        config: ConfigDescription,
        weak: bool,
        value: Value
    ) -> Result<bool> {
        let qualified = format!("{type_name}/{entry_name}");
        let package = self.get_or_create_package(package);

        let res_type = match package.types.iter().position(|t| t.name == type_name) {
            Some(idx) => &mut package.types[idx],
            None => {
                package.types.push(TableType {
                    name: type_name.to_string(),
                    entries: vec![]
                });
                let last = package.types.len() - 1;
                &mut package.types[last]
            }
        };
        let entry = match res_type.entries.iter().position(|e| e.name == entry_name) {
            Some(idx) => &mut res_type.entries[idx],
            None => {
                res_type.entries.push(TableEntry {
                    name: entry_name.to_string(),
                    values: vec![]
                });
                let last = res_type.entries.len() - 1;
                &mut res_type.entries[last]
            }
        };

        match entry.values.iter().position(|cv| cv.config == config) {
            Some(idx) if entry.values[idx].weak => {
                entry.values[idx].weak = weak;
                entry.values[idx].value = value;
                Ok(true)
            }
            Some(_) if weak => Ok(false),
            Some(_) => Err(RescError::DuplicateResource(qualified)),
            None => {
                entry.values.push(TableConfigValue {
                    config,
                    weak,
                    value
                });
                Ok(true)
            }
        }
    }

    pub fn assign_default_package_ids(&mut self, default_id: u8) {
        for package in &mut self.packages {
            if package.id.is_none() {
                package.id = Some(default_id);
            }
        }
    }

    pub fn to_proto(&self) -> proto::ResourceTable {
        proto::ResourceTable {
            package: self
                .packages
                .iter()
                .map(|package| proto::Package {
                    package_id: package.id.map(|id| proto::PackageId { id: id as u32 }),
                    package_name: package.name.clone(),
                    r#type: package
                        .types
                        .iter()
                        .enumerate()
                        .map(|(idx, res_type)| proto::Type {
                            // 1-based, in first-use order
                            type_id: Some(proto::TypeId { id: idx as u32 + 1 }),
                            name: res_type.name.clone(),
                            entry: res_type.entries.iter().map(entry_to_proto).collect()
                        })
                        .collect()
                })
                .collect()
        }
    }
}

fn entry_to_proto(entry: &TableEntry) -> proto::Entry {
    proto::Entry {
        name: entry.name.clone(),
        config_value: entry
            .values
            .iter()
            .map(|cv| proto::ConfigValue {
                config: Some(cv.config.to_proto()),
                value: Some(proto::Value {
                    weak: cv.weak,
                    kind: Some(value_to_proto(&cv.value))
                })
            })
            .collect()
    }
}

fn value_to_proto(value: &Value) -> proto::value::Kind {
    match value {
        Value::Item(item) => proto::value::Kind::Item(item_to_proto(item)),
        Value::Plurals(entries) => {
            proto::value::Kind::CompoundValue(proto::CompoundValue {
                kind: Some(proto::compound_value::Kind::Plural(proto::Plural {
                    entry: entries
                        .iter()
                        .map(|(arity, item)| proto::PluralEntry {
                            arity: arity_to_proto(*arity) as i32,
                            item: Some(item_to_proto(item))
                        })
                        .collect()
                }))
            })
        }
        Value::Array(elements) => proto::value::Kind::CompoundValue(proto::CompoundValue {
            kind: Some(proto::compound_value::Kind::Array(proto::Array {
                element: elements.iter().map(item_to_proto).collect()
            }))
        }),
        Value::Style { parent, entries } => {
            proto::value::Kind::CompoundValue(proto::CompoundValue {
                kind: Some(proto::compound_value::Kind::Style(proto::Style {
                    parent: parent.clone().unwrap_or_default(),
                    entry: entries
                        .iter()
                        .map(|(key, item)| proto::StyleEntry {
                            key: key.clone(),
                            item: Some(item_to_proto(item))
                        })
                        .collect()
                }))
            })
        }
    }
}

fn item_to_proto(item: &Item) -> proto::Item {
    let kind = match item {
        Item::Str {
            value,
            translatable
        } => proto::item::Kind::Str(proto::StringValue {
            value: value.clone(),
            translatable: *translatable
        }),
        Item::Raw(value) => proto::item::Kind::RawStr(proto::RawString {
            value: value.clone()
        }),
        Item::Ref(name) => proto::item::Kind::Ref(proto::Reference { name: name.clone() }),
        Item::Bool(value) => proto::item::Kind::Prim(proto::Primitive {
            kind: Some(proto::primitive::Kind::BooleanValue(*value))
        }),
        Item::Int(value) => proto::item::Kind::Prim(proto::Primitive {
            kind: Some(proto::primitive::Kind::IntDecimalValue(*value))
        }),
        Item::Color(argb) => proto::item::Kind::Prim(proto::Primitive {
            kind: Some(proto::primitive::Kind::ColorArgb8Value(*argb))
        }),
        Item::Id => proto::item::Kind::Id(proto::Id {})
    };
    proto::Item { kind: Some(kind) }
}

fn arity_to_proto(arity: PluralArity) -> proto::Arity {
    match arity {
        PluralArity::Zero => proto::Arity::Zero,
        PluralArity::One => proto::Arity::One,
        PluralArity::Two => proto::Arity::Two,
        PluralArity::Few => proto::Arity::Few,
        PluralArity::Many => proto::Arity::Many,
        PluralArity::Other => proto::Arity::Other
    }
}
