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

// Wire format consumed by the linker. The message structs are annotated by
// hand rather than generated, so building the workspace needs no protoc;
// field tags are part of the linker contract and must not be renumbered.

/// Top-level artifact of a values compilation. Written directly as the
/// archive entry body.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ResourceTable {
    #[prost(message, repeated, tag = "1")]
    pub package: Vec<Package>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Package {
    #[prost(message, optional, tag = "1")]
    pub package_id: Option<PackageId>,
    #[prost(string, tag = "2")]
    pub package_name: String,
    #[prost(message, repeated, tag = "3")]
    pub r#type: Vec<Type>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PackageId {
    #[prost(uint32, tag = "1")]
    pub id: u32
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Type {
    #[prost(message, optional, tag = "1")]
    pub type_id: Option<TypeId>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "3")]
    pub entry: Vec<Entry>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TypeId {
    #[prost(uint32, tag = "1")]
    pub id: u32
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Entry {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub config_value: Vec<ConfigValue>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ConfigValue {
    #[prost(message, optional, tag = "1")]
    pub config: Option<Configuration>,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Value {
    /// Weak values may be overridden by a later strong definition of the
    /// same key. Pseudo-localized entries are emitted weak.
    #[prost(bool, tag = "1")]
    pub weak: bool,
    #[prost(oneof = "value::Kind", tags = "2, 3")]
    pub kind: Option<value::Kind>
}

pub mod value {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "2")]
        Item(super::Item),
        #[prost(message, tag = "3")]
        CompoundValue(super::CompoundValue)
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Item {
    #[prost(oneof = "item::Kind", tags = "1, 2, 3, 4, 5")]
    pub kind: Option<item::Kind>
}

pub mod item {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        /// Unresolved reference such as `@string/title` or `?attr/color`.
        #[prost(message, tag = "1")]
        Ref(super::Reference),
        #[prost(message, tag = "2")]
        Str(super::StringValue),
        #[prost(message, tag = "3")]
        RawStr(super::RawString),
        #[prost(message, tag = "4")]
        Prim(super::Primitive),
        #[prost(message, tag = "5")]
        Id(super::Id)
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Reference {
    #[prost(string, tag = "1")]
    pub name: String
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StringValue {
    #[prost(string, tag = "1")]
    pub value: String,
    #[prost(bool, tag = "2")]
    pub translatable: bool
}

/// Carries text the compiler does not interpret, such as dimension values.
/// The linker owns their grammar.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RawString {
    #[prost(string, tag = "1")]
    pub value: String
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Id {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Primitive {
    #[prost(oneof = "primitive::Kind", tags = "1, 2, 3")]
    pub kind: Option<primitive::Kind>
}

pub mod primitive {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(int32, tag = "1")]
        IntDecimalValue(i32),
        #[prost(bool, tag = "2")]
        BooleanValue(bool),
        #[prost(uint32, tag = "3")]
        ColorArgb8Value(u32)
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CompoundValue {
    #[prost(oneof = "compound_value::Kind", tags = "1, 2, 3")]
    pub kind: Option<compound_value::Kind>
}

pub mod compound_value {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Plural(super::Plural),
        #[prost(message, tag = "2")]
        Array(super::Array),
        #[prost(message, tag = "3")]
        Style(super::Style)
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Plural {
    #[prost(message, repeated, tag = "1")]
    pub entry: Vec<PluralEntry>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PluralEntry {
    #[prost(enumeration = "Arity", tag = "1")]
    pub arity: i32,
    #[prost(message, optional, tag = "2")]
    pub item: Option<Item>
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Arity {
    Zero = 0,
    One = 1,
    Two = 2,
    Few = 3,
    Many = 4,
    Other = 5
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Array {
    #[prost(message, repeated, tag = "1")]
    pub element: Vec<Item>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Style {
    /// Empty when the style declares no parent.
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(message, repeated, tag = "2")]
    pub entry: Vec<StyleEntry>
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StyleEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(message, optional, tag = "2")]
    pub item: Option<Item>
}

/// Structured form of a directory qualifier set. Unset scalar fields mean
/// "any"; unset enums are their zero variant.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Configuration {
    #[prost(string, tag = "1")]
    pub locale: String,
    #[prost(uint32, tag = "2")]
    pub density: u32,
    #[prost(uint32, tag = "3")]
    pub sdk_version: u32,
    #[prost(uint32, tag = "4")]
    pub smallest_screen_width_dp: u32,
    #[prost(uint32, tag = "5")]
    pub screen_width_dp: u32,
    #[prost(uint32, tag = "6")]
    pub screen_height_dp: u32,
    #[prost(enumeration = "LayoutDirection", tag = "7")]
    pub layout_direction: i32,
    #[prost(enumeration = "ScreenLayoutSize", tag = "8")]
    pub screen_layout_size: i32,
    #[prost(enumeration = "Orientation", tag = "9")]
    pub orientation: i32,
    #[prost(enumeration = "UiModeNight", tag = "10")]
    pub ui_mode_night: i32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LayoutDirection {
    UnsetLayoutDirection = 0,
    Ldltr = 1,
    Ldrtl = 2
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ScreenLayoutSize {
    UnsetScreenLayoutSize = 0,
    Small = 1,
    Normal = 2,
    Large = 3,
    Xlarge = 4
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Orientation {
    UnsetOrientation = 0,
    Port = 1,
    Land = 2,
    Square = 3
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum UiModeNight {
    UnsetUiModeNight = 0,
    Night = 1,
    NotNight = 2
}

/// Descriptor record preceding each payload in a compiled envelope.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CompiledFile {
    /// `type/name`, or `package:type/name` when a compilation package is set.
    #[prost(string, tag = "1")]
    pub resource_name: String,
    #[prost(message, optional, tag = "2")]
    pub config: Option<Configuration>,
    #[prost(string, tag = "3")]
    pub source_path: String,
    #[prost(enumeration = "FileType", tag = "4")]
    pub r#type: i32,
    /// Names defined via `@+id/name` attribute values in an XML input.
    #[prost(string, repeated, tag = "5")]
    pub exported_id: Vec<String>
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum FileType {
    Unknown = 0,
    Png = 1,
    BinaryXml = 2
}
