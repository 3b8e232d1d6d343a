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

use phf::phf_map;

/// File-based resource kinds the driver can dispatch on. `values` is not
/// listed: value documents are routed before this lookup runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Anim,
    Animator,
    Color,
    Drawable,
    Font,
    Interpolator,
    Layout,
    Menu,
    Mipmap,
    Navigation,
    Raw,
    Transition,
    Xml
}

static RESOURCE_TYPES: phf::Map<&'static str, ResourceType> = phf_map! {
    "anim" => ResourceType::Anim,
    "animator" => ResourceType::Animator,
    "color" => ResourceType::Color,
    "drawable" => ResourceType::Drawable,
    "font" => ResourceType::Font,
    "interpolator" => ResourceType::Interpolator,
    "layout" => ResourceType::Layout,
    "menu" => ResourceType::Menu,
    "mipmap" => ResourceType::Mipmap,
    "navigation" => ResourceType::Navigation,
    "raw" => ResourceType::Raw,
    "transition" => ResourceType::Transition,
    "xml" => ResourceType::Xml,
};

pub fn parse_resource_type(type_dir: &str) -> Option<ResourceType> {
    RESOURCE_TYPES.get(type_dir).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_types() {
        assert_eq!(parse_resource_type("drawable"), Some(ResourceType::Drawable));
        assert_eq!(parse_resource_type("raw"), Some(ResourceType::Raw));
        assert_eq!(parse_resource_type("values"), None);
        assert_eq!(parse_resource_type("bogus"), None);
    }
}
