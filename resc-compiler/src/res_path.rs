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
use std::path::Path;

use crate::config::ConfigDescription;

/// Everything the driver needs to know about one input, derived purely from
/// its path. Only the last two path components matter; anything above them
/// is carried along in `source` for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePathDescriptor {
    /// Original path as given, used as the diagnostics prefix.
    pub source: String,
    /// Directory token before any `-`, eg. `values`, `drawable`.
    pub type_dir: String,
    /// File name up to the first `.`.
    pub name: String,
    /// Everything after the first `.`: empty, `xml`, `png`, `9.png`, ...
    pub extension: String,
    /// Raw qualifier segment after the first `-` in the directory token.
    pub config_str: String,
    pub config: ConfigDescription
}

/// Parses `.../type[-qualifiers]/name[.ext]` into a descriptor.
///
/// The file name splits on the *first* dot so `foo.9.png` keeps its double
/// extension; 9-patch dispatch depends on that.
pub fn classify(path: &Path) -> Result<ResourcePathDescriptor> {
    let source = path.display().to_string();
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if components.len() < 2 {
        return Err(RescError::BadResourcePath(source));
    }

    let dir_token = &components[components.len() - 2];
    let (type_dir, config_str) = match dir_token.split_once('-') {
        Some((type_dir, config_str)) => (type_dir.to_string(), config_str.to_string()),
        None => (dir_token.clone(), String::new())
    };
    let config = ConfigDescription::parse(&config_str)
        .ok_or_else(|| RescError::InvalidConfiguration(config_str.clone()))?;

    let file_name = &components[components.len() - 1];
    let (name, extension) = match file_name.split_once('.') {
        Some((name, extension)) => (name.to_string(), extension.to_string()),
        None => (file_name.clone(), String::new())
    };

    Ok(ResourcePathDescriptor {
        source,
        type_dir,
        name,
        extension,
        config_str,
        config
    })
}

impl ResourcePathDescriptor {
    /// Same descriptor with the extension replaced. The values path uses
    /// this to name its table artifact `arsc` instead of `xml`.
    pub fn with_extension(&self, extension: &str) -> ResourcePathDescriptor {
        ResourcePathDescriptor {
            extension: extension.to_string(),
            ..self.clone()
        }
    }

    /// Archive entry name: `type_dir[-config_str]_name[.extension].flat`.
    pub fn entry_name(&self) -> String {
        let mut entry = self.type_dir.clone();
        if !self.config_str.is_empty() {
            entry.push('-');
            entry.push_str(&self.config_str);
        }
        entry.push('_');
        entry.push_str(&self.name);
        if !self.extension.is_empty() {
            entry.push('.');
            entry.push_str(&self.extension);
        }
        entry.push_str(".flat");
        entry
    }

    /// `type/name`, or `package:type/name` when a compilation package is set.
    pub fn resource_name(&self, package: &str) -> String {
        if package.is_empty() {
            format!("{}/{}", self.type_dir, self.name)
        } else {
            format!("{}:{}/{}", package, self.type_dir, self.name)
        }
    }
}
