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

use std::{
    fs,
    path::{Path, PathBuf}
};

use resc_common::*;

use crate::res_path::{classify, ResourcePathDescriptor};

/// Walks a resource root two levels deep: type directories, then their
/// files. Dotted entries are skipped at both levels, non-directories
/// directly under the root are skipped silently, and any classification
/// failure aborts the walk — a well-formed tree contains only well-formed
/// paths.
///
/// Entries are visited in lexicographic order so compilation order (and
/// with it archive layout and diagnostics) is reproducible.
pub fn enumerate_res_dir(root: &Path) -> Result<Vec<ResourcePathDescriptor>> {
    let mut descriptors = vec![];
    for type_dir in sorted_entries(root)? {
        if is_dotted(&type_dir) || !type_dir.is_dir() {
            continue;
        }
        for file in sorted_entries(&type_dir)? {
            if is_dotted(&file) || file.is_dir() {
                continue;
            }
            descriptors.push(classify(&file)?);
        }
    }
    Ok(descriptors)
}

/// Classifies an explicit input list, aborting on the first failure before
/// any compilation runs.
pub fn classify_inputs(paths: &[PathBuf]) -> Result<Vec<ResourcePathDescriptor>> {
    paths.iter().map(|path| classify(path)).collect()
}

fn is_dotted(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = vec![];
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn walk_skips_dotted_and_stray_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("res");
        touch(&root.join("values/strings.xml"));
        touch(&root.join("drawable-hdpi/icon.png"));
        touch(&root.join(".git/config"));
        touch(&root.join("drawable/.hidden"));
        touch(&root.join("README"));
        fs::create_dir_all(root.join("raw/nested")).unwrap();

        let descriptors = enumerate_res_dir(&root).unwrap();
        let names: Vec<String> = descriptors.iter().map(|d| d.entry_name()).collect();
        assert_eq!(
            names,
            vec!["drawable-hdpi_icon.png.flat", "values_strings.xml.flat"]
        );
    }

    #[test]
    fn bad_qualifier_aborts_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("res");
        touch(&root.join("drawable-nonsense/icon.png"));
        touch(&root.join("values/strings.xml"));

        assert!(matches!(
            enumerate_res_dir(&root),
            Err(RescError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn explicit_mode_aborts_before_compiling_anything() {
        let good = PathBuf::from("res/values/strings.xml");
        let bad = PathBuf::from("orphan.xml");
        assert!(matches!(
            classify_inputs(&[good.clone(), bad]),
            Err(RescError::BadResourcePath(_))
        ));

        let descriptors = classify_inputs(&[good]).unwrap();
        assert_eq!(descriptors[0].type_dir, "values");
    }
}
