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

//! # RESC compiler
//!
//! Per-file resource compiler: each input under a `res/`-style tree is
//! classified by its path, transformed by the matching compiler (values
//! table, XML flatten, PNG crunch, or raw pass-through) and written as one
//! entry of the output container.
//!
//! ```no_run
//! use resc_common::StderrDiagnostics;
//! use resc_compiler::{compile_res_dir, CompilerOptions};
//!
//! let mut archive = resc_zip::open_output(std::path::Path::new("out.flata"))?;
//! let mut diag = StderrDiagnostics { verbose: false };
//! compile_res_dir(
//!     std::path::Path::new("res"),
//!     archive.as_mut(),
//!     &CompilerOptions::default(),
//!     &mut diag
//! )?;
//! archive.finish()?;
//! # resc_common::Result::Ok(())
//! ```
//!
//! Inputs are independent: compiling one never needs another, and a failed
//! input marks the batch failed without stopping it.

use std::{
    fs,
    io::BufReader,
    path::{Path, PathBuf}
};

use memmap2::Mmap;
use resc_common::*;
use resc_zip::OutputArchive;

pub mod binary_xml;
pub mod config;
pub mod envelope;
pub mod input;
pub mod nine_patch;
pub mod png_compile;
pub mod proto;
pub mod pseudo;
pub mod res_path;
pub mod res_type;
pub mod string_pool;
pub mod table;
pub mod values;
pub mod xml_flatten;
pub mod xml_tree;

use envelope::{write_envelope, write_table_entry};
use res_path::ResourcePathDescriptor;
use res_type::ResourceType;

const DEFAULT_PACKAGE_ID: u8 = 0x7F;

pub struct CompilerOptions {
    /// The compilation package. May be empty; the linker fills real names in.
    pub package_name: String,
    /// Assigned to every table package still lacking an ID at end of parse.
    pub package_id: u8,
    /// Derive `en-XA` and `ar-XB` variants from default-config strings.
    pub pseudo_localize: bool,
    /// Downgrade positional-argument errors in strings to warnings.
    pub legacy: bool
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            package_name: String::new(),
            package_id: DEFAULT_PACKAGE_ID,
            pseudo_localize: false,
            legacy: false
        }
    }
}

/// Enumerates `root` and compiles everything in it.
pub fn compile_res_dir(
    root: &Path,
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let descriptors = input::enumerate_res_dir(root)?;
    compile_inputs(&descriptors, archive, options, diag)
}

/// Classifies and compiles an explicit input list.
pub fn compile_files(
    paths: &[PathBuf],
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let descriptors = input::classify_inputs(paths)?;
    compile_inputs(&descriptors, archive, options, diag)
}

/// Runs every input to completion in order. A failed input is reported and
/// counted but never stops the batch; the error carries the final count.
pub fn compile_inputs(
    descriptors: &[ResourcePathDescriptor],
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let mut failed = 0usize;
    for descriptor in descriptors {
        match compile_one(descriptor, archive, options, diag) {
            Ok(()) => {}
            Err(err) => {
                diag.log(&descriptor.source, Severity::Error, &err.to_string());
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(RescError::CompilationFailed(failed));
    }
    Ok(())
}

fn compile_one(
    descriptor: &ResourcePathDescriptor,
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    if descriptor.type_dir == "values" {
        return compile_values(descriptor, archive, options, diag);
    }

    let res_type = res_type::parse_resource_type(&descriptor.type_dir)
        .ok_or_else(|| RescError::InvalidFilePath(descriptor.type_dir.clone()))?;
    if res_type == ResourceType::Raw {
        return compile_raw(descriptor, archive, options, diag);
    }
    match descriptor.extension.as_str() {
        "xml" => compile_xml(descriptor, archive, options, diag),
        "png" | "9.png" => compile_png_input(descriptor, archive, options, diag),
        _ => compile_raw(descriptor, archive, options, diag)
    }
}

fn compile_values(
    descriptor: &ResourcePathDescriptor,
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let file = fs::File::open(Path::new(&descriptor.source))?;
    let parser_options = values::ValuesParserOptions {
        translatable_default: !descriptor.name.contains("donottranslate"),
        legacy: options.legacy
    };

    let mut table = table::ResourceTable::default();
    values::parse_values(
        BufReader::new(file),
        &descriptor.source,
        &descriptor.config,
        &options.package_name,
        &parser_options,
        &mut table,
        diag
    )?;

    if options.pseudo_localize {
        pseudo::pseudolocalize_table(&mut table)?;
    }

    // The compilation package exists even when the document defined nothing
    table.get_or_create_package(&options.package_name);
    table.assign_default_package_ids(options.package_id);

    let entry_name = descriptor.with_extension("arsc").entry_name();
    write_table_entry(archive, &entry_name, &table.to_proto())?;
    diag.log(&descriptor.source, Severity::Note, &format!("-> {entry_name}"));
    Ok(())
}

fn compile_xml(
    descriptor: &ResourcePathDescriptor,
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let file = fs::File::open(Path::new(&descriptor.source))?;
    let mut root = xml_tree::parse_tree(BufReader::new(file))?;

    // IDs are collected over the whole document, inline fragments included
    let exported_ids = xml_tree::collect_ids(&root);
    let fragments =
        xml_tree::extract_inline_fragments(&mut root, &descriptor.type_dir, &descriptor.name)?;

    let mut files: Vec<(proto::CompiledFile, Vec<u8>)> = vec![(
        proto::CompiledFile {
            resource_name: descriptor.resource_name(&options.package_name),
            config: Some(descriptor.config.to_proto()),
            source_path: descriptor.source.clone(),
            r#type: proto::FileType::BinaryXml as i32,
            exported_id: exported_ids
        },
        xml_flatten::flatten_document(&root)?
    )];
    for fragment in &fragments {
        files.push((
            proto::CompiledFile {
                resource_name: synthesized_name(descriptor, options, &fragment.name),
                config: Some(descriptor.config.to_proto()),
                source_path: descriptor.source.clone(),
                r#type: proto::FileType::BinaryXml as i32,
                exported_id: vec![]
            },
            xml_flatten::flatten_document(&fragment.root)?
        ));
    }

    let records: Vec<(proto::CompiledFile, &[u8])> = files
        .iter()
        .map(|(file, payload)| (file.clone(), payload.as_slice()))
        .collect();
    write_envelope(archive, &descriptor.entry_name(), &records)?;
    diag.log(
        &descriptor.source,
        Severity::Note,
        &format!("-> {} ({} document(s))", descriptor.entry_name(), files.len())
    );
    Ok(())
}

fn synthesized_name(
    descriptor: &ResourcePathDescriptor,
    options: &CompilerOptions,
    fragment_name: &str
) -> String {
    if options.package_name.is_empty() {
        format!("{}/{}", descriptor.type_dir, fragment_name)
    } else {
        format!(
            "{}:{}/{}",
            options.package_name, descriptor.type_dir, fragment_name
        )
    }
}

fn compile_png_input(
    descriptor: &ResourcePathDescriptor,
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let data = fs::read(Path::new(&descriptor.source))?;
    let payload = png_compile::compile_png(&data, descriptor.extension == "9.png")?;

    let file = proto::CompiledFile {
        resource_name: descriptor.resource_name(&options.package_name),
        config: Some(descriptor.config.to_proto()),
        source_path: descriptor.source.clone(),
        r#type: proto::FileType::Png as i32,
        exported_id: vec![]
    };
    write_envelope(archive, &descriptor.entry_name(), &[(file, &payload)])?;
    diag.log(
        &descriptor.source,
        Severity::Note,
        &format!("-> {} ({} bytes)", descriptor.entry_name(), payload.len())
    );
    Ok(())
}

fn compile_raw(
    descriptor: &ResourcePathDescriptor,
    archive: &mut dyn OutputArchive,
    options: &CompilerOptions,
    diag: &mut dyn Diagnostics
) -> Result<()> {
    let file = fs::File::open(Path::new(&descriptor.source))?;
    // Read-only mapping, released once the envelope write returns
    let map = unsafe { Mmap::map(&file)? };

    let compiled = proto::CompiledFile {
        resource_name: descriptor.resource_name(&options.package_name),
        config: Some(descriptor.config.to_proto()),
        source_path: descriptor.source.clone(),
        r#type: proto::FileType::Unknown as i32,
        exported_id: vec![]
    };
    write_envelope(archive, &descriptor.entry_name(), &[(compiled, &map[..])])?;
    diag.log(
        &descriptor.source,
        Severity::Note,
        &format!("-> {} (verbatim)", descriptor.entry_name())
    );
    Ok(())
}
