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
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf}
};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Output container for compiled entries. Entries are written strictly
/// sequentially: at most one entry is open at any moment, and a started
/// entry must be finished before the next one begins.
pub trait OutputArchive {
    fn start_entry(&mut self, name: &str) -> Result<()>;
    fn write_data(&mut self, data: &[u8]) -> Result<()>;
    fn finish_entry(&mut self) -> Result<()>;
    /// Seals the container itself. Call once, after the last entry.
    fn finish(&mut self) -> Result<()>;
}

/// Writes each entry as one stored (uncompressed) zip member. The downstream
/// linker maps entries directly, so deflating them would only cost time.
pub struct ZipArchiveWriter {
    zip: Option<ZipWriter<fs::File>>,
    entry: String
}

impl ZipArchiveWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = fs::File::create(path)?;
        Ok(ZipArchiveWriter {
            zip: Some(ZipWriter::new(file)),
            entry: String::new()
        })
    }

    fn writer(&mut self) -> Result<&mut ZipWriter<fs::File>> {
        self.zip
            .as_mut()
            .ok_or_else(|| RescError::FinishEntryFailed("archive already finished".into()))
    }
}

impl OutputArchive for ZipArchiveWriter {
    fn start_entry(&mut self, name: &str) -> Result<()> {
        self.entry = name.to_string();
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer()?.start_file(name, options)?;
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<()> {
        self.writer()?.write_all(data)?;
        Ok(())
    }

    fn finish_entry(&mut self) -> Result<()> {
        // The zip writer seals a member when the next one starts (or on
        // finish), so flushing is all that can fail here.
        let entry = self.entry.clone();
        self.writer()?
            .flush()
            .map_err(|_e| RescError::FinishEntryFailed(entry))
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(zip) = self.zip.take() {
            zip.finish()?;
        }
        Ok(())
    }
}

/// Writes each entry as one file directly under the output directory.
pub struct DirectoryArchiveWriter {
    root: PathBuf,
    current: Option<fs::File>,
    entry: String
}

impl DirectoryArchiveWriter {
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(DirectoryArchiveWriter {
            root: root.to_path_buf(),
            current: None,
            entry: String::new()
        })
    }
}

impl OutputArchive for DirectoryArchiveWriter {
    fn start_entry(&mut self, name: &str) -> Result<()> {
        self.entry = name.to_string();
        self.current = Some(fs::File::create(self.root.join(name))?);
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.current {
            Some(file) => Ok(file.write_all(data)?),
            None => Err(RescError::FileIoError(
                std::io::Error::other("no archive entry is open").into()
            ))
        }
    }

    fn finish_entry(&mut self) -> Result<()> {
        match self.current.take() {
            Some(mut file) => file
                .flush()
                .map_err(|_e| RescError::FinishEntryFailed(self.entry.clone())),
            None => Err(RescError::FinishEntryFailed(self.entry.clone()))
        }
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

const ZIP_EXTENSIONS: &[&str] = &["zip", "flata"];

/// Picks the container kind from the output path: a recognised archive
/// extension gets the zip writer, anything else is treated as a directory.
pub fn open_output(path: &Path) -> Result<Box<dyn OutputArchive>> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ZIP_EXTENSIONS.contains(&ext));
    if is_zip {
        Ok(Box::new(ZipArchiveWriter::create(path)?))
    } else {
        Ok(Box::new(DirectoryArchiveWriter::create(path)?))
    }
}
