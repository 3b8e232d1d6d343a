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

use core::fmt;
use std::{io, rc::Rc};

use deku::prelude::*;
use zip::result::ZipError;

/// Common error type making it easier to share `Result`s between RESC crates.
///
/// In general designed to avoid needing utilities like `map_err`.
#[derive(Debug, Clone)]
pub enum RescError {
    /// resc-cli encountered an error while processing something specific to
    /// the command line surface. For example, both `--dir` and explicit input
    /// files were passed at once.
    Cli(String),
    /// A resource path had fewer than two components, so there is no type
    /// directory to classify it under.
    BadResourcePath(String),
    /// The qualifier segment after the first `-` in a resource directory name
    /// did not parse as a configuration (eg. `values-notaqualifier`).
    InvalidConfiguration(String),
    /// The directory token before any `-` does not name a known resource
    /// type (eg. `res/bogus/foo.xml`).
    InvalidFilePath(String),
    /// Parsing failed while reading an XML input. See [xml::reader::Error].
    XmlParsingFailed(xml::reader::Error),
    /// A value document parsed as XML but violated the resource grammar
    /// (missing `name`, unknown element, bad typed value, ...). Carries a
    /// human-readable reason including the document position.
    ResourceParsingFailed(String),
    /// Two strong definitions of the same (type, name, configuration) key
    /// appeared within one compilation.
    DuplicateResource(String),
    /// A `.9.png` input's 1-pixel border did not satisfy the 9-patch rules.
    NinePatchFailed(String),
    /// The PNG chunk filter found a malformed stream (bad signature,
    /// truncated chunk, missing IEND).
    CorruptPng(String),
    /// The PNG decoder rejected the input. See [png::DecodingError].
    PngDecodingFailed(Rc<png::DecodingError>),
    /// Re-encoding the RGBA raster failed. See [png::EncodingError].
    PngEncodingFailed(Rc<png::EncodingError>),
    /// When the compiler was trying to serialise a binary chunk struct,
    /// something went wrong. See [DekuError].
    ///
    /// **If you experience this, it is considered an internal bug in RESC.
    /// Please report it.**
    ByteSerialisationFailed(DekuError),
    /// An error occurred while reading an input or writing an output. Since
    /// the compiler core never touches paths it was not given, it's likely
    /// that one of the paths passed to it is invalid, or the disk was full
    /// or similar.
    FileIoError(Rc<io::Error>),
    /// The zip container writer failed. See [ZipError].
    ZipWritingFailed(Rc<ZipError>),
    /// An archive entry was written but could not be finished. Kept separate
    /// from write failures so a truncated container is distinguishable from
    /// a failed payload.
    FinishEntryFailed(String),
    /// At least one input in the batch failed to compile. Carries the count
    /// of failed inputs; the individual reasons went to the diagnostics sink
    /// as they happened.
    CompilationFailed(usize)
}

/// Result type where the error is always [RescError].
pub type Result<T> = std::result::Result<T, RescError>;

impl fmt::Display for RescError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RescError::*;
        match self {
            Cli(msg) => write!(f, "{msg}"),
            BadResourcePath(path) => write!(f, "Resource path \"{path}\" must have at least two components (type directory and file name)."),
            InvalidConfiguration(config) => write!(f, "Directory qualifier \"{config}\" is not a valid configuration."),
            InvalidFilePath(dir) => write!(f, "Directory \"{dir}\" does not name a known resource type."),
            XmlParsingFailed(xml_error) => write!(f, "XML parsing error.\nInternal error: {xml_error:?}"),
            ResourceParsingFailed(reason) => write!(f, "Invalid resource: {reason}"),
            DuplicateResource(name) => write!(f, "Duplicate definition of resource \"{name}\"."),
            NinePatchFailed(reason) => write!(f, "Invalid 9-patch: {reason}"),
            CorruptPng(reason) => write!(f, "Corrupt PNG stream: {reason}"),
            PngDecodingFailed(png_error) => write!(f, "PNG decoding failed.\nInternal error: {png_error:?}"),
            PngEncodingFailed(png_error) => write!(f, "PNG encoding failed.\nInternal error: {png_error:?}"),
            ByteSerialisationFailed(deku_error) => write!(f, "Failed to get byte representation of an object.\nInternal error: {deku_error:?}"),
            FileIoError(io_err) => write!(f, "File I/O failed. Did you specify a valid input/output path?\nInternal error: {io_err:?}"),
            ZipWritingFailed(zip_error) => write!(f, "Failed to write output zip archive.\nInternal error: {zip_error:?}"),
            FinishEntryFailed(entry) => write!(f, "Failed to finish archive entry \"{entry}\"."),
            CompilationFailed(count) => write!(f, "{count} file(s) failed to compile.")
        }
    }
}

// Automatic conversion from other types of error to RescError makes the rest
// of the code cleaner
impl From<io::Error> for RescError {
    fn from(value: io::Error) -> Self {
        RescError::FileIoError(value.into())
    }
}

impl From<DekuError> for RescError {
    fn from(value: DekuError) -> Self {
        RescError::ByteSerialisationFailed(value)
    }
}

impl From<ZipError> for RescError {
    fn from(value: ZipError) -> Self {
        RescError::ZipWritingFailed(value.into())
    }
}

impl From<xml::reader::Error> for RescError {
    fn from(value: xml::reader::Error) -> Self {
        RescError::XmlParsingFailed(value)
    }
}

impl From<png::DecodingError> for RescError {
    fn from(value: png::DecodingError) -> Self {
        RescError::PngDecodingFailed(value.into())
    }
}

impl From<png::EncodingError> for RescError {
    fn from(value: png::EncodingError) -> Self {
        RescError::PngEncodingFailed(value.into())
    }
}

/// How serious a diagnostic is. Errors always mark the current input as
/// failed; warnings and notes never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Note,
    Warning,
    Error
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error")
        }
    }
}

/// Pluggable sink for compiler diagnostics. The compiler core never prints;
/// every message goes through this trait with the input's source path so the
/// caller decides presentation.
pub trait Diagnostics {
    fn log(&mut self, source: &str, severity: Severity, message: &str);
}

/// Binds the diagnostics sink to standard error, one `source: severity:
/// message` line per diagnostic. Notes are only shown in verbose mode.
pub struct StderrDiagnostics {
    pub verbose: bool
}

impl Diagnostics for StderrDiagnostics {
    fn log(&mut self, source: &str, severity: Severity, message: &str) {
        if severity == Severity::Note && !self.verbose {
            return;
        }
        eprintln!("{source}: {severity}: {message}");
    }
}

/// Collects diagnostics in memory. Used by tests to assert on what the
/// compiler reported without capturing stderr.
#[derive(Default)]
pub struct RecordingDiagnostics {
    pub entries: Vec<(String, Severity, String)>
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&mut self, source: &str, severity: Severity, message: &str) {
        self.entries
            .push((source.to_string(), severity, message.to_string()));
    }
}
