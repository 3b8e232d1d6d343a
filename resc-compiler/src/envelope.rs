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

use prost::Message;
use resc_common::*;
use resc_zip::OutputArchive;

use crate::proto;

/// Writes one compiled envelope: a little-endian count, then per file a
/// length-delimited descriptor and a length-prefixed payload.
pub fn write_envelope(
    archive: &mut dyn OutputArchive,
    entry_name: &str,
    files: &[(proto::CompiledFile, &[u8])]
) -> Result<()> {
    archive.start_entry(entry_name)?;
    {
        // Buffer adapter between compiler output and the archive; its scope
        // ends before finish_entry so every buffered byte lands first.
        let mut buffer: Vec<u8> = vec![];
        buffer.extend((files.len() as u32).to_le_bytes());
        for (descriptor, payload) in files {
            buffer.extend(descriptor.encode_length_delimited_to_vec());
            buffer.extend((payload.len() as u64).to_le_bytes());
            buffer.extend_from_slice(payload);
        }
        archive.write_data(&buffer)?;
    }
    archive.finish_entry()
}

/// The values artifact skips the envelope: the serialized table itself is
/// the entry body, which is what the legacy linker path expects.
pub fn write_table_entry(
    archive: &mut dyn OutputArchive,
    entry_name: &str,
    table: &proto::ResourceTable
) -> Result<()> {
    archive.start_entry(entry_name)?;
    archive.write_data(&table.encode_to_vec())?;
    archive.finish_entry()
}

/// Parses an envelope back into its records. The linker-side counterpart of
/// [write_envelope], also what the driver tests assert against.
pub fn read_envelope(data: &[u8]) -> Result<Vec<(proto::CompiledFile, Vec<u8>)>> {
    let corrupt = || RescError::ResourceParsingFailed("truncated compiled envelope".into());
    if data.len() < 4 {
        return Err(corrupt());
    }
    let count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let mut remaining = &data[4..];

    let mut files = vec![];
    for _ in 0..count {
        let descriptor = proto::CompiledFile::decode_length_delimited(&mut remaining)
            .map_err(|_e| corrupt())?;
        if remaining.len() < 8 {
            return Err(corrupt());
        }
        let payload_len = u64::from_le_bytes([
            remaining[0],
            remaining[1],
            remaining[2],
            remaining[3],
            remaining[4],
            remaining[5],
            remaining[6],
            remaining[7]
        ]) as usize;
        remaining = &remaining[8..];
        if remaining.len() < payload_len {
            return Err(corrupt());
        }
        files.push((descriptor, remaining[..payload_len].to_vec()));
        remaining = &remaining[payload_len..];
    }
    Ok(files)
}
