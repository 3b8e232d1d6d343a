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

use std::io::Write;

use resc_common::*;

use crate::nine_patch::{strip_border, NinePatch};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// Chunks a renderer needs; every ancillary chunk outside this list is
// metadata weight the artifact can shed.
const ALLOWED_CHUNKS: &[&[u8; 4]] = &[b"IHDR", b"PLTE", b"tRNS", b"IDAT", b"IEND"];

/// Streams `data` through the chunk allow-list into `out`, returning the
/// byte count written. Run against a sink to measure, against a buffer to
/// materialize; the two can never disagree.
pub fn filter_chunks<W: Write>(data: &[u8], mut out: W) -> Result<u64> {
    if data.len() < 8 || data[0..8] != PNG_SIGNATURE {
        return Err(RescError::CorruptPng("bad signature".into()));
    }
    out.write_all(&PNG_SIGNATURE)?;
    let mut written = 8u64;

    let mut offset = 8;
    loop {
        if offset + 8 > data.len() {
            return Err(RescError::CorruptPng("truncated chunk header".into()));
        }
        let length = u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3]
        ]) as usize;
        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(&data[offset + 4..offset + 8]);
        // length + type + data + crc
        let chunk_end = offset + 8 + length + 4;
        if chunk_end > data.len() {
            return Err(RescError::CorruptPng(format!(
                "chunk {} runs past end of stream",
                String::from_utf8_lossy(&chunk_type)
            )));
        }

        if ALLOWED_CHUNKS.iter().any(|allowed| **allowed == chunk_type) {
            out.write_all(&data[offset..chunk_end])?;
            written += (chunk_end - offset) as u64;
        }
        offset = chunk_end;
        if &chunk_type == b"IEND" {
            return Ok(written);
        }
    }
}

/// Decodes any supported PNG into an RGBA8 raster.
pub fn decode_rgba(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xFF])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 0xFF]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        // EXPAND turns palettes into direct color before we get here
        png::ColorType::Indexed => {
            return Err(RescError::CorruptPng("palette was not expanded".into()))
        }
    };
    Ok((rgba, info.width, info.height))
}

fn encode_rgba(
    rgba: &[u8],
    width: u32,
    height: u32,
    nine_patch_chunk: Option<&[u8]>
) -> Result<Vec<u8>> {
    let mut out = vec![];
    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    if let Some(chunk) = nine_patch_chunk {
        // Must precede the image data so renderers can size buffers early
        writer.write_chunk(png::chunk::ChunkType(*b"npTc"), chunk)?;
    }
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(out)
}

/// Produces the payload for one PNG input.
///
/// A 9-patch always uses the re-encoded image: the border strip is
/// mandatory, so the original bytes are never a valid output. For plain
/// images the smaller of the re-encoding and the chunk-filtered original
/// wins, re-encoding on ties.
pub fn compile_png(data: &[u8], nine_patch: bool) -> Result<Vec<u8>> {
    let filtered_size = filter_chunks(data, std::io::sink())?;
    let (rgba, width, height) = decode_rgba(data)?;

    if nine_patch {
        let patch = NinePatch::from_border(&rgba, width, height)?;
        let chunk = patch.serialize()?;
        let stripped = strip_border(&rgba, width, height);
        return encode_rgba(&stripped, width - 2, height - 2, Some(&chunk));
    }

    // TODO: Try an indexed-color re-encode for small flat-color drawables,
    //   it should beat RGBA on most icons. imagequant seems perfect.
    let encoded = encode_rgba(&rgba, width, height, None)?;
    if encoded.len() as u64 <= filtered_size {
        Ok(encoded)
    } else {
        let mut filtered = Vec::with_capacity(filtered_size as usize);
        filter_chunks(data, &mut filtered)?;
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_raster(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        pixel.repeat((width * height) as usize)
    }

    /// 9-patch raster with single-pixel stretch marks centered on the top
    /// and left edges, rest of the border transparent.
    fn nine_patch_raster(size: u32) -> Vec<u8> {
        let mid = size / 2;
        let mut rgba = vec![];
        for y in 0..size {
            for x in 0..size {
                let border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                let pixel = if !border {
                    [0x20, 0x40, 0x80, 0xFF]
                } else if (y == 0 && x == mid) || (x == 0 && y == mid) {
                    [0, 0, 0, 0xFF]
                } else {
                    [0, 0, 0, 0]
                };
                rgba.extend_from_slice(&pixel);
            }
        }
        rgba
    }

    fn chunk_names(data: &[u8]) -> Vec<String> {
        let mut names = vec![];
        let mut offset = 8;
        while offset + 8 <= data.len() {
            let length = u32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3]
            ]) as usize;
            names.push(String::from_utf8_lossy(&data[offset + 4..offset + 8]).into_owned());
            offset += 8 + length + 4;
        }
        names
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(matches!(
            filter_chunks(b"not a png at all", std::io::sink()),
            Err(RescError::CorruptPng(_))
        ));
        assert!(compile_png(&[0x89, 0x50], false).is_err());
    }

    #[test]
    fn chunk_filter_drops_ancillary_chunks() {
        let rgba = flat_raster(4, 4, [1, 2, 3, 0xFF]);
        let mut data = vec![];
        {
            let mut encoder = png::Encoder::new(&mut data, 4, 4);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_chunk(png::chunk::ChunkType(*b"tEXt"), b"comment\0kept out")
                .unwrap();
            writer.write_image_data(&rgba).unwrap();
            writer.finish().unwrap();
        }
        assert!(chunk_names(&data).contains(&"tEXt".to_string()));

        let mut filtered = vec![];
        let written = filter_chunks(&data, &mut filtered).unwrap();
        assert_eq!(written as usize, filtered.len());
        assert!(!chunk_names(&filtered).contains(&"tEXt".to_string()));
        // Still a decodable image
        let (_, width, height) = decode_rgba(&filtered).unwrap();
        assert_eq!((width, height), (4, 4));
    }

    #[test]
    fn selection_follows_the_smaller_payload() {
        let rgba = flat_raster(16, 16, [7, 7, 7, 0xFF]);
        let data = encode_rgba(&rgba, 16, 16, None).unwrap();

        let filtered_size = filter_chunks(&data, std::io::sink()).unwrap();
        let reencoded = encode_rgba(&decode_rgba(&data).unwrap().0, 16, 16, None).unwrap();
        let payload = compile_png(&data, false).unwrap();
        if reencoded.len() as u64 <= filtered_size {
            assert_eq!(payload, reencoded);
        } else {
            assert_eq!(payload.len() as u64, filtered_size);
        }
    }

    #[test]
    fn nine_patch_strips_border_and_embeds_chunk() {
        let rgba = nine_patch_raster(12);
        let data = encode_rgba(&rgba, 12, 12, None).unwrap();

        let payload = compile_png(&data, true).unwrap();
        let (out_rgba, width, height) = decode_rgba(&payload).unwrap();
        assert_eq!((width, height), (10, 10));
        assert!(chunk_names(&payload).contains(&"npTc".to_string()));
        // The stripped raster is the uniform interior
        assert!(out_rgba.chunks(4).all(|px| px == [0x20, 0x40, 0x80, 0xFF]));
    }

    #[test]
    fn invalid_nine_patch_border_fails_compilation() {
        // Border pixels are neither black nor transparent
        let rgba = flat_raster(12, 12, [9, 9, 9, 0xFF]);
        let data = encode_rgba(&rgba, 12, 12, None).unwrap();
        assert!(matches!(
            compile_png(&data, true),
            Err(RescError::NinePatchFailed(_))
        ));
    }
}
