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

// A .9.png carries its stretch and padding rules as a 1-pixel border: black
// runs on the top/left edges mark stretchable regions, black runs on the
// bottom/right edges mark the content box. The compiler consumes the border
// and replaces it with a serialized metadata chunk.
use deku::prelude::*;
use deku::DekuContainerWrite;
use resc_common::*;

/// Region color meaning "draw normally". Per-region color analysis is a
/// renderer optimization, so every region gets this.
const NO_COLOR: u32 = 0x0000_0001;

#[derive(Debug, PartialEq, DekuWrite)]
struct NinePatchChunk {
    was_deserialized: u8,
    num_x_divs: u8,
    num_y_divs: u8,
    num_colors: u8,
    x_divs_offset: u32,
    y_divs_offset: u32,
    padding_left: u32,
    padding_right: u32,
    padding_top: u32,
    padding_bottom: u32,
    colors_offset: u32,
    x_divs: Vec<u32>,
    y_divs: Vec<u32>,
    colors: Vec<u32>
}

// Fixed-size part of NinePatchChunk, before the three arrays
const CHUNK_HEADER_SIZE: u32 = 32;

/// Stretch and padding metadata scanned off a 9-patch border. Coordinates
/// are in the stripped image's space.
#[derive(Debug, Clone, PartialEq)]
pub struct NinePatch {
    /// Alternating region boundaries: `[start, end)` per stretch run.
    pub x_divs: Vec<u32>,
    pub y_divs: Vec<u32>,
    /// left, right, top, bottom
    pub padding: [u32; 4]
}

impl NinePatch {
    /// Reads the 1-pixel border of an RGBA raster. Border pixels must be
    /// pure black or fully transparent; both axes need at least one
    /// stretch run.
    pub fn from_border(rgba: &[u8], width: u32, height: u32) -> Result<NinePatch> {
        if width < 3 || height < 3 {
            return Err(RescError::NinePatchFailed(format!(
                "image must be at least 3x3, got {width}x{height}"
            )));
        }

        let top: Vec<bool> = (1..width - 1)
            .map(|x| is_black(rgba, width, x, 0))
            .collect::<Result<_>>()?;
        let left: Vec<bool> = (1..height - 1)
            .map(|y| is_black(rgba, width, 0, y))
            .collect::<Result<_>>()?;
        let bottom: Vec<bool> = (1..width - 1)
            .map(|x| is_black(rgba, width, x, height - 1))
            .collect::<Result<_>>()?;
        let right: Vec<bool> = (1..height - 1)
            .map(|y| is_black(rgba, width, width - 1, y))
            .collect::<Result<_>>()?;

        let x_divs = find_runs(&top);
        if x_divs.is_empty() {
            return Err(RescError::NinePatchFailed(
                "no horizontal stretch region on the top edge".into()
            ));
        }
        let y_divs = find_runs(&left);
        if y_divs.is_empty() {
            return Err(RescError::NinePatchFailed(
                "no vertical stretch region on the left edge".into()
            ));
        }

        let (padding_left, padding_right) = padding_of(&bottom);
        let (padding_top, padding_bottom) = padding_of(&right);

        Ok(NinePatch {
            x_divs,
            y_divs,
            padding: [padding_left, padding_right, padding_top, padding_bottom]
        })
    }

    /// Serialized `npTc` chunk payload.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let num_x_divs = self.x_divs.len() as u8;
        let num_y_divs = self.y_divs.len() as u8;
        let num_colors = (num_x_divs as u32 + 1) * (num_y_divs as u32 + 1);
        let x_divs_offset = CHUNK_HEADER_SIZE;
        let y_divs_offset = x_divs_offset + 4 * num_x_divs as u32;
        let colors_offset = y_divs_offset + 4 * num_y_divs as u32;
        let chunk = NinePatchChunk {
            was_deserialized: 0,
            num_x_divs,
            num_y_divs,
            num_colors: num_colors as u8,
            x_divs_offset,
            y_divs_offset,
            padding_left: self.padding[0],
            padding_right: self.padding[1],
            padding_top: self.padding[2],
            padding_bottom: self.padding[3],
            colors_offset,
            x_divs: self.x_divs.clone(),
            y_divs: self.y_divs.clone(),
            colors: vec![NO_COLOR; num_colors as usize]
        };
        Ok(chunk.to_bytes()?)
    }
}

/// Fresh `(height-2) x (width-2)` raster with the border removed.
pub fn strip_border(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (width, height) = (width as usize, height as usize);
    let mut stripped = Vec::with_capacity((width - 2) * (height - 2) * 4);
    for y in 1..height - 1 {
        let row_start = (y * width + 1) * 4;
        let row_end = (y * width + width - 1) * 4;
        stripped.extend_from_slice(&rgba[row_start..row_end]);
    }
    stripped
}

fn is_black(rgba: &[u8], width: u32, x: u32, y: u32) -> Result<bool> {
    let offset = ((y * width + x) * 4) as usize;
    let [r, g, b, a] = [
        rgba[offset],
        rgba[offset + 1],
        rgba[offset + 2],
        rgba[offset + 3]
    ];
    if a == 0 {
        return Ok(false);
    }
    if a == 0xFF && r == 0 && g == 0 && b == 0 {
        return Ok(true);
    }
    Err(RescError::NinePatchFailed(format!(
        "border pixel at ({x}, {y}) must be pure black or transparent"
    )))
}

/// `[start, end)` pairs of the marked runs, in stripped coordinates.
fn find_runs(edge: &[bool]) -> Vec<u32> {
    let mut divs = vec![];
    let mut run_start: Option<usize> = None;
    for (i, marked) in edge.iter().enumerate() {
        match (run_start, marked) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                divs.push(start as u32);
                divs.push(i as u32);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        divs.push(start as u32);
        divs.push(edge.len() as u32);
    }
    divs
}

/// Content box from a padding edge: distance from each end to the marked
/// span. An unmarked edge means no padding.
fn padding_of(edge: &[bool]) -> (u32, u32) {
    let first = edge.iter().position(|m| *m);
    let last = edge.iter().rposition(|m| *m);
    match (first, last) {
        (Some(first), Some(last)) => {
            (first as u32, (edge.len() - 1 - last) as u32)
        }
        _ => (0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: [u8; 4] = [0, 0, 0, 0xFF];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];
    const WHITE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

    /// Builds a square 9-patch raster with single-pixel stretch marks in
    /// the middle of the top and left edges, and a content box covering
    /// the middle of the bottom and right edges.
    fn marked_raster(size: u32) -> Vec<u8> {
        let mid = size / 2;
        let mut rgba = vec![];
        for y in 0..size {
            for x in 0..size {
                let border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                let pixel = if !border {
                    WHITE
                } else if (y == 0 && x == mid)
                    || (x == 0 && y == mid)
                    || (y == size - 1 && x >= 2 && x < size - 2)
                    || (x == size - 1 && y >= 2 && y < size - 2)
                {
                    BLACK
                } else {
                    CLEAR
                };
                rgba.extend_from_slice(&pixel);
            }
        }
        rgba
    }

    #[test]
    fn border_scan_finds_divs_and_padding() {
        let rgba = marked_raster(8);
        let nine_patch = NinePatch::from_border(&rgba, 8, 8).unwrap();
        // Single marked pixel at x=4 maps to stripped [3, 4)
        assert_eq!(nine_patch.x_divs, vec![3, 4]);
        assert_eq!(nine_patch.y_divs, vec![3, 4]);
        // Content box spans x in [2, 6) source = [1, 5) stripped, so one
        // pixel of padding each side of the 6-wide interior
        assert_eq!(nine_patch.padding, [1, 1, 1, 1]);
    }

    #[test]
    fn stray_border_color_is_rejected() {
        let mut rgba = marked_raster(8);
        // Paint one border pixel red
        rgba[4] = 0xFF;
        rgba[5] = 0;
        rgba[6] = 0;
        rgba[7] = 0xFF;
        assert!(matches!(
            NinePatch::from_border(&rgba, 8, 8),
            Err(RescError::NinePatchFailed(_))
        ));
    }

    #[test]
    fn missing_stretch_region_is_rejected() {
        let mut rgba = marked_raster(8);
        // Erase the top-edge mark
        let mid = 4usize;
        for (i, byte) in CLEAR.iter().enumerate() {
            rgba[mid * 4 + i] = *byte;
        }
        assert!(NinePatch::from_border(&rgba, 8, 8).is_err());
    }

    #[test]
    fn strip_border_drops_one_pixel_ring() {
        let rgba = marked_raster(8);
        let stripped = strip_border(&rgba, 8, 8);
        assert_eq!(stripped.len(), 6 * 6 * 4);
        // Interior is all white
        assert!(stripped.chunks(4).all(|px| px == WHITE));
    }

    #[test]
    fn serialized_chunk_has_expected_layout() {
        let rgba = marked_raster(8);
        let nine_patch = NinePatch::from_border(&rgba, 8, 8).unwrap();
        let chunk = nine_patch.serialize().unwrap();
        // 32-byte header, 2 x-divs, 2 y-divs, 9 region colors
        assert_eq!(chunk.len(), 32 + 8 + 8 + 36);
        assert_eq!(chunk[1], 2);
        assert_eq!(chunk[2], 2);
        assert_eq!(chunk[3], 9);
        // x_divs_offset little-endian
        assert_eq!(&chunk[4..8], &[32, 0, 0, 0]);
    }
}
