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

// End-to-end driver scenarios: a resource tree goes in, a directory
// container of .flat entries comes out, and the entries decode back.

use std::{fs, path::Path, path::PathBuf};

use prost::Message;
use resc_common::{RecordingDiagnostics, RescError};
use resc_compiler::{
    compile_files, compile_res_dir, envelope::read_envelope, png_compile::decode_rgba, proto,
    CompilerOptions
};
use resc_zip::OutputArchive;
use resc_zip::DirectoryArchiveWriter;

struct Scratch {
    _dir: tempfile::TempDir,
    res: PathBuf,
    out: PathBuf
}

fn scratch() -> Scratch {
    let dir = tempfile::tempdir().unwrap();
    let res = dir.path().join("res");
    let out = dir.path().join("out");
    fs::create_dir_all(&res).unwrap();
    Scratch {
        _dir: dir,
        res,
        out
    }
}

fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn compile_dir(scratch: &Scratch, options: &CompilerOptions) -> resc_common::Result<()> {
    let mut archive = DirectoryArchiveWriter::create(&scratch.out).unwrap();
    let mut diag = RecordingDiagnostics::default();
    let result = compile_res_dir(&scratch.res, &mut archive, options, &mut diag);
    archive.finish().unwrap();
    result
}

fn encode_png(rgba: &[u8], width: u32, height: u32, color: png::ColorType) -> Vec<u8> {
    let mut out = vec![];
    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(rgba).unwrap();
    writer.finish().unwrap();
    out
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

fn find_string<'a>(table: &'a proto::ResourceTable, name: &str) -> &'a proto::Entry {
    table.package[0]
        .r#type
        .iter()
        .find(|t| t.name == "string")
        .unwrap()
        .entry
        .iter()
        .find(|e| e.name == name)
        .unwrap()
}

fn string_of(config_value: &proto::ConfigValue) -> &proto::StringValue {
    match config_value.value.as_ref().unwrap().kind.as_ref().unwrap() {
        proto::value::Kind::Item(item) => match item.kind.as_ref().unwrap() {
            proto::item::Kind::Str(s) => s,
            other => panic!("expected string, got {other:?}")
        },
        other => panic!("expected item, got {other:?}")
    }
}

#[test]
fn values_with_pseudo_locales_gain_xa_and_xb_variants() {
    let scratch = scratch();
    write_file(
        &scratch.res,
        "values/strings.xml",
        br#"<resources><string name="hi">Hi</string></resources>"#
    );

    let options = CompilerOptions {
        pseudo_localize: true,
        ..CompilerOptions::default()
    };
    compile_dir(&scratch, &options).unwrap();

    let data = fs::read(scratch.out.join("values_strings.arsc.flat")).unwrap();
    let table = proto::ResourceTable::decode(data.as_slice()).unwrap();
    assert_eq!(table.package[0].package_id, Some(proto::PackageId { id: 0x7F }));

    let entry = find_string(&table, "hi");
    assert_eq!(entry.config_value.len(), 3);
    let locales: Vec<String> = entry
        .config_value
        .iter()
        .map(|cv| cv.config.as_ref().unwrap().locale.clone())
        .collect();
    assert_eq!(locales, vec!["", "en-XA", "ar-XB"]);

    assert!(!entry.config_value[0].value.as_ref().unwrap().weak);
    assert!(entry.config_value[1].value.as_ref().unwrap().weak);
    let accented = string_of(&entry.config_value[1]);
    assert!(accented.value.starts_with('['));
    let wrapped = string_of(&entry.config_value[2]);
    assert!(wrapped.value.contains("Hi"));
}

#[test]
fn donottranslate_files_default_to_untranslatable() {
    let scratch = scratch();
    write_file(
        &scratch.res,
        "values-fr/donottranslate.xml",
        br#"<resources><string name="build_stamp">1234</string></resources>"#
    );

    compile_dir(&scratch, &CompilerOptions::default()).unwrap();

    let data = fs::read(scratch.out.join("values-fr_donottranslate.arsc.flat")).unwrap();
    let table = proto::ResourceTable::decode(data.as_slice()).unwrap();
    let entry = find_string(&table, "build_stamp");
    let string = string_of(&entry.config_value[0]);
    assert_eq!(string.value, "1234");
    assert!(!string.translatable);
    assert_eq!(
        entry.config_value[0].config.as_ref().unwrap().locale,
        "fr"
    );
}

#[test]
fn inline_fragment_becomes_second_compiled_file() {
    let scratch = scratch();
    write_file(
        &scratch.res,
        "layout/main.xml",
        br#"<View xmlns:android="http://schemas.android.com/apk/res/android"
                 xmlns:aapt="http://schemas.android.com/aapt"
                 android:id="@+id/root">
               <aapt:attr name="android:background"><shape/></aapt:attr>
             </View>"#
    );

    compile_dir(&scratch, &CompilerOptions::default()).unwrap();

    let data = fs::read(scratch.out.join("layout_main.xml.flat")).unwrap();
    assert_eq!(&data[0..4], &[2, 0, 0, 0]);

    let files = read_envelope(&data).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].0.resource_name, "layout/main");
    assert_eq!(files[0].0.exported_id, vec!["root"]);
    assert_eq!(files[1].0.resource_name, "layout/$main__0");

    // The primary document now references the synthesized one
    let reference = b"@layout/$main__0";
    assert!(files[0]
        .1
        .windows(reference.len())
        .any(|window| window == reference));
    // And the fragment's root element survived extraction
    let shape = b"shape";
    assert!(files[1].1.windows(shape.len()).any(|window| window == shape));
}

#[test]
fn nine_patch_is_stripped_regardless_of_size() {
    let scratch = scratch();
    let size = 12u32;
    let mid = size / 2;
    let mut rgba = vec![];
    for y in 0..size {
        for x in 0..size {
            let border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
            let pixel: [u8; 4] = if !border {
                [0xAA, 0xBB, 0xCC, 0xFF]
            } else if (y == 0 && x == mid) || (x == 0 && y == mid) {
                [0, 0, 0, 0xFF]
            } else {
                [0, 0, 0, 0]
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    write_file(
        &scratch.res,
        "drawable-hdpi/icon.9.png",
        &encode_png(&rgba, size, size, png::ColorType::Rgba)
    );

    compile_dir(&scratch, &CompilerOptions::default()).unwrap();

    let data = fs::read(scratch.out.join("drawable-hdpi_icon.9.png.flat")).unwrap();
    let files = read_envelope(&data).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0.r#type, proto::FileType::Png as i32);
    assert_eq!(files[0].0.config.as_ref().unwrap().density, 240);

    let (_, width, height) = decode_rgba(&files[0].1).unwrap();
    assert_eq!((width, height), (10, 10));
    assert!(chunk_names(&files[0].1).contains(&"npTc".to_string()));
}

#[test]
fn oversized_reencoding_falls_back_to_filtered_original() {
    let scratch = scratch();
    // Incompressible grayscale noise: the RGBA re-encoding is ~4x the
    // original's bit depth and must lose the size comparison.
    let mut seed = 0x2545_F491u32;
    let gray: Vec<u8> = (0..64 * 64)
        .map(|_| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) as u8
        })
        .collect();
    let original = encode_png(&gray, 64, 64, png::ColorType::Grayscale);
    write_file(&scratch.res, "drawable/photo.png", &original);

    compile_dir(&scratch, &CompilerOptions::default()).unwrap();

    let data = fs::read(scratch.out.join("drawable_photo.png.flat")).unwrap();
    let files = read_envelope(&data).unwrap();
    // No ancillary chunks to shed, so the filtered original is the
    // original byte-for-byte
    assert_eq!(files[0].1, original);
}

#[test]
fn explicit_mode_aborts_before_writing_anything() {
    let scratch = scratch();
    write_file(
        &scratch.res,
        "values/strings.xml",
        br#"<resources><string name="hi">Hi</string></resources>"#
    );

    let mut archive = DirectoryArchiveWriter::create(&scratch.out).unwrap();
    let mut diag = RecordingDiagnostics::default();
    let inputs = vec![
        scratch.res.join("values/strings.xml"),
        PathBuf::from("malformed")
    ];
    let result = compile_files(
        &inputs,
        &mut archive,
        &CompilerOptions::default(),
        &mut diag
    );
    archive.finish().unwrap();

    assert!(matches!(result, Err(RescError::BadResourcePath(_))));
    assert_eq!(fs::read_dir(&scratch.out).unwrap().count(), 0);
}

#[test]
fn failed_input_does_not_stop_the_batch() {
    let scratch = scratch();
    write_file(&scratch.res, "bogus/file.bin", b"whatever");
    write_file(&scratch.res, "raw/blob.bin", b"payload bytes");

    let err = compile_dir(&scratch, &CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, RescError::CompilationFailed(1)));

    // The valid input still compiled, embedded verbatim
    let data = fs::read(scratch.out.join("raw_blob.bin.flat")).unwrap();
    let files = read_envelope(&data).unwrap();
    assert_eq!(files[0].1, b"payload bytes");
    assert_eq!(files[0].0.r#type, proto::FileType::Unknown as i32);
}

#[test]
fn malformed_values_document_reports_its_source() {
    let scratch = scratch();
    write_file(
        &scratch.res,
        "values/strings.xml",
        br#"<resources><string name="broken">Hi</resources>"#
    );

    let mut archive = DirectoryArchiveWriter::create(&scratch.out).unwrap();
    let mut diag = RecordingDiagnostics::default();
    let result = compile_res_dir(
        &scratch.res,
        &mut archive,
        &CompilerOptions::default(),
        &mut diag
    );
    archive.finish().unwrap();

    assert!(matches!(result, Err(RescError::CompilationFailed(1))));
    let errors: Vec<_> = diag
        .entries
        .iter()
        .filter(|(_, severity, _)| *severity == resc_common::Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].0.ends_with("strings.xml"));
}
