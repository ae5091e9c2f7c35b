use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use exif::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tiff", "tif", "cr2", "cr3", "nef", "arw", "dng", "orf", "rw2", "pef",
    "srw", "raf",
];

// 先頭のタグから順に試し、最初に取れた値を使う
const DATE_TAG_PRIORITY: &[&str] = &["DateTimeOriginal", "DateTimeDigitized", "DateTime"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// 撮影日時をメタデータから取り出す。読めない・壊れている・未対応は全て None。
pub fn read_capture_date(path: &Path) -> Option<NaiveDateTime> {
    try_read_capture_date(path).ok().flatten()
}

fn try_read_capture_date(path: &Path) -> Result<Option<NaiveDateTime>> {
    let file = File::open(path)
        .with_context(|| format!("EXIF読み込み対象を開けませんでした: {}", path.display()))?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf)
        .with_context(|| format!("EXIFを解析できませんでした: {}", path.display()))?;

    Ok(find_field_value(&exif, DATE_TAG_PRIORITY).and_then(|raw| parse_exif_date(&raw)))
}

fn find_field_value(exif: &exif::Exif, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        exif.fields().find_map(|field| {
            let tag_name = format!("{:?}", field.tag);
            if name.eq_ignore_ascii_case(&tag_name) {
                Some(field.display_value().with_unit(exif).to_string())
            } else {
                None
            }
        })
    })
}

fn parse_exif_date(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.trim();

    let naive_formats = [
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in naive_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(normalized, fmt) {
            return Some(naive);
        }
    }

    let zoned_formats = ["%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];
    for fmt in zoned_formats {
        if let Ok(date_time) = DateTime::parse_from_str(normalized, fmt) {
            return Some(date_time.with_timezone(&Local).naive_local());
        }
    }

    None
}
