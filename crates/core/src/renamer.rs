use crate::exif_reader::read_capture_date;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CANONICAL_BASE_FORMAT: &str = "%Y-%m-%d %H-%M-%S";
const MAX_COUNTER: usize = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Modified,
    Metadata,
}

/// 操作単位で固定されるリネーム設定。走行中に書き換えない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub safe_mode: bool,
    pub dry_run: bool,
}

/// 1ファイル分のパス情報。操作ごとに作り直し、使い回さない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub directory: PathBuf,
    pub stem: String,
    /// 先頭のドットを含む。大文字小文字は元のまま保持する。
    pub extension: String,
}

impl FileRecord {
    pub fn new(path: &Path) -> Result<FileRecord> {
        let path = std::path::absolute(path)
            .with_context(|| format!("絶対パスへ解決できませんでした: {}", path.display()))?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("親ディレクトリを取得できませんでした: {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|v| v.to_string_lossy().to_string())
            .with_context(|| format!("ファイル名を取得できませんでした: {}", path.display()))?;
        let extension = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy()))
            .unwrap_or_default();

        Ok(FileRecord {
            path,
            directory,
            stem,
            extension,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyCorrect,
    Collision(PathBuf),
    NoMetadataDate,
    NotAnImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed {
        old_path: PathBuf,
        new_path: PathBuf,
    },
    PreviewOnly {
        old_path: PathBuf,
        candidate_path: PathBuf,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("同名の候補を使い切りました: {} の {base}_NNN{ext}", .dir.display())]
    ExhaustedCounter {
        dir: PathBuf,
        base: String,
        ext: String,
    },
    #[error("リネームに失敗しました: {} -> {}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// リネームに使う日時を決める。メタデータモードで撮影日時が無ければ None。
pub fn target_date_for(record: &FileRecord, source: DateSource) -> Result<Option<NaiveDateTime>> {
    match source {
        DateSource::Modified => Ok(Some(modified_date(&record.path)?)),
        DateSource::Metadata => Ok(read_capture_date(&record.path)),
    }
}

fn modified_date(path: &Path) -> Result<NaiveDateTime> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("更新日時を取得できませんでした: {}", path.display()))?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// 新しいファイル名を決め、必要なら実際に移動する。
/// 自分自身への付け替えは両モードとも衝突判定より先に弾く。
pub fn rename_by_date(
    record: &FileRecord,
    target_date: NaiveDateTime,
    options: &RenameOptions,
) -> Result<RenameOutcome, RenameError> {
    let base = target_date.format(CANONICAL_BASE_FORMAT).to_string();
    let candidate = record.directory.join(format!("{}{}", base, record.extension));

    if candidate == record.path {
        return Ok(RenameOutcome::Skipped(SkipReason::AlreadyCorrect));
    }

    let new_path = if options.safe_mode {
        resolve_free_path(record, &base)?
    } else {
        if candidate.exists() {
            return Ok(RenameOutcome::Skipped(SkipReason::Collision(candidate)));
        }
        candidate
    };

    if new_path == record.path {
        return Ok(RenameOutcome::Skipped(SkipReason::AlreadyCorrect));
    }

    if options.dry_run {
        return Ok(RenameOutcome::PreviewOnly {
            old_path: record.path.clone(),
            candidate_path: new_path,
        });
    }

    fs::rename(&record.path, &new_path).map_err(|source| RenameError::MoveFailed {
        from: record.path.clone(),
        to: new_path.clone(),
        source,
    })?;

    Ok(RenameOutcome::Renamed {
        old_path: record.path.clone(),
        new_path,
    })
}

fn resolve_free_path(record: &FileRecord, base: &str) -> Result<PathBuf, RenameError> {
    let plain = record.directory.join(format!("{}{}", base, record.extension));
    if is_available(&plain, &record.path) {
        return Ok(plain);
    }

    for n in 1..=MAX_COUNTER {
        let candidate = record
            .directory
            .join(format!("{}_{:03}{}", base, n, record.extension));
        if is_available(&candidate, &record.path) {
            return Ok(candidate);
        }
    }

    Err(RenameError::ExhaustedCounter {
        dir: record.directory.clone(),
        base: base.to_string(),
        ext: record.extension.clone(),
    })
}

fn is_available(candidate: &Path, original: &Path) -> bool {
    candidate == original || !candidate.exists()
}
