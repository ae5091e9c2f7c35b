use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub original: PathBuf,
    pub renamed: PathBuf,
    pub timestamp: DateTime<Local>,
}

/// 追記専用のリネーム履歴。既存ファイルが無い・壊れている場合は
/// 空の配列として扱い直す。
#[derive(Debug, Clone)]
pub struct RenameLog {
    path: PathBuf,
}

impl RenameLog {
    pub fn new(path: &Path) -> RenameLog {
        RenameLog {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, original: &Path, renamed: &Path) -> Result<()> {
        let mut entries = self.read_entries();
        entries.push(LogEntry {
            original: absolute_or_given(original),
            renamed: absolute_or_given(renamed),
            timestamp: Local::now(),
        });

        let body = serde_json::to_string_pretty(&entries)
            .context("リネームログのシリアライズに失敗しました")?;
        fs::write(&self.path, body).with_context(|| {
            format!(
                "リネームログを書き込めませんでした: {}",
                self.path.display()
            )
        })?;
        Ok(())
    }

    pub fn read_entries(&self) -> Vec<LogEntry> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

fn absolute_or_given(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
