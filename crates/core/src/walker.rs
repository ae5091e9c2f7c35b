use crate::exif_reader::{is_image_file, read_capture_date};
use crate::filename_date::parse_filename_date;
use crate::mismatch::{check_dates, MismatchResult, DEFAULT_TOLERANCE_SECS};
use crate::oplog::RenameLog;
use crate::renamer::{
    rename_by_date, target_date_for, DateSource, FileRecord, RenameOptions, RenameOutcome,
    SkipReason,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RenameByModified,
    RenameByMetadata,
    Check,
}

/// 1回の走行に対する不変の設定。途中で切り替えない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub safe_mode: bool,
    pub dry_run: bool,
    pub log_path: Option<PathBuf>,
    pub tolerance_secs: i64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            safe_mode: false,
            dry_run: false,
            log_path: None,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub files_processed: usize,
    pub images_checked: usize,
    pub mismatches_found: usize,
    pub renamed: usize,
    pub previewed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// ファイル単位の結果を受け取る口。表示はCLI側、テストは記録用スタブで実装する。
pub trait WalkObserver {
    fn on_outcome(&mut self, path: &Path, outcome: &RenameOutcome);
    fn on_check(&mut self, path: &Path, result: &MismatchResult);
    fn on_file_error(&mut self, path: &Path, error: &anyhow::Error);
}

/// 単一ファイルまたはディレクトリ配下の全ファイルへアクションを適用する。
/// ファイル単位の失敗は observer へ報告して走査を続ける。
pub fn process_path(
    path: &Path,
    action: Action,
    options: &RunOptions,
    observer: &mut dyn WalkObserver,
) -> Result<Summary> {
    let path = std::path::absolute(path)
        .with_context(|| format!("絶対パスへ解決できませんでした: {}", path.display()))?;
    if !path.exists() {
        anyhow::bail!("パスが見つかりません: {}", path.display());
    }

    let mut log = options.log_path.as_deref().map(RenameLog::new);
    let mut summary = Summary::default();

    if path.is_file() {
        process_file(&path, action, options, log.as_mut(), observer, &mut summary);
        return Ok(summary);
    }

    for entry in WalkDir::new(&path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let at = err.path().unwrap_or(&path).to_path_buf();
                observer.on_file_error(&at, &anyhow::Error::from(err));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        process_file(
            entry.path(),
            action,
            options,
            log.as_mut(),
            observer,
            &mut summary,
        );
    }

    Ok(summary)
}

fn process_file(
    path: &Path,
    action: Action,
    options: &RunOptions,
    log: Option<&mut RenameLog>,
    observer: &mut dyn WalkObserver,
    summary: &mut Summary,
) {
    if is_own_executable(path) {
        return;
    }

    match action {
        Action::Check => check_file(path, options, observer, summary),
        Action::RenameByModified => {
            rename_file(path, DateSource::Modified, options, log, observer, summary)
        }
        Action::RenameByMetadata => {
            rename_file(path, DateSource::Metadata, options, log, observer, summary)
        }
    }
}

fn check_file(
    path: &Path,
    options: &RunOptions,
    observer: &mut dyn WalkObserver,
    summary: &mut Summary,
) {
    if !is_image_file(path) {
        return;
    }

    let stem = path
        .file_stem()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default();
    let result = check_dates(
        parse_filename_date(&stem),
        read_capture_date(path),
        options.tolerance_secs,
    );

    summary.files_processed += 1;
    summary.images_checked += 1;
    if matches!(result, MismatchResult::Mismatch { .. }) {
        summary.mismatches_found += 1;
    }
    observer.on_check(path, &result);
}

fn rename_file(
    path: &Path,
    source: DateSource,
    options: &RunOptions,
    log: Option<&mut RenameLog>,
    observer: &mut dyn WalkObserver,
    summary: &mut Summary,
) {
    if source == DateSource::Metadata && !is_image_file(path) {
        summary.skipped += 1;
        observer.on_outcome(path, &RenameOutcome::Skipped(SkipReason::NotAnImage));
        return;
    }

    summary.files_processed += 1;

    let record = match FileRecord::new(path) {
        Ok(record) => record,
        Err(err) => {
            summary.failed += 1;
            observer.on_file_error(path, &err);
            return;
        }
    };

    let target_date = match target_date_for(&record, source) {
        Ok(Some(target_date)) => target_date,
        Ok(None) => {
            summary.skipped += 1;
            observer.on_outcome(path, &RenameOutcome::Skipped(SkipReason::NoMetadataDate));
            return;
        }
        Err(err) => {
            summary.failed += 1;
            observer.on_file_error(path, &err);
            return;
        }
    };

    let rename_options = RenameOptions {
        safe_mode: options.safe_mode,
        dry_run: options.dry_run,
    };
    match rename_by_date(&record, target_date, &rename_options) {
        Ok(outcome) => {
            match &outcome {
                RenameOutcome::Renamed { old_path, new_path } => {
                    summary.renamed += 1;
                    if let Some(log) = log {
                        if let Err(err) = log.append(old_path, new_path) {
                            observer.on_file_error(path, &err);
                        }
                    }
                }
                RenameOutcome::PreviewOnly { .. } => summary.previewed += 1,
                RenameOutcome::Skipped(_) => summary.skipped += 1,
            }
            observer.on_outcome(path, &outcome);
        }
        Err(err) => {
            summary.failed += 1;
            observer.on_file_error(path, &anyhow::Error::from(err));
        }
    }
}

fn is_own_executable(path: &Path) -> bool {
    let Ok(exe) = std::env::current_exe() else {
        return false;
    };
    let Ok(exe) = exe.canonicalize() else {
        return false;
    };
    path.canonicalize().map(|p| p == exe).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{process_path, Action, RunOptions, Summary, WalkObserver};
    use crate::mismatch::{MismatchResult, MissingSide};
    use crate::renamer::{RenameOutcome, SkipReason};
    use chrono::{DateTime, Local};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        outcomes: Vec<(PathBuf, RenameOutcome)>,
        checks: Vec<(PathBuf, MismatchResult)>,
        errors: Vec<(PathBuf, String)>,
    }

    impl WalkObserver for Recorder {
        fn on_outcome(&mut self, path: &Path, outcome: &RenameOutcome) {
            self.outcomes.push((path.to_path_buf(), outcome.clone()));
        }

        fn on_check(&mut self, path: &Path, result: &MismatchResult) {
            self.checks.push((path.to_path_buf(), *result));
        }

        fn on_file_error(&mut self, path: &Path, error: &anyhow::Error) {
            self.errors.push((path.to_path_buf(), format!("{:#}", error)));
        }
    }

    fn run(path: &Path, action: Action, options: &RunOptions) -> (Summary, Recorder) {
        let mut recorder = Recorder::default();
        let summary = process_path(path, action, options, &mut recorder).expect("walk succeeds");
        (summary, recorder)
    }

    fn expected_modified_name(path: &Path) -> String {
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .expect("mtime");
        DateTime::<Local>::from(modified)
            .naive_local()
            .format("%Y-%m-%d %H-%M-%S")
            .to_string()
    }

    #[test]
    fn missing_path_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let mut recorder = Recorder::default();
        let err = process_path(
            &temp.path().join("nope"),
            Action::Check,
            &RunOptions::default(),
            &mut recorder,
        )
        .expect_err("missing path should fail");
        assert!(err.to_string().contains("パスが見つかりません"));
    }

    #[test]
    fn metadata_mode_skips_non_images_and_files_without_capture_date() {
        let temp = tempdir().expect("tempdir");
        let nested = temp.path().join("nested");
        fs::create_dir_all(&nested).expect("nested dir");
        fs::write(temp.path().join("a.jpg"), b"no exif here").expect("write a");
        fs::write(nested.join("b.nef"), b"no exif here").expect("write b");
        fs::write(temp.path().join("notes.txt"), b"text").expect("write notes");

        let (summary, recorder) = run(temp.path(), Action::RenameByMetadata, &RunOptions::default());

        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.skipped, 3);
        assert!(recorder
            .outcomes
            .iter()
            .any(|(path, outcome)| path.ends_with("notes.txt")
                && *outcome == RenameOutcome::Skipped(SkipReason::NotAnImage)));
        assert_eq!(
            recorder
                .outcomes
                .iter()
                .filter(
                    |(_, outcome)| *outcome == RenameOutcome::Skipped(SkipReason::NoMetadataDate)
                )
                .count(),
            2
        );
        assert!(temp.path().join("a.jpg").exists());
        assert!(temp.path().join("notes.txt").exists());
    }

    #[test]
    fn modified_mode_renames_every_regular_file() {
        let temp = tempdir().expect("tempdir");
        let image = temp.path().join("IMG_0001.jpg");
        let text = temp.path().join("notes.txt");
        fs::write(&image, b"x").expect("write image");
        fs::write(&text, b"y").expect("write text");

        let expected_image = format!("{}.jpg", expected_modified_name(&image));
        let expected_text = format!("{}.txt", expected_modified_name(&text));

        let options = RunOptions {
            safe_mode: true,
            ..RunOptions::default()
        };
        let (summary, recorder) = run(temp.path(), Action::RenameByModified, &options);

        assert_eq!(summary.renamed, 2);
        assert_eq!(summary.failed, 0);
        assert!(recorder.errors.is_empty());
        assert!(temp.path().join(&expected_image).exists());
        assert!(temp.path().join(&expected_text).exists());
    }

    #[test]
    fn dry_run_directory_walk_mutates_nothing_and_logs_nothing() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.jpg"), b"x").expect("write image");
        fs::write(temp.path().join("notes.txt"), b"y").expect("write text");
        let log_path = temp.path().join("rename_log.json");

        let options = RunOptions {
            dry_run: true,
            log_path: Some(log_path.clone()),
            ..RunOptions::default()
        };
        let (summary, _) = run(temp.path(), Action::RenameByModified, &options);

        assert_eq!(summary.previewed, 2);
        assert_eq!(summary.renamed, 0);
        assert!(temp.path().join("IMG_0001.jpg").exists());
        assert!(temp.path().join("notes.txt").exists());
        assert!(!log_path.exists());
    }

    #[test]
    fn renames_are_appended_to_the_log() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("IMG_0001.jpg");
        fs::write(&source, b"x").expect("write image");
        let log_path = temp.path().join("rename_log.json");

        let options = RunOptions {
            log_path: Some(log_path.clone()),
            ..RunOptions::default()
        };
        let (summary, _) = run(&source, Action::RenameByModified, &options);

        assert_eq!(summary.renamed, 1);
        let entries = crate::oplog::RenameLog::new(&log_path).read_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].original.ends_with("IMG_0001.jpg"));
    }

    #[test]
    fn check_mode_counts_mismatches_and_ignores_non_images() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("2026-01-20 14-30-00.jpg"), b"no exif").expect("write image");
        fs::write(temp.path().join("notes.txt"), b"text").expect("write text");

        let (summary, recorder) = run(temp.path(), Action::Check, &RunOptions::default());

        assert_eq!(summary.images_checked, 1);
        assert_eq!(summary.mismatches_found, 0);
        assert_eq!(recorder.checks.len(), 1);
        assert_eq!(
            recorder.checks[0].1,
            MismatchResult::NotComparable(MissingSide::MetadataDate)
        );
        assert!(temp.path().join("2026-01-20 14-30-00.jpg").exists());
    }

    #[test]
    fn single_file_check_on_non_image_does_nothing() {
        let temp = tempdir().expect("tempdir");
        let text = temp.path().join("notes.txt");
        fs::write(&text, b"text").expect("write text");

        let (summary, recorder) = run(&text, Action::Check, &RunOptions::default());
        assert_eq!(summary, Summary::default());
        assert!(recorder.checks.is_empty());
    }

    #[test]
    fn strict_mode_collision_in_directory_walk_keeps_both_files() {
        let temp = tempdir().expect("tempdir");
        let first = temp.path().join("IMG_A.jpg");
        let second = temp.path().join("IMG_B.jpg");
        fs::write(&first, b"a").expect("write a");
        fs::write(&second, b"b").expect("write b");

        // 1つ目を正準名へ動かしておき、2つ目が同じ名前を要求する状況を作る
        let target = temp.path().join("2026-01-20 14-30-00.jpg");
        fs::rename(&first, &target).expect("stage collision");
        let record = crate::renamer::FileRecord::new(&second).expect("record");
        let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 20)
            .expect("valid date")
            .and_hms_opt(14, 30, 0)
            .expect("valid time");
        let outcome = crate::renamer::rename_by_date(
            &record,
            date,
            &crate::renamer::RenameOptions::default(),
        )
        .expect("decision succeeds");

        assert_eq!(
            outcome,
            RenameOutcome::Skipped(SkipReason::Collision(target.clone()))
        );
        assert!(second.exists());
        assert!(target.exists());
    }
}
