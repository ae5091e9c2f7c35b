mod config;
mod exif_reader;
mod filename_date;
mod mismatch;
mod oplog;
mod renamer;
mod walker;

pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use exif_reader::{is_image_file, read_capture_date};
pub use filename_date::parse_filename_date;
pub use mismatch::{check_dates, MismatchResult, MissingSide, DEFAULT_TOLERANCE_SECS};
pub use oplog::{LogEntry, RenameLog};
pub use renamer::{
    rename_by_date, target_date_for, DateSource, FileRecord, RenameError, RenameOptions,
    RenameOutcome, SkipReason,
};
pub use walker::{process_path, Action, RunOptions, Summary, WalkObserver};
