use ansi_term::Colour::{Cyan, Green, Purple, Red, Yellow};
use ansi_term::Style;
use photo_date_renamer_core::{
    Action, MismatchResult, MissingSide, RenameOutcome, SkipReason, Summary, WalkObserver,
};
use std::path::Path;

pub struct Printer {
    colored: bool,
    verbose: bool,
}

impl Printer {
    pub fn new(verbose: bool) -> Printer {
        Printer {
            colored: std::env::var_os("NO_COLOR").is_none(),
            verbose,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn plain(&self, message: &str) {
        println!("{}", message);
    }

    pub fn verbose(&self, message: &str) {
        if self.verbose {
            println!("{} {}", self.paint(Cyan.normal(), "[VERBOSE]"), message);
        }
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.paint(Green.normal(), message));
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", self.paint(Yellow.normal(), "[WARNING]"), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.paint(Red.normal(), "[ERROR]"), message);
    }

    pub fn dry_run(&self, message: &str) {
        println!("{} {}", self.paint(Cyan.normal(), "[DRY-RUN]"), message);
    }

    pub fn mismatch(&self, message: &str) {
        println!("{} {}", self.paint(Purple.bold(), "[MISMATCH]"), message);
    }

    pub fn matched(&self, message: &str) {
        println!("{} {}", self.paint(Green.normal(), "[MATCH]"), message);
    }

    pub fn print_check_summary(&self, summary: &Summary) {
        self.plain(&format!(
            "\n集計: checked={} mismatch={}",
            summary.images_checked, summary.mismatches_found
        ));
    }
}

pub struct ConsoleObserver<'a> {
    printer: &'a Printer,
    action: Action,
}

impl<'a> ConsoleObserver<'a> {
    pub fn new(printer: &'a Printer, action: Action) -> ConsoleObserver<'a> {
        ConsoleObserver { printer, action }
    }

    fn source_label(&self) -> &'static str {
        match self.action {
            Action::RenameByModified => "更新日時",
            Action::RenameByMetadata => "撮影日時",
            Action::Check => "",
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl WalkObserver for ConsoleObserver<'_> {
    fn on_outcome(&mut self, path: &Path, outcome: &RenameOutcome) {
        let name = display_name(path);
        match outcome {
            RenameOutcome::Renamed { new_path, .. } => self.printer.success(&format!(
                "リネーム: {} -> {} ({})",
                name,
                display_name(new_path),
                self.source_label()
            )),
            RenameOutcome::PreviewOnly { candidate_path, .. } => self.printer.dry_run(&format!(
                "リネーム予定: {} -> {} ({})",
                name,
                display_name(candidate_path),
                self.source_label()
            )),
            RenameOutcome::Skipped(reason) => match reason {
                SkipReason::AlreadyCorrect => self
                    .printer
                    .verbose(&format!("既に正しい名前です: {}", name)),
                SkipReason::Collision(existing) => self.printer.warning(&format!(
                    "衝突: {} は既に存在します。{} をスキップします",
                    existing.display(),
                    name
                )),
                SkipReason::NoMetadataDate => self
                    .printer
                    .warning(&format!("撮影日時が見つかりません: {}", name)),
                SkipReason::NotAnImage => self
                    .printer
                    .verbose(&format!("画像以外のためスキップ: {}", name)),
            },
        }
    }

    fn on_check(&mut self, path: &Path, result: &MismatchResult) {
        let name = display_name(path);
        match result {
            MismatchResult::Mismatch {
                filename_date,
                metadata_date,
            } => {
                self.printer.mismatch(&name);
                self.printer.plain(&format!(
                    "    ファイル名の日時: {}",
                    filename_date.format("%Y-%m-%d %H:%M:%S")
                ));
                self.printer.plain(&format!(
                    "    撮影日時:         {}",
                    metadata_date.format("%Y-%m-%d %H:%M:%S")
                ));
            }
            MismatchResult::Match { .. } => {
                if self.printer.is_verbose() {
                    self.printer.matched(&format!("{} (日時一致)", name));
                }
            }
            MismatchResult::NotComparable(MissingSide::MetadataDate) => self
                .printer
                .warning(&format!("{}: メタデータに撮影日時がありません", name)),
            MismatchResult::NotComparable(MissingSide::FilenameDate) => self
                .printer
                .verbose(&format!("{}: ファイル名から日時を解釈できません", name)),
        }
    }

    fn on_file_error(&mut self, _path: &Path, error: &anyhow::Error) {
        self.printer.error(&format!("{:#}", error));
    }
}
