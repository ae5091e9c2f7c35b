mod menu;
mod output;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use menu::Settings;
use output::{ConsoleObserver, Printer};
use photo_date_renamer_core::{
    load_config, process_path, Action, RunOptions, DEFAULT_TOLERANCE_SECS,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "photo-date-renamer")]
#[command(about = "画像ファイル名を更新日時または撮影日時で一括リネームします")]
#[command(group = ArgGroup::new("action").args(["modified", "check", "rename_meta", "interactive"]))]
struct Cli {
    /// 更新日時でリネーム
    #[arg(short = 'm', long)]
    modified: bool,
    /// 撮影日時とファイル名の食い違いを確認
    #[arg(short = 'c', long)]
    check: bool,
    /// メタデータの撮影日時でリネーム
    #[arg(short = 'r', long = "rename-meta")]
    rename_meta: bool,
    /// 対話メニューを起動 (アクション未指定時の既定)
    #[arg(short = 'i', long)]
    interactive: bool,
    /// リネームせずに結果だけ表示
    #[arg(short = 'd', long = "dry-run")]
    dry_run: bool,
    /// 名前衝突時に連番 (_001) を付与
    #[arg(short = 's', long)]
    safe: bool,
    /// rename_log.json へ操作を記録
    #[arg(short = 'l', long)]
    log: bool,
    /// 詳細出力
    #[arg(short = 'v', long)]
    verbose: bool,
    /// 保存済み既定を打ち消して dry-run を無効化
    #[arg(long = "no-dry-run", conflicts_with = "dry_run")]
    no_dry_run: bool,
    /// 保存済み既定を打ち消してセーフモードを無効化
    #[arg(long = "no-safe", conflicts_with = "safe")]
    no_safe: bool,
    /// 保存済み既定を打ち消してログ記録を無効化
    #[arg(long = "no-log", conflicts_with = "log")]
    no_log: bool,
    /// 保存済み既定を打ち消して詳細出力を無効化
    #[arg(long = "no-verbose", conflicts_with = "verbose")]
    no_verbose: bool,
    /// 対象のファイルまたはフォルダ
    path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config()?;

    let settings = Settings {
        dry_run: resolve_toggle(cli.dry_run, cli.no_dry_run, config.dry_run),
        safe_mode: resolve_toggle(cli.safe, cli.no_safe, config.safe_mode),
        log: resolve_toggle(cli.log, cli.no_log, config.log),
        verbose: resolve_toggle(cli.verbose, cli.no_verbose, config.verbose),
    };

    if cli.modified {
        run_action(&cli.path, Action::RenameByModified, settings)
    } else if cli.check {
        run_action(&cli.path, Action::Check, settings)
    } else if cli.rename_meta {
        run_action(&cli.path, Action::RenameByMetadata, settings)
    } else {
        menu::run_menu(&cli.path, settings)
    }
}

pub(crate) fn run_action(target: &Path, action: Action, settings: Settings) -> Result<()> {
    let printer = Printer::new(settings.verbose);
    let options = RunOptions {
        safe_mode: settings.safe_mode,
        dry_run: settings.dry_run,
        log_path: settings.log.then(|| default_log_path(target)),
        tolerance_secs: DEFAULT_TOLERANCE_SECS,
    };

    let mut observer = ConsoleObserver::new(&printer, action);
    // パス不在などの走行前失敗は報告のみ。非0終了は使用法エラーに限る。
    let summary = match process_path(target, action, &options, &mut observer) {
        Ok(summary) => summary,
        Err(err) => {
            printer.error(&format!("{:#}", err));
            return Ok(());
        }
    };

    if action == Action::Check {
        printer.print_check_summary(&summary);
    } else if settings.dry_run {
        printer.plain(&format!(
            "\ndry-run: {}件のリネーム候補を表示しました。実ファイルは変更していません。",
            summary.previewed
        ));
    }

    Ok(())
}

/// 明示フラグ > 明示的な打ち消し > 保存済み既定 の順で解決する。
fn resolve_toggle(on: bool, off: bool, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        default
    }
}

fn default_log_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join("rename_log.json")
    } else {
        target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .join("rename_log.json")
    }
}
