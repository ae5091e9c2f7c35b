use crate::output::Printer;
use anyhow::{Context, Result};
use photo_date_renamer_core::{save_config, Action, AppConfig};
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub dry_run: bool,
    pub safe_mode: bool,
    pub log: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    RenameByModified,
    Check,
    RenameByMetadata,
    OpenSettings,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    DryRun,
    SafeMode,
    Log,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChoice {
    Toggle(Toggle),
    SaveAsDefault,
    Back,
}

/// トグルは純粋な状態遷移として扱う。表示や入出力はここに混ぜない。
pub fn apply_toggle(settings: Settings, toggle: Toggle) -> Settings {
    match toggle {
        Toggle::DryRun => Settings {
            dry_run: !settings.dry_run,
            ..settings
        },
        Toggle::SafeMode => Settings {
            safe_mode: !settings.safe_mode,
            ..settings
        },
        Toggle::Log => Settings {
            log: !settings.log,
            ..settings
        },
        Toggle::Verbose => Settings {
            verbose: !settings.verbose,
            ..settings
        },
    }
}

pub fn parse_menu_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::RenameByModified),
        "2" => Some(MenuChoice::Check),
        "3" => Some(MenuChoice::RenameByMetadata),
        "4" => Some(MenuChoice::OpenSettings),
        "5" => Some(MenuChoice::Exit),
        _ => None,
    }
}

pub fn parse_settings_choice(input: &str) -> Option<SettingsChoice> {
    match input.trim() {
        "1" => Some(SettingsChoice::Toggle(Toggle::DryRun)),
        "2" => Some(SettingsChoice::Toggle(Toggle::SafeMode)),
        "3" => Some(SettingsChoice::Toggle(Toggle::Log)),
        "4" => Some(SettingsChoice::Toggle(Toggle::Verbose)),
        "5" => Some(SettingsChoice::SaveAsDefault),
        "6" => Some(SettingsChoice::Back),
        _ => None,
    }
}

pub fn run_menu(target: &Path, mut settings: Settings) -> Result<()> {
    loop {
        let printer = Printer::new(settings.verbose);
        print_main_menu(target, &settings);

        let Some(input) = read_line("選択 (1-5): ")? else {
            println!("終了します。");
            return Ok(());
        };
        let Some(choice) = parse_menu_choice(&input) else {
            printer.error("無効な選択です。1〜5を入力してください。");
            continue;
        };

        match choice {
            MenuChoice::RenameByModified => {
                println!("\n更新日時でリネームします...\n");
                report_failure(
                    &printer,
                    crate::run_action(target, Action::RenameByModified, settings),
                );
            }
            MenuChoice::Check => {
                println!("\n撮影日時との食い違いを確認します...\n");
                report_failure(&printer, crate::run_action(target, Action::Check, settings));
            }
            MenuChoice::RenameByMetadata => {
                println!("\n撮影日時でリネームします...\n");
                report_failure(
                    &printer,
                    crate::run_action(target, Action::RenameByMetadata, settings),
                );
            }
            MenuChoice::OpenSettings => settings = run_settings_menu(settings)?,
            MenuChoice::Exit => {
                println!("終了します。");
                return Ok(());
            }
        }
    }
}

fn run_settings_menu(mut settings: Settings) -> Result<Settings> {
    loop {
        let printer = Printer::new(settings.verbose);
        print_settings_menu(&settings);

        let Some(input) = read_line("選択 (1-6): ")? else {
            return Ok(settings);
        };
        let Some(choice) = parse_settings_choice(&input) else {
            printer.error("無効な選択です。1〜6を入力してください。");
            continue;
        };

        match choice {
            SettingsChoice::Toggle(toggle) => {
                settings = apply_toggle(settings, toggle);
                printer.success(&describe_toggle(&settings, toggle));
            }
            SettingsChoice::SaveAsDefault => {
                let config = AppConfig {
                    safe_mode: settings.safe_mode,
                    dry_run: settings.dry_run,
                    log: settings.log,
                    verbose: settings.verbose,
                };
                match save_config(&config) {
                    Ok(()) => printer.success("現在の設定を既定として保存しました。"),
                    Err(err) => printer.error(&format!("{:#}", err)),
                }
            }
            SettingsChoice::Back => return Ok(settings),
        }
    }
}

fn print_main_menu(target: &Path, settings: &Settings) {
    println!("\n=== 画像ファイルリネーマー ===");
    println!("対象: {}", target.display());
    println!("\n操作:");
    println!("  1. 更新日時でリネーム");
    println!("  2. 撮影日時とファイル名の食い違いを確認");
    println!("  3. 撮影日時でリネーム");
    println!("  4. 設定を変更");
    println!("  5. 終了");
    print_settings_state(settings);
}

fn print_settings_menu(settings: &Settings) {
    println!("\n=== 設定 ===");
    println!("  1. dry-run を切り替え (現在: {})", settings.dry_run);
    println!("  2. セーフモードを切り替え (現在: {})", settings.safe_mode);
    println!("  3. ログ記録を切り替え (現在: {})", settings.log);
    println!("  4. 詳細出力を切り替え (現在: {})", settings.verbose);
    println!("  5. 現在の設定を既定として保存");
    println!("  6. メインメニューへ戻る");
}

fn print_settings_state(settings: &Settings) {
    println!("\n現在の設定:");
    println!("  dry-run: {}", settings.dry_run);
    println!("  セーフモード (連番付与): {}", settings.safe_mode);
    println!("  ログ記録: {}", settings.log);
    println!("  詳細出力: {}", settings.verbose);
}

fn describe_toggle(settings: &Settings, toggle: Toggle) -> String {
    match toggle {
        Toggle::DryRun => format!("dry-run: {}", settings.dry_run),
        Toggle::SafeMode => format!("セーフモード: {}", settings.safe_mode),
        Toggle::Log => format!("ログ記録: {}", settings.log),
        Toggle::Verbose => format!("詳細出力: {}", settings.verbose),
    }
}

/// EOF (Ctrl-D) や入力の閉じは None として呼び出し側で終了扱いにする。
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("\n{}", prompt);
    io::stdout().flush().context("標準出力へ書き込めませんでした")?;

    let mut buf = String::new();
    let read = io::stdin()
        .read_line(&mut buf)
        .context("入力を読めませんでした")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}

fn report_failure(printer: &Printer, result: Result<()>) {
    if let Err(err) = result {
        printer.error(&format!("{:#}", err));
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_toggle, parse_menu_choice, parse_settings_choice, MenuChoice, Settings,
        SettingsChoice, Toggle,
    };

    #[test]
    fn toggle_flips_exactly_one_flag() {
        let settings = Settings::default();

        let toggled = apply_toggle(settings, Toggle::SafeMode);
        assert!(toggled.safe_mode);
        assert!(!toggled.dry_run);
        assert!(!toggled.log);
        assert!(!toggled.verbose);

        let back = apply_toggle(toggled, Toggle::SafeMode);
        assert_eq!(back, settings);
    }

    #[test]
    fn toggles_are_independent() {
        let mut settings = Settings::default();
        for toggle in [Toggle::DryRun, Toggle::SafeMode, Toggle::Log, Toggle::Verbose] {
            settings = apply_toggle(settings, toggle);
        }
        assert_eq!(
            settings,
            Settings {
                dry_run: true,
                safe_mode: true,
                log: true,
                verbose: true,
            }
        );
    }

    #[test]
    fn menu_choices_parse_with_surrounding_whitespace() {
        assert_eq!(parse_menu_choice(" 1 \n"), Some(MenuChoice::RenameByModified));
        assert_eq!(parse_menu_choice("5"), Some(MenuChoice::Exit));
        assert_eq!(parse_menu_choice("6"), None);
        assert_eq!(parse_menu_choice("abc"), None);
        assert_eq!(parse_menu_choice(""), None);
    }

    #[test]
    fn settings_choices_cover_all_entries() {
        assert_eq!(
            parse_settings_choice("1"),
            Some(SettingsChoice::Toggle(Toggle::DryRun))
        );
        assert_eq!(
            parse_settings_choice("4"),
            Some(SettingsChoice::Toggle(Toggle::Verbose))
        );
        assert_eq!(parse_settings_choice("5"), Some(SettingsChoice::SaveAsDefault));
        assert_eq!(parse_settings_choice("6"), Some(SettingsChoice::Back));
        assert_eq!(parse_settings_choice("7"), None);
    }
}
