use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;

// 秒の後ろに続く連番など (" 14.30.00-3" の "-3") は無視する
static PREFIX_DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})[\s_](\d{2})[-.](\d{2})[-.](\d{2})").unwrap()
});
static COMPACT_DATE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})").unwrap());
static DATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

/// 拡張子を除いたファイル名から日時を取り出す。
/// 規則は上から順に試し、最初に暦として成立したものを採用する。
pub fn parse_filename_date(stem: &str) -> Option<NaiveDateTime> {
    if let Some(date_time) = capture_date_time(&PREFIX_DATE_TIME, stem) {
        return Some(date_time);
    }
    if let Some(date_time) = capture_date_time(&COMPACT_DATE_TIME, stem) {
        return Some(date_time);
    }
    if let Some(caps) = DATE_ONLY.captures(stem) {
        if let Some(date) = build_date(&caps) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn capture_date_time(rule: &Regex, stem: &str) -> Option<NaiveDateTime> {
    let caps = rule.captures(stem)?;
    let date = build_date(&caps)?;
    let hour = field(&caps, 4)?;
    let minute = field(&caps, 5)?;
    let second = field(&caps, 6)?;
    date.and_hms_opt(hour, minute, second)
}

fn build_date(caps: &Captures) -> Option<NaiveDate> {
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = field(caps, 2)?;
    let day = field(caps, 3)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn field(caps: &Captures, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}
