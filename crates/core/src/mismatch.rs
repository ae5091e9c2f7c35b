use chrono::NaiveDateTime;

pub const DEFAULT_TOLERANCE_SECS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSide {
    MetadataDate,
    FilenameDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchResult {
    Match {
        filename_date: NaiveDateTime,
        metadata_date: NaiveDateTime,
    },
    Mismatch {
        filename_date: NaiveDateTime,
        metadata_date: NaiveDateTime,
    },
    NotComparable(MissingSide),
}

/// 両方の日時が揃っているときだけ比較する。境界値は許容側に倒す (差がちょうど
/// tolerance 秒なら一致扱い)。
pub fn check_dates(
    filename_date: Option<NaiveDateTime>,
    metadata_date: Option<NaiveDateTime>,
    tolerance_secs: i64,
) -> MismatchResult {
    let Some(metadata_date) = metadata_date else {
        return MismatchResult::NotComparable(MissingSide::MetadataDate);
    };
    let Some(filename_date) = filename_date else {
        return MismatchResult::NotComparable(MissingSide::FilenameDate);
    };

    let diff_secs = (filename_date - metadata_date).num_seconds().abs();
    if diff_secs > tolerance_secs {
        MismatchResult::Mismatch {
            filename_date,
            metadata_date,
        }
    } else {
        MismatchResult::Match {
            filename_date,
            metadata_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{check_dates, MismatchResult, MissingSide, DEFAULT_TOLERANCE_SECS};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 20)
            .expect("valid date")
            .and_hms_opt(14, 30, 0)
            .expect("valid time")
    }

    #[test]
    fn difference_at_tolerance_boundary_is_a_match() {
        let result = check_dates(
            Some(base()),
            Some(base() + Duration::seconds(2)),
            DEFAULT_TOLERANCE_SECS,
        );
        assert!(matches!(result, MismatchResult::Match { .. }));
    }

    #[test]
    fn difference_past_tolerance_is_a_mismatch() {
        let result = check_dates(
            Some(base()),
            Some(base() - Duration::seconds(3)),
            DEFAULT_TOLERANCE_SECS,
        );
        assert!(matches!(result, MismatchResult::Mismatch { .. }));
    }

    #[test]
    fn missing_sides_are_not_comparable() {
        assert_eq!(
            check_dates(Some(base()), None, DEFAULT_TOLERANCE_SECS),
            MismatchResult::NotComparable(MissingSide::MetadataDate)
        );
        assert_eq!(
            check_dates(None, Some(base()), DEFAULT_TOLERANCE_SECS),
            MismatchResult::NotComparable(MissingSide::FilenameDate)
        );
        // 両方欠けている場合はメタデータ側を先に報告する
        assert_eq!(
            check_dates(None, None, DEFAULT_TOLERANCE_SECS),
            MismatchResult::NotComparable(MissingSide::MetadataDate)
        );
    }

    #[test]
    fn identical_dates_match() {
        let result = check_dates(Some(base()), Some(base()), DEFAULT_TOLERANCE_SECS);
        assert!(matches!(result, MismatchResult::Match { .. }));
    }
}
