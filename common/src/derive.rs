//! 派生フィールドの再計算
//!
//! 元フィールドが変更されたときに、そのフィールドを元にする派生フィールドを
//! 計算し直す。入力（RawInput）を受け取り、更新後の入力を返す純粋な変換。
//!
//! 計算できない値（日付として解釈できない等）の場合、派生フィールドは
//! 以前の値のまま残す（クリアしない）。

use crate::schema::{parse_date, FieldSchema};
use crate::types::RawInput;
use chrono::{Datelike, NaiveDate};

/// PO番号の接頭辞
pub const PO_PREFIX: &str = "PO";
/// PO番号の接尾辞（担当者イニシャル + 連番。連番は固定値）
pub const PO_SUFFIX: &str = "SE01";

/// 日付からPO番号を生成: 2025-05-16 → "PO160525SE01"
pub fn po_code(date: NaiveDate) -> String {
    format!(
        "{}{:02}{:02}{:02}{}",
        PO_PREFIX,
        date.day(),
        date.month(),
        date.year().rem_euclid(100),
        PO_SUFFIX
    )
}

/// 日付文字列からPO番号を生成（解釈できなければ `None`）
pub fn po_code_from_date(value: &str) -> Option<String> {
    parse_date(value).map(po_code)
}

/// `changed` フィールドの変更に伴う派生フィールドを再計算する
pub fn apply_derivations(schema: &FieldSchema, mut input: RawInput, changed: &str) -> RawInput {
    for rule in schema.dependents_of(changed) {
        let source_value = input.get(rule.source);
        match (rule.derive)(source_value) {
            Some(value) => {
                tracing::debug!(target_field = rule.target, %value, "derived field updated");
                input.set(rule.target, value);
            }
            None => {
                tracing::debug!(
                    target_field = rule.target,
                    source = rule.source,
                    "source value not derivable, keeping previous value"
                );
            }
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{names, report_schema};

    fn input_with_date(date: &str) -> RawInput {
        let mut input = RawInput::new();
        input.set(names::REPORT_DATE, date);
        input
    }

    #[test]
    fn test_po_code_format() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 16).unwrap();
        assert_eq!(po_code(date), "PO160525SE01");

        let date = NaiveDate::from_ymd_opt(2009, 1, 2).unwrap();
        assert_eq!(po_code(date), "PO020109SE01");

        let date = NaiveDate::from_ymd_opt(2100, 12, 31).unwrap();
        assert_eq!(po_code(date), "PO311200SE01");
    }

    #[test]
    fn test_report_date_change_derives_po_code() {
        let input = apply_derivations(report_schema(), input_with_date("2025-05-16"), names::REPORT_DATE);
        assert_eq!(input.get(names::PO_CODE), "PO160525SE01");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let schema = report_schema();
        let once = apply_derivations(schema, input_with_date("2025-05-16"), names::REPORT_DATE);
        let twice = apply_derivations(schema, once.clone(), names::REPORT_DATE);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_date_keeps_previous_code() {
        let schema = report_schema();
        let input = apply_derivations(schema, input_with_date("2025-05-16"), names::REPORT_DATE);

        let mut edited = input.clone();
        edited.set(names::REPORT_DATE, "2025-13-40");
        let edited = apply_derivations(schema, edited, names::REPORT_DATE);
        assert_eq!(edited.get(names::PO_CODE), "PO160525SE01");

        let cleared = apply_derivations(schema, input_with_date(""), names::REPORT_DATE);
        assert_eq!(cleared.get(names::PO_CODE), "");
    }

    #[test]
    fn test_unrelated_field_change_does_not_derive() {
        let input = apply_derivations(report_schema(), input_with_date("2025-05-16"), names::STARTING_DATE);
        assert_eq!(input.get(names::PO_CODE), "");
    }
}
