//! 入力検証
//!
//! スキーマの派生でない全フィールドを検証し、違反を全件集める（最初の違反で
//! 打ち切らない）。1件でも違反があれば Invalid、なければ TypedRecord を作る。
//! 部分的に有効な結果は存在しない。

use crate::checklist::{build_rows, ChecklistKind};
use crate::derive::po_code;
use crate::schema::{names, parse_date, FieldDescriptor, FieldKind, FieldSchema, MSG_INVALID_DATE, MSG_REQUIRED};
use crate::types::{BasicInfo, FieldErrors, RawInput, SignOff, TechnicalParameters, TypedRecord};
use chrono::NaiveDate;

/// 検証結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(TypedRecord),
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Invalid(errors) => Some(errors),
            ValidationResult::Valid(_) => None,
        }
    }

    pub fn into_result(self) -> Result<TypedRecord, FieldErrors> {
        match self {
            ValidationResult::Valid(record) => Ok(record),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

/// 1フィールドの値を制約に照らして検証する
///
/// 判定順: 必須 → 最小文字数 → パターン → 日付。値は前後の空白を除いて判定。
pub fn check_field(descriptor: &FieldDescriptor, raw: &str) -> Result<(), &'static str> {
    if descriptor.is_derived() {
        return Ok(());
    }

    let constraint = &descriptor.constraint;
    let value = raw.trim();

    if value.is_empty() {
        return if constraint.required { Err(MSG_REQUIRED) } else { Ok(()) };
    }

    if let Some(min) = constraint.min_length {
        if value.chars().count() < min {
            return Err(constraint.message);
        }
    }

    if let Some(pattern) = constraint.pattern {
        if !pattern.matches(value) {
            return Err(constraint.message);
        }
    }

    if descriptor.kind == FieldKind::Date && parse_date(value).is_none() {
        return Err(MSG_INVALID_DATE);
    }

    Ok(())
}

/// スキーマの全フィールドについて違反を集める
pub fn collect_errors(input: &RawInput, schema: &FieldSchema) -> FieldErrors {
    schema
        .fields()
        .iter()
        .filter_map(|descriptor| {
            check_field(descriptor, input.get(descriptor.name))
                .err()
                .map(|message| (descriptor.name.to_string(), message.to_string()))
        })
        .collect()
}

/// 報告書フォームの入力を検証する
///
/// `schema` は報告書のフィールドを全て宣言している必要がある。
pub fn validate(input: &RawInput, schema: &FieldSchema) -> ValidationResult {
    let errors = collect_errors(input, schema);
    if !errors.is_empty() {
        tracing::debug!(error_count = errors.len(), "validation failed");
        return ValidationResult::Invalid(errors);
    }

    match build_record(input) {
        Some(record) => ValidationResult::Valid(record),
        // 報告書の日付フィールドを宣言していないスキーマ
        None => ValidationResult::Invalid(
            [names::REPORT_DATE, names::STARTING_DATE, names::COMPLETION_DATE, names::CUSTOMER_SIGN_DATE, names::ENGINEER_SIGN_DATE]
                .into_iter()
                .filter(|name| parse_date(input.get(name)).is_none())
                .map(|name| (name.to_string(), MSG_INVALID_DATE.to_string()))
                .collect(),
        ),
    }
}

fn build_record(input: &RawInput) -> Option<TypedRecord> {
    let text = |name: &str| input.get(name).trim().to_string();
    let date = |name: &str| -> Option<NaiveDate> { parse_date(input.get(name)) };

    let report_date = date(names::REPORT_DATE)?;

    Some(TypedRecord {
        basic: BasicInfo {
            service_support_mobile: text(names::SERVICE_SUPPORT_MOBILE),
            report_date,
            starting_date: date(names::STARTING_DATE)?,
            completion_date: date(names::COMPLETION_DATE)?,
            customer_name_address: text(names::CUSTOMER_NAME_ADDRESS),
            spoc_name: text(names::SPOC_NAME),
            spoc_designation: text(names::SPOC_DESIGNATION),
            spoc_contact: text(names::SPOC_CONTACT),
            // 派生値は入力値を信用せず、検証済みの日付から求め直す
            po_code: po_code(report_date),
        },
        technical: TechnicalParameters {
            wan_ip_type: text(names::WAN_IP_TYPE),
            wan_ip_remark: text(names::WAN_IP_REMARK),
        },
        connections: build_rows(ChecklistKind::Connections, input),
        tests: build_rows(ChecklistKind::Tests, input),
        lsse_remark: text(names::LSSE_REMARK),
        customer: SignOff {
            name: text(names::CUSTOMER_NAME),
            date: date(names::CUSTOMER_SIGN_DATE)?,
        },
        engineer: SignOff {
            name: text(names::ENGINEER_NAME),
            date: date(names::ENGINEER_SIGN_DATE)?,
        },
    })
}
