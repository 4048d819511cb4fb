//! フィールドスキーマ定義
//!
//! フォームの全フィールドを宣言的に記述する:
//! - 種別（text / date / phone / longtext / 派生）
//! - 制約（必須・最小文字数・パターン）
//! - 派生フィールドの元フィールドと計算関数
//!
//! 未定義のフィールド名を参照するのはプログラミングエラーなので、
//! `constraints_for` などはpanicで即座に失敗する。

use crate::checklist::{CONNECTION_REMARK_FIELDS, TEST_RESULT_FIELDS};
use crate::derive::po_code_from_date;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;

/// フィールド名定数
pub mod names {
    pub const SERVICE_SUPPORT_MOBILE: &str = "serviceSupportMobile";
    pub const REPORT_DATE: &str = "reportDate";
    pub const STARTING_DATE: &str = "startingDate";
    pub const COMPLETION_DATE: &str = "completionDate";
    pub const CUSTOMER_NAME_ADDRESS: &str = "customerNameAddress";
    pub const SPOC_NAME: &str = "spocName";
    pub const SPOC_DESIGNATION: &str = "spocDesignation";
    pub const SPOC_CONTACT: &str = "spocContact";
    pub const PO_CODE: &str = "poCode";
    pub const WAN_IP_TYPE: &str = "wanIpType";
    pub const WAN_IP_REMARK: &str = "wanIpRemark";
    pub const LSSE_REMARK: &str = "lsseRemark";
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const CUSTOMER_SIGN_DATE: &str = "customerSignDate";
    pub const ENGINEER_NAME: &str = "engineerName";
    pub const ENGINEER_SIGN_DATE: &str = "engineerSignDate";

    /// 送信ペイロード上の署名画像キー
    pub const CUSTOMER_SIGNATURE: &str = "customerSignature";
    pub const ENGINEER_SIGNATURE: &str = "engineerSignature";
}

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_INVALID_DATE: &str = "Invalid date";

/// 受け付ける日付の形と書式（先頭が HTML date input の形式）
///
/// chrono の `%Y` は1桁の年も受け付けるので、年4桁・月日2桁を先に確かめる
const DATE_FORMATS: &[(&str, &str)] = &[
    (r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$", "%Y-%m-%d"),
    (r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$", "%d/%m/%Y"),
    (r"^[0-9]{2}-[0-9]{2}-[0-9]{4}$", "%d-%m-%Y"),
];

/// フィールド種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Phone,
    LongText,
    /// 計算で求める読み取り専用フィールド
    Derived,
}

/// 文字列パターン制約
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// ASCII数字ちょうど10桁（携帯・連絡先番号）
    TenDigits,
}

impl Pattern {
    pub fn matches(&self, value: &str) -> bool {
        lazy_static::lazy_static! {
            static ref TEN_DIGITS_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
        }

        match self {
            Pattern::TenDigits => TEN_DIGITS_RE.is_match(value),
        }
    }
}

/// フィールド制約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub required: bool,
    pub min_length: Option<usize>,
    pub pattern: Option<Pattern>,
    /// minLength / pattern 違反時のメッセージ
    pub message: &'static str,
}

impl Constraint {
    const fn none() -> Self {
        Self {
            required: false,
            min_length: None,
            pattern: None,
            message: MSG_REQUIRED,
        }
    }

    const fn required() -> Self {
        Self {
            required: true,
            min_length: None,
            pattern: None,
            message: MSG_REQUIRED,
        }
    }
}

/// 派生値の計算関数（元フィールドの値 → 派生値）
///
/// 計算できない入力には `None` を返す。
pub type DeriveFn = fn(&str) -> Option<String>;

/// 派生フィールドの計算規則
#[derive(Debug, Clone, Copy)]
pub struct DerivedFieldRule {
    pub target: &'static str,
    pub source: &'static str,
    pub derive: DeriveFn,
}

/// フィールド記述子
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub constraint: Constraint,
    pub derived_from: Option<&'static str>,
    pub derive: Option<DeriveFn>,
}

impl FieldDescriptor {
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            constraint: Constraint::required(),
            derived_from: None,
            derive: None,
        }
    }

    pub fn optional_text(name: &'static str, label: &'static str) -> Self {
        Self {
            constraint: Constraint::none(),
            ..Self::text(name, label)
        }
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Date,
            ..Self::text(name, label)
        }
    }

    pub fn phone(name: &'static str, label: &'static str, message: &'static str) -> Self {
        Self {
            kind: FieldKind::Phone,
            constraint: Constraint {
                pattern: Some(Pattern::TenDigits),
                message,
                ..Constraint::required()
            },
            ..Self::text(name, label)
        }
    }

    pub fn long_text(
        name: &'static str,
        label: &'static str,
        min_length: usize,
        message: &'static str,
    ) -> Self {
        Self {
            kind: FieldKind::LongText,
            constraint: Constraint {
                min_length: Some(min_length),
                message,
                ..Constraint::required()
            },
            ..Self::text(name, label)
        }
    }

    pub fn derived(
        name: &'static str,
        label: &'static str,
        source: &'static str,
        derive: DeriveFn,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Derived,
            constraint: Constraint::none(),
            derived_from: Some(source),
            derive: Some(derive),
        }
    }

    pub fn is_derived(&self) -> bool {
        self.kind == FieldKind::Derived
    }

    /// 派生規則（派生フィールドのみ）
    pub fn rule(&self) -> Option<DerivedFieldRule> {
        match (self.derived_from, self.derive) {
            (Some(source), Some(derive)) => Some(DerivedFieldRule {
                target: self.name,
                source,
                derive,
            }),
            _ => None,
        }
    }
}

/// フォーム全体のスキーマ
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<FieldDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl FieldSchema {
    /// 記述子一覧からスキーマを構築する
    ///
    /// 名前の重複、存在しない元フィールド、派生フィールドを元にする派生
    /// （循環の可能性）はエラー。
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let schema = Self::from_parts(fields);

        if schema.index.len() != schema.fields.len() {
            return Err(Error::Schema("duplicate field name".into()));
        }

        for field in &schema.fields {
            match (field.kind, field.derived_from, field.derive) {
                (FieldKind::Derived, Some(source), Some(_)) => {
                    let source_field = schema.descriptor(source).ok_or_else(|| {
                        Error::Schema(format!("{} is derived from unknown field {}", field.name, source))
                    })?;
                    if source_field.is_derived() {
                        return Err(Error::Schema(format!(
                            "{} is derived from derived field {}",
                            field.name, source
                        )));
                    }
                }
                (FieldKind::Derived, _, _) => {
                    return Err(Error::Schema(format!("{} has no derivation rule", field.name)));
                }
                (_, None, None) => {}
                _ => {
                    return Err(Error::Schema(format!(
                        "{} has a derivation rule but is not a derived field",
                        field.name
                    )));
                }
            }
        }

        Ok(schema)
    }

    fn from_parts(fields: Vec<FieldDescriptor>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name, i))
            .collect();
        Self { fields, index }
    }

    /// 宣言順のフィールド一覧
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// # Panics
    /// `name` がスキーマに存在しない場合
    pub fn constraints_for(&self, name: &str) -> &Constraint {
        &self.expect_descriptor(name).constraint
    }

    /// # Panics
    /// `name` がスキーマに存在しない場合
    pub fn is_derived(&self, name: &str) -> bool {
        self.expect_descriptor(name).is_derived()
    }

    /// # Panics
    /// `name` がスキーマに存在しない場合
    pub fn derivation_rule_for(&self, name: &str) -> Option<DerivedFieldRule> {
        self.expect_descriptor(name).rule()
    }

    /// `source` を元にする派生規則
    pub fn dependents_of<'a>(&'a self, source: &'a str) -> impl Iterator<Item = DerivedFieldRule> + 'a {
        self.fields
            .iter()
            .filter_map(FieldDescriptor::rule)
            .filter(move |rule| rule.source == source)
    }

    fn expect_descriptor(&self, name: &str) -> &FieldDescriptor {
        match self.descriptor(name) {
            Some(descriptor) => descriptor,
            None => panic!("field `{}` is not declared in the schema", name),
        }
    }
}

/// 日付文字列を解釈する
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    lazy_static::lazy_static! {
        static ref DATE_SHAPES: Vec<(Regex, &'static str)> = DATE_FORMATS
            .iter()
            .map(|&(shape, format)| (Regex::new(shape).unwrap(), format))
            .collect();
    }

    let value = value.trim();
    DATE_SHAPES
        .iter()
        .filter(|(shape, _)| shape.is_match(value))
        .find_map(|(_, format)| NaiveDate::parse_from_str(value, format).ok())
}

/// 報告書フォームのフィールド記述子（宣言順 = 表示順）
pub fn report_fields() -> Vec<FieldDescriptor> {
    use names::*;

    let mut fields = vec![
        FieldDescriptor::phone(SERVICE_SUPPORT_MOBILE, "Service Support Mobile No", "Invalid mobile number"),
        FieldDescriptor::date(REPORT_DATE, "Date"),
        FieldDescriptor::date(STARTING_DATE, "Starting Date"),
        FieldDescriptor::date(COMPLETION_DATE, "Completion Date"),
        FieldDescriptor::long_text(CUSTOMER_NAME_ADDRESS, "Customer Name & Address", 10, "Address too short"),
        FieldDescriptor::text(SPOC_NAME, "SPOC Name"),
        FieldDescriptor::text(SPOC_DESIGNATION, "Designation"),
        FieldDescriptor::phone(SPOC_CONTACT, "Contact No", "Invalid contact number"),
        FieldDescriptor::derived(PO_CODE, "PO Code", REPORT_DATE, po_code_from_date),
        FieldDescriptor::optional_text(WAN_IP_TYPE, "WAN IP"),
        FieldDescriptor::optional_text(WAN_IP_REMARK, "WAN IP Remark"),
    ];

    fields.extend(
        CONNECTION_REMARK_FIELDS
            .iter()
            .map(|&name| FieldDescriptor::optional_text(name, "Connection Remark")),
    );
    fields.extend(
        TEST_RESULT_FIELDS
            .iter()
            .map(|&name| FieldDescriptor::optional_text(name, "Test Result")),
    );

    fields.extend([
        FieldDescriptor::long_text(
            LSSE_REMARK,
            "Detailed Observations and Actions Taken",
            50,
            "Minimum 50 characters required",
        ),
        FieldDescriptor::text(CUSTOMER_NAME, "Customer Name"),
        FieldDescriptor::date(CUSTOMER_SIGN_DATE, "Customer Sign Date"),
        FieldDescriptor::text(ENGINEER_NAME, "Engineer Name"),
        FieldDescriptor::date(ENGINEER_SIGN_DATE, "Engineer Sign Date"),
    ]);

    fields
}

/// 報告書フォームのスキーマ（プロセス共通）
pub fn report_schema() -> &'static FieldSchema {
    lazy_static::lazy_static! {
        static ref REPORT_SCHEMA: FieldSchema = FieldSchema::from_parts(report_fields());
    }
    &REPORT_SCHEMA
}
