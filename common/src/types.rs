//! 報告書データの型定義
//!
//! - RawInput: 未検証の入力値（フィールド名 → 文字列）
//! - TypedRecord: 検証済みの型付きレコード（検証成功時のみ生成）
//! - SignatureImage: 署名のラスタ画像（PNG）
//! - ReportRecord: 出力用の完成レコード（TypedRecord + 署名2つ）

use crate::checklist::{ChecklistRow, CONNECTION_REMARK_FIELDS, TEST_RESULT_FIELDS};
use crate::error::{Error, Result, Signatory};
use crate::schema::names;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// フィールド名 → エラーメッセージ（1フィールド1件）
pub type FieldErrors = BTreeMap<String, String>;

/// 送信用ペイロード（フィールド名 → 値）
pub type Payload = BTreeMap<String, String>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// 未検証の入力値
///
/// 存在しないフィールドは空文字列として扱う。JSONの `null` も空文字列になる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawInput(BTreeMap<String, String>);

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map: BTreeMap<String, Option<String>> = BTreeMap::deserialize(deserializer)?;
        Ok(Self(
            map.into_iter()
                .map(|(k, v)| (k, v.unwrap_or_default()))
                .collect(),
        ))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// 基本情報
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct BasicInfo {
    pub service_support_mobile: String,
    pub report_date: NaiveDate,
    pub starting_date: NaiveDate,
    pub completion_date: NaiveDate,
    pub customer_name_address: String,
    pub spoc_name: String,
    pub spoc_designation: String,
    pub spoc_contact: String,
    /// reportDate から派生
    pub po_code: String,
}

/// 技術パラメータ（任意入力）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TechnicalParameters {
    pub wan_ip_type: String,
    pub wan_ip_remark: String,
}

/// 署名欄の氏名・日付
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SignOff {
    pub name: String,
    pub date: NaiveDate,
}

/// 検証済みレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRecord {
    pub(crate) basic: BasicInfo,
    pub(crate) technical: TechnicalParameters,
    pub(crate) connections: Vec<ChecklistRow>,
    pub(crate) tests: Vec<ChecklistRow>,
    pub(crate) lsse_remark: String,
    pub(crate) customer: SignOff,
    pub(crate) engineer: SignOff,
}

impl TypedRecord {
    pub fn basic(&self) -> &BasicInfo {
        &self.basic
    }

    pub fn technical(&self) -> &TechnicalParameters {
        &self.technical
    }

    pub fn connections(&self) -> &[ChecklistRow] {
        &self.connections
    }

    pub fn tests(&self) -> &[ChecklistRow] {
        &self.tests
    }

    pub fn lsse_remark(&self) -> &str {
        &self.lsse_remark
    }

    pub fn sign_off(&self, signatory: Signatory) -> &SignOff {
        match signatory {
            Signatory::Customer => &self.customer,
            Signatory::Engineer => &self.engineer,
        }
    }

    /// フィールド名 → 値（日付は YYYY-MM-DD）
    pub fn to_fields(&self) -> Payload {
        let basic = &self.basic;
        let mut fields = Payload::new();
        let mut put = |name: &str, value: String| {
            fields.insert(name.to_string(), value);
        };

        put(names::SERVICE_SUPPORT_MOBILE, basic.service_support_mobile.clone());
        put(names::REPORT_DATE, format_date(basic.report_date));
        put(names::STARTING_DATE, format_date(basic.starting_date));
        put(names::COMPLETION_DATE, format_date(basic.completion_date));
        put(names::CUSTOMER_NAME_ADDRESS, basic.customer_name_address.clone());
        put(names::SPOC_NAME, basic.spoc_name.clone());
        put(names::SPOC_DESIGNATION, basic.spoc_designation.clone());
        put(names::SPOC_CONTACT, basic.spoc_contact.clone());
        put(names::PO_CODE, basic.po_code.clone());
        put(names::WAN_IP_TYPE, self.technical.wan_ip_type.clone());
        put(names::WAN_IP_REMARK, self.technical.wan_ip_remark.clone());
        for (&field, row) in CONNECTION_REMARK_FIELDS.iter().zip(&self.connections) {
            put(field, row.remark().to_string());
        }
        for (&field, row) in TEST_RESULT_FIELDS.iter().zip(&self.tests) {
            put(field, row.remark().to_string());
        }
        put(names::LSSE_REMARK, self.lsse_remark.clone());
        put(names::CUSTOMER_NAME, self.customer.name.clone());
        put(names::CUSTOMER_SIGN_DATE, format_date(self.customer.date));
        put(names::ENGINEER_NAME, self.engineer.name.clone());
        put(names::ENGINEER_SIGN_DATE, format_date(self.engineer.date));

        fields
    }
}

/// 日付を YYYY-MM-DD で表示
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 署名画像（PNG）
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
    is_empty: bool,
}

impl SignatureImage {
    pub fn new(png: Vec<u8>, width: u32, height: u32, is_empty: bool) -> Self {
        Self {
            png,
            width,
            height,
            is_empty,
        }
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// `data:image/png;base64,...` 形式
    pub fn to_data_uri(&self) -> String {
        format!("{}{}", PNG_DATA_URI_PREFIX, B64.encode(&self.png))
    }

    /// data URI からPNGバイト列を取り出す
    pub fn png_from_data_uri(uri: &str) -> Result<Vec<u8>> {
        let encoded = uri
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .ok_or_else(|| Error::InvalidSignature("expected a PNG data URI".into()))?;
        B64.decode(encoded.as_bytes())
            .map_err(|e| Error::InvalidSignature(format!("base64 decode failed: {}", e)))
    }
}

impl std::fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureImage")
            .field("png_len", &self.png.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("is_empty", &self.is_empty)
            .finish()
    }
}

/// 出力用の完成レコード
///
/// 検証済みレコードと空でない署名2つが揃ったときだけ生成できる。生成後は変更不可。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    record: TypedRecord,
    customer_signature: SignatureImage,
    engineer_signature: SignatureImage,
}

impl ReportRecord {
    pub fn assemble(
        record: TypedRecord,
        customer_signature: SignatureImage,
        engineer_signature: SignatureImage,
    ) -> Result<Self> {
        let missing: Vec<Signatory> = [
            (Signatory::Customer, &customer_signature),
            (Signatory::Engineer, &engineer_signature),
        ]
        .into_iter()
        .filter(|(_, image)| image.is_empty())
        .map(|(signatory, _)| signatory)
        .collect();

        if !missing.is_empty() {
            return Err(Error::MissingSignature(missing));
        }

        Ok(Self {
            record,
            customer_signature,
            engineer_signature,
        })
    }

    pub fn record(&self) -> &TypedRecord {
        &self.record
    }

    pub fn signature(&self, signatory: Signatory) -> &SignatureImage {
        match signatory {
            Signatory::Customer => &self.customer_signature,
            Signatory::Engineer => &self.engineer_signature,
        }
    }

    /// 送信用ペイロード: 全フィールド + 署名 data URI
    pub fn to_payload(&self) -> Payload {
        let mut payload = self.record.to_fields();
        payload.insert(
            names::CUSTOMER_SIGNATURE.to_string(),
            self.customer_signature.to_data_uri(),
        );
        payload.insert(
            names::ENGINEER_SIGNATURE.to_string(),
            self.engineer_signature.to_data_uri(),
        );
        payload
    }
}
