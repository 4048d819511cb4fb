//! 点検チェックリスト
//!
//! 接続確認表・試験表の項目は固定。連番は1始まりで項目の位置と一致し、
//! 利用者が編集することはない。備考だけが入力値。

use crate::types::RawInput;
use serde::Serialize;

/// 接続確認項目
pub const CONNECTION_ITEMS: [&str; 9] = [
    "Network equipment was installed in a standard network rack",
    "Patch panels are labelled and organised for easy access",
    "Cable management accessories are used for proper routing",
    "Devices are mounted securely with proper ventilation",
    "Power is provided via UPS and tested for failover",
    "Structured cabling completed with labelling",
    "Backbone uplinks are configured between switches",
    "Suggest periodic backup of configurations",
    "Guest WiFi isolation is enabled for security",
];

/// 接続確認項目の備考フィールド名（項目と同じ並び）
pub const CONNECTION_REMARK_FIELDS: [&str; 9] = [
    "connectionRemark0",
    "connectionRemark1",
    "connectionRemark2",
    "connectionRemark3",
    "connectionRemark4",
    "connectionRemark5",
    "connectionRemark6",
    "connectionRemark7",
    "connectionRemark8",
];

/// 試験項目
pub const TEST_ITEMS: [&str; 5] = [
    "Speed test and latency checks performed",
    "Internet access was tested from multiple devices",
    "Wireless coverage checked using signal strength tools",
    "Ping and traceroute verified for LAN/WAN connectivity",
    "Failover tested (if redundant equipment is used)",
];

/// 試験結果フィールド名（項目と同じ並び）
pub const TEST_RESULT_FIELDS: [&str; 5] = [
    "testResult0",
    "testResult1",
    "testResult2",
    "testResult3",
    "testResult4",
];

/// チェックリストの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistKind {
    Connections,
    Tests,
}

impl ChecklistKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChecklistKind::Connections => "Position/Location/Type of Connections of the System",
            ChecklistKind::Tests => "Testing & Commissioning of User Experience",
        }
    }

    /// 表の列見出し（連番, 項目, 入力欄）
    pub fn headers(&self) -> [&'static str; 3] {
        match self {
            ChecklistKind::Connections => ["S.N", "Particulars", "Remark"],
            ChecklistKind::Tests => ["S.N", "Testing", "Result"],
        }
    }

    pub fn items(&self) -> &'static [&'static str] {
        match self {
            ChecklistKind::Connections => &CONNECTION_ITEMS,
            ChecklistKind::Tests => &TEST_ITEMS,
        }
    }

    pub fn remark_fields(&self) -> &'static [&'static str] {
        match self {
            ChecklistKind::Connections => &CONNECTION_REMARK_FIELDS,
            ChecklistKind::Tests => &TEST_RESULT_FIELDS,
        }
    }
}

/// チェックリストの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistRow {
    sequence_number: u32,
    particulars: String,
    remark: String,
}

impl ChecklistRow {
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn particulars(&self) -> &str {
        &self.particulars
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }
}

/// 固定項目と入力された備考を位置で突き合わせて行を作る
pub fn build_rows(kind: ChecklistKind, input: &RawInput) -> Vec<ChecklistRow> {
    kind.items()
        .iter()
        .zip(kind.remark_fields())
        .enumerate()
        .map(|(index, (particulars, field))| ChecklistRow {
            sequence_number: index as u32 + 1,
            particulars: (*particulars).to_string(),
            remark: input.get(field).trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_and_field_counts_match() {
        for kind in [ChecklistKind::Connections, ChecklistKind::Tests] {
            assert_eq!(kind.items().len(), kind.remark_fields().len());
        }
    }

    #[test]
    fn test_rows_are_numbered_by_position() {
        let rows = build_rows(ChecklistKind::Connections, &RawInput::new());
        assert_eq!(rows.len(), 9);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.sequence_number(), i as u32 + 1);
            assert_eq!(row.particulars(), CONNECTION_ITEMS[i]);
            assert_eq!(row.remark(), "");
        }
    }

    #[test]
    fn test_remarks_are_merged_by_index() {
        let mut input = RawInput::new();
        input.set("testResult0", "  120 Mbps / 8 ms ");
        input.set("testResult4", "Not applicable");

        let rows = build_rows(ChecklistKind::Tests, &input);
        assert_eq!(rows[0].remark(), "120 Mbps / 8 ms");
        assert_eq!(rows[1].remark(), "");
        assert_eq!(rows[4].remark(), "Not applicable");
        assert_eq!(rows[4].sequence_number(), 5);
    }

    #[test]
    fn test_row_serialization() {
        let rows = build_rows(ChecklistKind::Tests, &RawInput::new());
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert!(json.contains("\"sequenceNumber\":1"));
        assert!(json.contains("\"particulars\":\"Speed test and latency checks performed\""));
    }
}
