//! 対話的なフォーム入力
//!
//! スキーマ順に編集可能なフィールドを尋ね、入力ごとに制約を確認する。
//! 報告日を入れるとPOコードを表示する。署名は筆跡か data URI を
//! 入力ファイルに後から追加する。

use crate::error::{ReportError, Result};
use crate::input::ReportInput;
use chrono::NaiveDate;
use dialoguer::Input;
use networking_report_common::checklist::{
    CONNECTION_ITEMS, CONNECTION_REMARK_FIELDS, TEST_ITEMS, TEST_RESULT_FIELDS,
};
use networking_report_common::schema::{FieldDescriptor, FieldKind};
use networking_report_common::types::format_date;
use networking_report_common::validation::check_field;
use networking_report_common::{names, report_schema, FormState};
use std::path::Path;

pub fn run_interactive_fill(output: &Path, from: Option<&Path>, today: NaiveDate) -> Result<()> {
    let mut report = match from {
        Some(path) => ReportInput::load(path)?,
        None => ReportInput::default(),
    };
    let mut form = FormState::with_input(report_schema(), report.fields.clone());

    let editable: Vec<&FieldDescriptor> = form
        .schema()
        .fields()
        .iter()
        .filter(|d| !d.is_derived())
        .collect();

    println!("📝 {}項目を入力します（空欄は任意項目のみ可）", editable.len());
    println!("---\n");

    for (count, descriptor) in editable.iter().enumerate() {
        let initial = initial_value(descriptor, form.current_value(descriptor.name), today);
        let prompt = format!("[{}/{}] {}", count + 1, editable.len(), prompt_label(descriptor));

        let value: String = Input::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .validate_with(|input: &String| check_field(descriptor, input))
            .interact_text()
            .map_err(|e| ReportError::CliExecution(e.to_string()))?;

        form.set_value(descriptor.name, value)?;

        if descriptor.name == names::REPORT_DATE {
            println!("  → PO Code: {}", form.current_value(names::PO_CODE));
        }
    }

    report.fields = form.raw_input().clone();
    report.save(output)?;

    println!("\n✓ 保存しました: {}", output.display());
    if report.signatures.customer.is_none() || report.signatures.engineer.is_none() {
        println!("  署名（signatures.customer / signatures.engineer）を追加してから export してください");
    }
    Ok(())
}

/// 既存値があればそれ、日付なら今日
fn initial_value(descriptor: &FieldDescriptor, current: &str, today: NaiveDate) -> String {
    if !current.is_empty() {
        return current.to_string();
    }
    match descriptor.kind {
        FieldKind::Date => format_date(today),
        _ => String::new(),
    }
}

/// チェックリストの備考欄は項目名で尋ねる
fn prompt_label(descriptor: &FieldDescriptor) -> String {
    let item = CONNECTION_REMARK_FIELDS
        .iter()
        .position(|&name| name == descriptor.name)
        .map(|i| CONNECTION_ITEMS[i])
        .or_else(|| {
            TEST_RESULT_FIELDS
                .iter()
                .position(|&name| name == descriptor.name)
                .map(|i| TEST_ITEMS[i])
        });

    match item {
        Some(item) => format!("{} - {}", descriptor.label, item),
        None => descriptor.label.to_string(),
    }
}
