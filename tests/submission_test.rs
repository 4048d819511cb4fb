//! 送信処理の統合テスト

mod common;

use async_trait::async_trait;
use common::{blank_signature, drawn_signature, valid_input};
use networking_report::config::Config;
use networking_report::error::{ReportError, Result};
use networking_report::export::{DocumentExporter, ExportedDocument};
use networking_report::submit::{FileSink, ReportSink, Submission, SubmissionState};
use networking_report_common::{names, report_schema, FormState, Payload, Signatory};
use std::time::Duration;
use tempfile::tempdir;

fn submission() -> Submission {
    Submission::new(DocumentExporter::new(Config::default().header()))
}

/// 送信に失敗する送信先
struct OfflineSink;

#[async_trait]
impl ReportSink for OfflineSink {
    async fn send(&self, _payload: &Payload, _document: &ExportedDocument) -> Result<String> {
        Err(ReportError::Submission("backend unreachable".into()))
    }
}

/// 少し待ってから成功する送信先
struct SlowSink;

#[async_trait]
impl ReportSink for SlowSink {
    async fn send(&self, _payload: &Payload, _document: &ExportedDocument) -> Result<String> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok("accepted".into())
    }
}

#[tokio::test]
async fn test_submit_writes_pdf_and_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let sink = FileSink::new(dir.path(), "report");
    let submission = submission();
    let mut form = FormState::with_input(report_schema(), valid_input());

    let submitted = submission
        .submit(&mut form, drawn_signature(), drawn_signature(), &sink)
        .await
        .expect("送信に失敗");

    assert_eq!(submission.state(), SubmissionState::Succeeded);
    assert!(!form.is_locked());

    let pdf = std::fs::read(sink.pdf_path()).expect("PDFが作成されていない");
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(pdf, submitted.document.bytes());

    let json = std::fs::read_to_string(sink.json_path()).expect("JSONが作成されていない");
    let payload: Payload = serde_json::from_str(&json).unwrap();
    assert_eq!(payload, submitted.payload);
    assert_eq!(payload[names::PO_CODE], "PO160525SE01");
    assert_eq!(payload[names::SPOC_NAME], "Ravi Kumar");
    assert!(payload[names::CUSTOMER_SIGNATURE].starts_with("data:image/png;base64,"));
    assert!(payload[names::ENGINEER_SIGNATURE].starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_missing_signature_blocks_submission() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), "report");
    let submission = submission();
    let mut form = FormState::with_input(report_schema(), valid_input());

    let result = submission
        .submit(&mut form, drawn_signature(), blank_signature(), &sink)
        .await;

    match result {
        Err(ReportError::MissingSignature(missing)) => {
            assert_eq!(missing, vec![Signatory::Engineer]);
        }
        other => panic!("expected MissingSignature, got {:?}", other.map(|s| s.receipt)),
    }
    assert!(matches!(submission.state(), SubmissionState::Failed(_)));
    assert!(!form.is_locked());
    assert!(!sink.pdf_path().exists());
    assert!(!sink.json_path().exists());
}

#[tokio::test]
async fn test_both_signatures_missing_listed() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), "report");
    let mut form = FormState::with_input(report_schema(), valid_input());

    let err = submission()
        .submit(&mut form, blank_signature(), blank_signature(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(&err, ReportError::MissingSignature(m) if m.len() == 2));
    assert!(err.to_string().contains("customer, engineer"));
    assert!(err.is_user_correctable());
}

#[tokio::test]
async fn test_invalid_fields_reported_on_form() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), "report");
    let mut input = valid_input();
    input.set(names::SERVICE_SUPPORT_MOBILE, "98765432");
    input.set(names::LSSE_REMARK, "too short");
    let mut form = FormState::with_input(report_schema(), input);

    let err = submission()
        .submit(&mut form, drawn_signature(), drawn_signature(), &sink)
        .await
        .unwrap_err();

    match err {
        ReportError::FieldValidation(errors) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[names::SERVICE_SUPPORT_MOBILE], "Invalid mobile number");
            assert_eq!(errors[names::LSSE_REMARK], "Minimum 50 characters required");
        }
        other => panic!("expected FieldValidation, got {:?}", other),
    }

    assert_eq!(form.error_for(names::SERVICE_SUPPORT_MOBILE), Some("Invalid mobile number"));
    assert!(!form.is_locked());
    form.set_value(names::SERVICE_SUPPORT_MOBILE, "9876543210")
        .expect("送信後は編集できる");
    assert!(!sink.pdf_path().exists());
}

#[tokio::test]
async fn test_sink_failure_reverts_to_editable() {
    let submission = submission();
    let mut form = FormState::with_input(report_schema(), valid_input());

    let err = submission
        .submit(&mut form, drawn_signature(), drawn_signature(), &OfflineSink)
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Submission(_)));
    assert_eq!(
        submission.state(),
        SubmissionState::Failed("Submission failed: backend unreachable".into())
    );
    assert!(!form.is_locked());

    // 再試行できる
    let dir = tempdir().unwrap();
    let retry = submission
        .submit(&mut form, drawn_signature(), drawn_signature(), &FileSink::new(dir.path(), "r"))
        .await;
    assert!(retry.is_ok());
    assert_eq!(submission.state(), SubmissionState::Succeeded);
}

#[tokio::test]
async fn test_unwritable_pdf_leaves_no_json_behind() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), "report");
    // PDFの保存先をディレクトリで塞ぐ
    std::fs::create_dir(sink.pdf_path()).unwrap();
    let submission = submission();
    let mut form = FormState::with_input(report_schema(), valid_input());

    let err = submission
        .submit(&mut form, drawn_signature(), drawn_signature(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Submission(_)), "{:?}", err);
    assert!(matches!(submission.state(), SubmissionState::Failed(_)));
    assert!(!form.is_locked());
    assert!(!sink.json_path().exists());

    let mut entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    entries.sort();
    assert_eq!(entries, vec![std::ffi::OsString::from("report.pdf")]);
}

#[tokio::test]
async fn test_second_submission_while_pending_is_rejected() {
    let submission = submission();
    let mut first_form = FormState::with_input(report_schema(), valid_input());
    let mut second_form = FormState::with_input(report_schema(), valid_input());

    let (first, second) = tokio::join!(
        submission.submit(&mut first_form, drawn_signature(), drawn_signature(), &SlowSink),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            submission
                .submit(&mut second_form, drawn_signature(), drawn_signature(), &SlowSink)
                .await
        }
    );

    assert_eq!(first.expect("1回目は成功").receipt, "accepted");
    assert!(matches!(second, Err(ReportError::SubmissionInProgress)));
    assert_eq!(submission.state(), SubmissionState::Succeeded);
    assert!(!second_form.is_locked());
}

#[tokio::test]
async fn test_sink_receives_payload() {
    /// 受け取ったPOコードをそのまま返す送信先
    struct EchoSink;

    #[async_trait]
    impl ReportSink for EchoSink {
        async fn send(&self, payload: &Payload, _document: &ExportedDocument) -> Result<String> {
            Ok(payload[names::PO_CODE].clone())
        }
    }

    let mut input = valid_input();
    // 派生フィールドの改ざんは無視される
    input.set(names::PO_CODE, "PO000000SE01");
    let mut form = FormState::with_input(report_schema(), input);

    let submitted = submission()
        .submit(&mut form, drawn_signature(), drawn_signature(), &EchoSink)
        .await
        .unwrap();
    assert_eq!(submitted.receipt, "PO160525SE01");
}
