//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use networking_report::error::ReportError;
use networking_report::input::{image_from_data_uri, ReportInput};
use networking_report_common::{Error as CommonError, FieldErrors, Signatory};
use std::path::Path;
use tempfile::tempdir;

/// 存在しない入力ファイル
#[test]
fn test_load_nonexistent_input() {
    let result = ReportInput::load(Path::new("/nonexistent/path/12345.json"));
    assert!(matches!(result, Err(ReportError::Io(_))));
}

/// 壊れたJSON
#[test]
fn test_load_malformed_input() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"fields\": ").unwrap();

    let result = ReportInput::load(&path);
    assert!(matches!(result, Err(ReportError::JsonParse(_))));
}

/// 空のJSONは空の入力として読める
#[test]
fn test_load_empty_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "{}").unwrap();

    let input = ReportInput::load(&path).expect("空オブジェクトの読み込みに失敗");
    assert!(input.fields.is_empty());
    assert!(input.signatures.customer.is_none());
}

#[test]
fn test_error_display() {
    let mut errors = FieldErrors::new();
    errors.insert("spocContact".into(), "Invalid contact number".into());
    errors.insert("lsseRemark".into(), "Minimum 50 characters required".into());

    let err = ReportError::FieldValidation(errors);
    assert_eq!(err.to_string(), "2 field(s) need attention: lsseRemark, spocContact");

    let err = ReportError::MissingSignature(vec![Signatory::Customer]);
    assert_eq!(err.to_string(), "Please provide both signatures (missing: customer)");

    let err = ReportError::Export("font error".into());
    assert_eq!(err.to_string(), "Document export failed: font error");
}

#[test]
fn test_user_correctable() {
    assert!(ReportError::FieldValidation(FieldErrors::new()).is_user_correctable());
    assert!(ReportError::MissingSignature(vec![Signatory::Engineer]).is_user_correctable());
    assert!(!ReportError::Export("x".into()).is_user_correctable());
    assert!(!ReportError::Submission("x".into()).is_user_correctable());
    assert!(!ReportError::SubmissionInProgress.is_user_correctable());
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: ReportError = io_err.into();
    assert!(matches!(err, ReportError::Io(_)));
    assert!(err.to_string().contains("denied"));
}

#[test]
fn test_common_error_conversion() {
    let err: ReportError = CommonError::MissingSignature(vec![Signatory::Engineer]).into();
    assert!(matches!(err, ReportError::MissingSignature(ref m) if m == &[Signatory::Engineer]));

    let err: ReportError = CommonError::InvalidSignature("bad".into()).into();
    assert!(matches!(err, ReportError::ImageLoad(_)));

    let err: ReportError = CommonError::FormLocked.into();
    assert!(matches!(err, ReportError::Common(CommonError::FormLocked)));
}

#[test]
fn test_error_chain_transparent() {
    let common = CommonError::UnknownField("bogus".into());
    let expected = common.to_string();
    let err: ReportError = common.into();
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_non_png_signature_rejected() {
    let result = image_from_data_uri("data:image/gif;base64,R0lGODlh");
    assert!(matches!(result, Err(ReportError::ImageLoad(_))));
}
