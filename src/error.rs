use networking_report_common::{FieldErrors, Signatory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("{} field(s) need attention: {}", .0.len(), format_fields(.0))]
    FieldValidation(FieldErrors),

    #[error("Please provide both signatures (missing: {})", format_signatories(.0))]
    MissingSignature(Vec<Signatory>),

    #[error("Signature image error: {0}")]
    ImageLoad(String),

    #[error("Document export failed: {0}")]
    Export(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI error: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(networking_report_common::Error),
}

impl From<networking_report_common::Error> for ReportError {
    fn from(error: networking_report_common::Error) -> Self {
        use networking_report_common::Error as CommonError;

        match error {
            CommonError::MissingSignature(missing) => ReportError::MissingSignature(missing),
            CommonError::InvalidSignature(message) => ReportError::ImageLoad(message),
            CommonError::Io(e) => ReportError::Io(e),
            CommonError::Json(e) => ReportError::JsonParse(e),
            other => ReportError::Common(other),
        }
    }
}

impl ReportError {
    /// 利用者が入力を直して再試行できるエラーか
    ///
    /// このツールのエラーはすべて回復可能（送信が止まるだけ）だが、
    /// 入力起因かどうかでUIの見せ方を変える。
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ReportError::FieldValidation(_) | ReportError::MissingSignature(_)
        )
    }
}

fn format_fields(errors: &FieldErrors) -> String {
    errors.keys().cloned().collect::<Vec<_>>().join(", ")
}

fn format_signatories(missing: &[Signatory]) -> String {
    missing
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ReportError>;
