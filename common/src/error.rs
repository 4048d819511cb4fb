//! エラー型定義

use thiserror::Error;

/// 署名者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Signatory {
    Customer,
    Engineer,
}

impl Signatory {
    pub const ALL: [Signatory; 2] = [Signatory::Customer, Signatory::Engineer];

    pub fn label(&self) -> &'static str {
        match self {
            Signatory::Customer => "customer",
            Signatory::Engineer => "engineer",
        }
    }
}

impl std::fmt::Display for Signatory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field is read-only: {0}")]
    ReadOnlyField(String),

    #[error("Form is locked while a submission is pending")]
    FormLocked,

    #[error("Please provide both signatures (missing: {})", format_missing(.0))]
    MissingSignature(Vec<Signatory>),

    #[error("Invalid signature image: {0}")]
    InvalidSignature(String),
}

fn format_missing(missing: &[Signatory]) -> String {
    missing
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
