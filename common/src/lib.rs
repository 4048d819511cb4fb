//! Networking Report Common Library
//!
//! 報告書フォームのスキーマ・検証・派生・レイアウト計画（I/Oなし）

pub mod checklist;
pub mod derive;
pub mod error;
pub mod export;
pub mod form;
pub mod layout;
pub mod schema;
pub mod types;
pub mod validation;

pub use checklist::{ChecklistKind, ChecklistRow};
pub use derive::{apply_derivations, po_code};
pub use error::{Error, Result, Signatory};
pub use export::pdf_core::{build_document_plan, DocumentPlan, DrawOp, ReportHeader};
pub use form::FormState;
pub use layout::PdfLayout;
pub use schema::{names, report_schema, FieldSchema};
pub use types::{FieldErrors, Payload, RawInput, ReportRecord, SignatureImage, TypedRecord};
pub use validation::{validate, ValidationResult};
