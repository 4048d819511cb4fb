//! Networking installation report
//!
//! 署名入力・PDF出力・送信処理と、そのCLI。フォームの検証は
//! `networking_report_common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fill;
pub mod input;
pub mod signature;
pub mod submit;

pub use error::{ReportError, Result};
