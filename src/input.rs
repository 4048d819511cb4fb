//! 入力ファイル（フィールド値 + 署名）
//!
//! ```json
//! {
//!   "fields": { "reportDate": "2025-05-16", ... },
//!   "signatures": {
//!     "customer": { "strokes": [[{ "x": 10, "y": 20 }, { "x": 40, "y": 60 }]] },
//!     "engineer": { "dataUri": "data:image/png;base64,..." }
//!   }
//! }
//! ```

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::signature::{SignatureCapture, Stroke};
use networking_report_common::{RawInput, Signatory, SignatureImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub fields: RawInput,
    #[serde(default)]
    pub signatures: SignatureInputs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<SignatureInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineer: Option<SignatureInput>,
}

impl SignatureInputs {
    pub fn get(&self, signatory: Signatory) -> Option<&SignatureInput> {
        match signatory {
            Signatory::Customer => self.customer.as_ref(),
            Signatory::Engineer => self.engineer.as_ref(),
        }
    }
}

/// 筆跡（キャンバスで再生する）か、書き出し済みのPNG
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignatureInput {
    Strokes { strokes: Vec<Stroke> },
    #[serde(rename_all = "camelCase")]
    DataUri { data_uri: String },
}

impl ReportInput {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 署名画像を用意する。未入力なら空のキャンバスを書き出す
    pub fn signature_image(&self, signatory: Signatory, config: &Config) -> Result<SignatureImage> {
        match self.signatures.get(signatory) {
            Some(SignatureInput::DataUri { data_uri }) => image_from_data_uri(data_uri),
            Some(SignatureInput::Strokes { strokes }) => {
                let mut capture = capture_for(config);
                for stroke in strokes {
                    capture.add_stroke(stroke.clone());
                }
                capture.export_image()
            }
            None => capture_for(config).export_image(),
        }
    }
}

fn capture_for(config: &Config) -> SignatureCapture {
    SignatureCapture::with_pen_width(config.canvas_width, config.canvas_height, config.pen_width)
}

/// 書き出し済みPNGを読み込む。不透明な画素がなければ空とみなす
pub fn image_from_data_uri(data_uri: &str) -> Result<SignatureImage> {
    let png = SignatureImage::png_from_data_uri(data_uri)?;
    let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .map_err(|e| ReportError::ImageLoad(format!("signature is not a readable PNG: {}", e)))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let is_empty = decoded.pixels().all(|p| p[3] == 0);
    Ok(SignatureImage::new(png, width, height, is_empty))
}
