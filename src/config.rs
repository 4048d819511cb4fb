use crate::error::{ReportError, Result};
use networking_report_common::ReportHeader;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub title: String,
    pub organization: String,
    /// 署名キャンバスの大きさ（px）
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// ペン幅（px）
    pub pen_width: f32,
    /// 出力ファイル名（拡張子なし）
    pub output_stem: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Smart Networking Report".into(),
            organization: "LAXMI SECURITY SYSTEMS AND ELECTRICALS".into(),
            canvas_width: 400,
            canvas_height: 200,
            pen_width: 2.0,
            output_stem: "networking-report".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.check()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("networking-report").join("config.json"))
    }

    /// 値の範囲チェック
    pub fn check(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ReportError::Config("canvas size must be non-zero".into()));
        }
        if !(self.pen_width.is_finite() && self.pen_width > 0.0) {
            return Err(ReportError::Config("pen width must be positive".into()));
        }
        if self.output_stem.trim().is_empty() {
            return Err(ReportError::Config("output file name must not be empty".into()));
        }
        Ok(())
    }

    pub fn header(&self) -> ReportHeader {
        ReportHeader {
            title: self.title.clone(),
            organization: self.organization.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.check().is_ok());
        assert_eq!(config.canvas_width, 400);
        assert_eq!(config.header().title, "Smart Networking Report");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "organization": "Acme Networks" }"#).unwrap();
        assert_eq!(config.organization, "Acme Networks");
        assert_eq!(config.canvas_height, 200);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config {
            pen_width: 0.0,
            ..Config::default()
        };
        assert!(matches!(config.check(), Err(ReportError::Config(_))));

        let config = Config {
            canvas_width: 0,
            ..Config::default()
        };
        assert!(config.check().is_err());
    }
}
