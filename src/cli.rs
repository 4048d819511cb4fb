use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "networking-report")]
#[command(about = "Networking installation report: validation, signatures and PDF export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話的にフォームを入力してJSONを出力
    Fill {
        /// 出力JSONファイル
        #[arg(short, long, default_value = "report-input.json")]
        output: PathBuf,

        /// 既存の入力JSONを初期値として読み込む
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// 入力JSONを検証してエラーを表示
    Validate {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 入力JSONから報告書PDFと送信用JSONを生成
    Export {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力ファイル名（拡張子なし、省略時は設定値）
        #[arg(long)]
        stem: Option<String>,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let cli = Cli::parse_from(["networking-report", "export", "in.json", "-o", "out", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Export { input, output, stem } => {
                assert_eq!(input, PathBuf::from("in.json"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(stem.is_none());
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_fill_default_output() {
        let cli = Cli::parse_from(["networking-report", "fill"]);
        match cli.command {
            Commands::Fill { output, from } => {
                assert_eq!(output, PathBuf::from("report-input.json"));
                assert!(from.is_none());
            }
            _ => panic!("expected fill"),
        }
    }
}
