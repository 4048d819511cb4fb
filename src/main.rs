use anyhow::Context;
use clap::Parser;
use networking_report::{cli, config, error, export, fill, input, submit};
use networking_report_common::{report_schema, validate, FormState, Signatory, ValidationResult};
use cli::{Cli, Commands};
use config::Config;
use input::ReportInput;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Fill { output, from } => {
            println!("📋 networking-report - フォーム入力\n");
            let today = chrono::Local::now().date_naive();
            fill::run_interactive_fill(&output, from.as_deref(), today)?;
        }

        Commands::Validate { input } => {
            let report = ReportInput::load(&input)
                .with_context(|| format!("入力ファイルを読み込めません: {}", input.display()))?;

            match validate(&report.fields, report_schema()) {
                ValidationResult::Valid(record) => {
                    println!("✔ valid (PO Code: {})", record.basic().po_code);
                }
                ValidationResult::Invalid(errors) => {
                    println!("✘ {}項目にエラー:", errors.len());
                    for (field, message) in &errors {
                        println!("  {}: {}", field, message);
                    }
                    return Err(error::ReportError::FieldValidation(errors).into());
                }
            }
        }

        Commands::Export { input, output, stem } => {
            println!("📄 networking-report - エクスポート\n");

            let report = ReportInput::load(&input)
                .with_context(|| format!("入力ファイルを読み込めません: {}", input.display()))?;

            println!("[1/3] 署名を読み込み中...");
            let customer = report.signature_image(Signatory::Customer, &config)?;
            let engineer = report.signature_image(Signatory::Engineer, &config)?;
            println!("✔ 署名読み込み完了\n");

            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            let stem = stem.unwrap_or_else(|| config.output_stem.clone());
            let sink = submit::FileSink::new(&output_dir, stem);
            let submission = submit::Submission::new(export::DocumentExporter::new(config.header()));

            println!("[2/3] 検証・PDF生成中...");
            let mut form = FormState::with_input(report_schema(), report.fields);
            let result = submission.submit(&mut form, customer, engineer, &sink).await;

            let submitted = match result {
                Ok(submitted) => submitted,
                Err(e) => {
                    if let error::ReportError::FieldValidation(errors) = &e {
                        for (field, message) in errors {
                            println!("  {}: {}", field, message);
                        }
                    }
                    if e.is_user_correctable() {
                        println!("\n入力を修正して再実行してください");
                    }
                    return Err(e.into());
                }
            };
            println!(
                "✔ {}ページ (fingerprint {})\n",
                submitted.document.page_count(),
                &submitted.document.fingerprint()[..12]
            );

            println!("[3/3] 出力ファイル");
            println!("✔ PDF出力: {}", sink.pdf_path().display());
            println!("✔ JSON出力: {}", sink.json_path().display());

            println!("\n✅ エクスポート完了");
        }

        Commands::Config { show, init } => {
            if init {
                config.save()?;
                println!("✔ 設定ファイルを作成しました: {}", Config::config_path()?.display());
            }

            if show || !init {
                println!("設定:");
                println!("  表題: {}", config.title);
                println!("  組織名: {}", config.organization);
                println!("  キャンバス: {}x{}px", config.canvas_width, config.canvas_height);
                println!("  ペン幅: {}px", config.pen_width);
                println!("  出力ファイル名: {}", config.output_stem);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
