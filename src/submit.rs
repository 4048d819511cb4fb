//! 送信処理
//!
//! 検証 → 署名チェック → レコード組み立て → PDF出力 → 送信先へ渡す。
//! 実行中はフォームをロックし、結果にかかわらず最後に解除する。

use crate::error::{ReportError, Result};
use crate::export::{DocumentExporter, ExportedDocument};
use async_trait::async_trait;
use networking_report_common::{FormState, Payload, ReportRecord, SignatureImage};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// 入力ロック中
    Pending,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }
}

/// 送信結果
#[derive(Debug, Clone)]
pub struct Submitted {
    pub payload: Payload,
    pub document: ExportedDocument,
    /// 送信先が返した保存場所など
    pub receipt: String,
}

/// 報告書の送信先
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn send(&self, payload: &Payload, document: &ExportedDocument) -> Result<String>;
}

/// ディレクトリに `<stem>.json` と `<stem>.pdf` を書く送信先
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    stem: String,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pdf", self.stem))
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.stem))
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn send(&self, payload: &Payload, document: &ExportedDocument) -> Result<String> {
        let write = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            let json = serde_json::to_vec_pretty(payload)?;
            write_all_or_nothing(&[
                (self.pdf_path(), document.bytes()),
                (self.json_path(), json.as_slice()),
            ])
            .await?;
            Ok::<_, ReportError>(())
        };
        write
            .await
            .map_err(|e| ReportError::Submission(format!("{}: {}", self.dir.display(), e)))?;

        Ok(self.pdf_path().display().to_string())
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

async fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        // 後片付けの失敗は元のエラーを優先する
        let _ = tokio::fs::remove_file(path).await;
    }
}

/// `.part` に書いてから改名する。どこかで失敗したら書いたファイルをすべて消す
async fn write_all_or_nothing(files: &[(PathBuf, &[u8])]) -> std::io::Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, bytes) in files {
        let part = part_path(path);
        if let Err(e) = tokio::fs::write(&part, bytes).await {
            staged.push(part);
            remove_all(&staged).await;
            return Err(e);
        }
        staged.push(part);
    }

    let mut committed = Vec::with_capacity(files.len());
    for ((path, _), part) in files.iter().zip(&staged) {
        if let Err(e) = tokio::fs::rename(part, path).await {
            remove_all(&staged).await;
            remove_all(&committed).await;
            return Err(e);
        }
        committed.push(path.clone());
    }

    tracing::debug!(files = committed.len(), "送信ファイルを書き込み");
    Ok(())
}

pub struct Submission {
    exporter: DocumentExporter,
    state: Mutex<SubmissionState>,
}

impl Submission {
    pub fn new(exporter: DocumentExporter) -> Self {
        Self {
            exporter,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SubmissionState> {
        // 汚染されていても値はそのまま使う
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<()> {
        let mut state = self.lock_state();
        if state.is_pending() {
            return Err(ReportError::SubmissionInProgress);
        }
        *state = SubmissionState::Pending;
        Ok(())
    }

    fn finish<T>(&self, result: &Result<T>) {
        let mut state = self.lock_state();
        *state = match result {
            Ok(_) => SubmissionState::Succeeded,
            Err(e) => SubmissionState::Failed(e.to_string()),
        };
    }

    /// 署名は書き出し済みの画像を受け取る（描画中の筆跡は見ない）
    pub async fn submit<S: ReportSink>(
        &self,
        form: &mut FormState<'_>,
        customer: SignatureImage,
        engineer: SignatureImage,
        sink: &S,
    ) -> Result<Submitted> {
        self.begin()?;
        form.lock();

        let result = self.run(form, customer, engineer, sink).await;

        form.unlock();
        self.finish(&result);
        match &result {
            Ok(submitted) => tracing::info!(receipt = %submitted.receipt, "送信完了"),
            Err(e) => tracing::info!(error = %e, "送信中止"),
        }
        result
    }

    async fn run<S: ReportSink>(
        &self,
        form: &mut FormState<'_>,
        customer: SignatureImage,
        engineer: SignatureImage,
        sink: &S,
    ) -> Result<Submitted> {
        let record = form
            .validate()
            .into_result()
            .map_err(ReportError::FieldValidation)?;
        let record = ReportRecord::assemble(record, customer, engineer)?;

        let payload = record.to_payload();
        let document = self.exporter.export(record)?;
        let receipt = sink.send(&payload, &document).await?;

        Ok(Submitted {
            payload,
            document,
            receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_while_pending() {
        let submission = Submission::new(DocumentExporter::new(crate::config::Config::default().header()));
        assert_eq!(submission.state(), SubmissionState::Idle);

        submission.begin().unwrap();
        assert!(submission.state().is_pending());
        assert!(matches!(submission.begin(), Err(ReportError::SubmissionInProgress)));

        submission.finish::<()>(&Err(ReportError::Submission("offline".into())));
        assert_eq!(
            submission.state(),
            SubmissionState::Failed("Submission failed: offline".into())
        );
        assert!(submission.begin().is_ok());
    }

    #[test]
    fn test_part_path_keeps_extension() {
        assert_eq!(part_path(Path::new("/out/report.pdf")), PathBuf::from("/out/report.pdf.part"));
    }

    #[tokio::test]
    async fn test_failed_rename_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.pdf");
        // ディレクトリへの改名は失敗する
        let second = dir.path().join("a.json");
        std::fs::create_dir(&second).unwrap();

        let result = write_all_or_nothing(&[
            (first.clone(), b"pdf".as_slice()),
            (second.clone(), b"{}".as_slice()),
        ])
        .await;

        assert!(result.is_err());
        assert!(!first.exists());
        assert!(!part_path(&first).exists());
        assert!(!part_path(&second).exists());
        assert!(second.is_dir());
    }
}
