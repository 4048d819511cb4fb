pub mod pdf;

use crate::error::Result;
use networking_report_common::{build_document_plan, DocumentPlan, PdfLayout, ReportHeader, ReportRecord};
use sha2::{Digest, Sha256};

/// 出力済み文書
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    bytes: Vec<u8>,
    plan: DocumentPlan,
    fingerprint: String,
}

impl ExportedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.plan.page_count()
    }

    /// 描画したテキスト（1命令1行）
    pub fn text_content(&self) -> String {
        self.plan.text_content()
    }

    /// テキスト内容のSHA-256（16進）
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[derive(Debug, Clone)]
pub struct DocumentExporter {
    header: ReportHeader,
    layout: PdfLayout,
}

impl DocumentExporter {
    pub fn new(header: ReportHeader) -> Self {
        Self::with_layout(header, PdfLayout::a4())
    }

    pub fn with_layout(header: ReportHeader, layout: PdfLayout) -> Self {
        Self { header, layout }
    }

    pub fn header(&self) -> &ReportHeader {
        &self.header
    }

    pub fn plan(&self, record: &ReportRecord) -> DocumentPlan {
        build_document_plan(record.record(), &self.header, &self.layout)
    }

    /// レコードをPDFにする。レコードはここで消費される
    pub fn export(&self, record: ReportRecord) -> Result<ExportedDocument> {
        let plan = self.plan(&record);
        let fingerprint = fingerprint(&plan);
        let bytes = pdf::render_plan(
            &plan,
            &record,
            self.layout.page_width_mm,
            self.layout.page_height_mm,
        )?;

        tracing::info!(
            pages = plan.page_count(),
            bytes = bytes.len(),
            fingerprint = %fingerprint,
            "報告書PDFを生成"
        );

        Ok(ExportedDocument {
            bytes,
            plan,
            fingerprint,
        })
    }
}

pub fn fingerprint(plan: &DocumentPlan) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plan.text_content().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let plan = DocumentPlan {
            title: "t".into(),
            pages: Vec::new(),
        };
        let digest = fingerprint(&plan);
        assert_eq!(digest.len(), 64);
        // 空文字列のSHA-256
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbe4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
