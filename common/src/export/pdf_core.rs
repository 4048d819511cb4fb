//! PDF export core utilities.
//!
//! 検証済みレコードから描画計画（ページごとのテキスト・罫線・署名画像枠）を
//! 組み立てる。printpdf への描画は呼び出し側で行う。
//!
//! - 座標はmm、原点はページ左下（printpdfと同じ）
//! - 同じ入力からは常に同じ計画ができる
//! - 収まらない内容は次ページへ送る（切り捨てない）。全ページに「Page n of N」

use crate::checklist::{ChecklistKind, ChecklistRow};
use crate::error::Signatory;
use crate::layout::{
    line_height_mm, pt_to_mm, text_width_mm, truncate_to_width, PdfLayout, AVG_CHAR_WIDTH_EM, BODY_FONT_SIZE,
    CELL_PADDING_MM, FOOTER_FONT_SIZE, ORGANIZATION_FONT_SIZE, SECTION_FONT_SIZE, TITLE_FONT_SIZE,
};
use crate::schema::{names, report_schema};
use crate::types::{format_date, TypedRecord};

/// 分割せずに次ページへ送る行数の上限
const KEEP_TOGETHER_LINES: usize = 6;

/// 表題・組織名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub title: String,
    pub organization: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// 描画命令（mm単位）
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// y はベースライン
    Text {
        x_mm: f32,
        y_mm: f32,
        size_pt: f32,
        style: FontStyle,
        text: String,
    },
    Line {
        x1_mm: f32,
        y1_mm: f32,
        x2_mm: f32,
        y2_mm: f32,
    },
    /// 署名画像の配置枠。y は枠の下端
    Image {
        signatory: Signatory,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    },
}

/// 1ページ分の描画命令
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    pub ops: Vec<DrawOp>,
}

impl PagePlan {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// 文書全体の描画計画
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub title: String,
    pub pages: Vec<PagePlan>,
}

impl DocumentPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 描画順のテキスト（1命令1行）
    pub fn text_content(&self) -> String {
        self.pages
            .iter()
            .flat_map(PagePlan::texts)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// テキストを指定幅で折り返す
///
/// 単語単位で詰め、1行に収まらない単語は文字単位で分割する。改行は保持する。
/// 空のテキストは空行1つになる。
pub fn wrap_text(text: &str, max_width_mm: f32, font_size_pt: f32) -> Vec<String> {
    let char_width_mm = pt_to_mm(font_size_pt * AVG_CHAR_WIDTH_EM);
    let max_chars = ((max_width_mm / char_width_mm).floor() as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            while chars.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(chars.drain(..max_chars).collect());
            }
            if chars.is_empty() {
                continue;
            }

            let word_len = chars.len();
            if line_len > 0 && line_len + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(chars);
            line_len += word_len;
        }

        lines.push(line);
    }
    lines
}

/// 検証済みレコードの描画計画を作る
pub fn build_document_plan(
    record: &TypedRecord,
    header: &ReportHeader,
    layout: &PdfLayout,
) -> DocumentPlan {
    let mut builder = PlanBuilder::new(layout);

    builder.header(header);
    builder.basic_information(record);
    builder.technical_parameters(record);
    builder.checklist(ChecklistKind::Connections, record.connections());
    builder.checklist(ChecklistKind::Tests, record.tests());
    builder.remark(record.lsse_remark());
    builder.signatures(record);

    let footer = format!("{} / {}", header.title, record.basic().po_code);
    DocumentPlan {
        title: header.title.clone(),
        pages: builder.finish(&footer),
    }
}

struct PlanBuilder<'a> {
    layout: &'a PdfLayout,
    done: Vec<PagePlan>,
    current: PagePlan,
    /// 次に描く内容の上端（mm、下から）
    y: f32,
}

impl<'a> PlanBuilder<'a> {
    fn new(layout: &'a PdfLayout) -> Self {
        Self {
            layout,
            done: Vec::new(),
            current: PagePlan::default(),
            y: layout.content_top_mm(),
        }
    }

    fn left(&self) -> f32 {
        self.layout.margin_mm
    }

    fn right(&self) -> f32 {
        self.layout.page_width_mm - self.layout.margin_mm
    }

    fn remaining(&self) -> f32 {
        self.y - self.layout.content_bottom_mm()
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.done.push(page);
        self.y = self.layout.content_top_mm();
    }

    /// 残りが足りなければ改ページ（白紙ページでは改ページしない）
    fn ensure_space(&mut self, height_mm: f32) {
        if height_mm > self.remaining() && !self.current.ops.is_empty() {
            self.new_page();
        }
    }

    fn text(&mut self, x_mm: f32, y_mm: f32, size_pt: f32, style: FontStyle, text: impl Into<String>) {
        self.current.ops.push(DrawOp::Text {
            x_mm,
            y_mm,
            size_pt,
            style,
            text: text.into(),
        });
    }

    fn line(&mut self, x1_mm: f32, y1_mm: f32, x2_mm: f32, y2_mm: f32) {
        self.current.ops.push(DrawOp::Line {
            x1_mm,
            y1_mm,
            x2_mm,
            y2_mm,
        });
    }

    fn rect(&mut self, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) {
        let (x2, y2) = (x_mm + width_mm, y_mm + height_mm);
        self.line(x_mm, y_mm, x2, y_mm);
        self.line(x2, y_mm, x2, y2);
        self.line(x2, y2, x_mm, y2);
        self.line(x_mm, y2, x_mm, y_mm);
    }

    fn centered(&mut self, size_pt: f32, style: FontStyle, text: &str) {
        let x = (self.layout.page_width_mm - text_width_mm(text, size_pt)) / 2.0;
        let baseline = self.y - pt_to_mm(size_pt);
        self.text(x.max(self.left()), baseline, size_pt, style, text);
        self.y -= line_height_mm(size_pt);
    }

    fn header(&mut self, header: &ReportHeader) {
        self.centered(TITLE_FONT_SIZE, FontStyle::Bold, &header.title);
        self.y -= 1.0;
        self.centered(ORGANIZATION_FONT_SIZE, FontStyle::Bold, &header.organization);
        self.y -= 2.0;
        let (left, right, y) = (self.left(), self.right(), self.y);
        self.line(left, y, right, y);
        self.y -= self.layout.section_gap_mm;
    }

    /// 見出し。直後の1行と同じページに置く
    fn heading(&mut self, title: &str) {
        let keep_with_next = line_height_mm(SECTION_FONT_SIZE)
            + line_height_mm(BODY_FONT_SIZE) * 2.0
            + CELL_PADDING_MM * 4.0;
        self.ensure_space(keep_with_next);

        let baseline = self.y - pt_to_mm(SECTION_FONT_SIZE);
        let left = self.left();
        self.text(left, baseline, SECTION_FONT_SIZE, FontStyle::Bold, title);
        self.y -= line_height_mm(SECTION_FONT_SIZE) + 1.0;
    }

    fn row(&mut self, widths: &[f32], cells: &[Vec<String>], style: FontStyle) {
        let lh = line_height_mm(BODY_FONT_SIZE);
        let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let top = self.y;
        let bottom = top - lines as f32 * lh - CELL_PADDING_MM * 2.0;
        let left = self.left();

        let mut x = left;
        for (cell, width) in cells.iter().zip(widths) {
            for (i, line) in cell.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = top - CELL_PADDING_MM - pt_to_mm(BODY_FONT_SIZE) - i as f32 * lh;
                self.text(x + CELL_PADDING_MM, baseline, BODY_FONT_SIZE, style, line.clone());
            }
            self.line(x, top, x, bottom);
            x += width;
        }
        self.line(x, top, x, bottom);
        self.line(left, top, x, top);
        self.line(left, bottom, x, bottom);
        self.y = bottom;
    }

    fn header_row(&mut self, widths: &[f32], header: &[&str]) {
        let cells: Vec<Vec<String>> = header.iter().map(|h| vec![h.to_string()]).collect();
        self.row(widths, &cells, FontStyle::Bold);
    }

    /// 表を描く。行が収まらなければ続きを次ページへ送り、見出しと列見出しを繰り返す
    fn table(&mut self, title: &str, widths: &[f32], header: Option<&[&str]>, rows: &[Vec<String>]) {
        let lh = line_height_mm(BODY_FONT_SIZE);

        self.heading(title);
        if let Some(header) = header {
            self.header_row(widths, header);
        }

        for row in rows {
            let mut cells: Vec<Vec<String>> = row
                .iter()
                .zip(widths)
                .map(|(text, width)| wrap_text(text, width - CELL_PADDING_MM * 2.0, BODY_FONT_SIZE))
                .collect();

            loop {
                let needed = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
                let available = ((self.remaining() - CELL_PADDING_MM * 2.0) / lh).floor();
                let fit = if available < 1.0 { 0 } else { available as usize };

                if fit >= needed {
                    self.row(widths, &cells, FontStyle::Regular);
                    break;
                }

                if fit > 0 && needed > KEEP_TOGETHER_LINES {
                    let head: Vec<Vec<String>> = cells
                        .iter()
                        .map(|cell| cell.iter().take(fit).cloned().collect())
                        .collect();
                    self.row(widths, &head, FontStyle::Regular);
                    cells = cells
                        .into_iter()
                        .map(|cell| cell.into_iter().skip(fit).collect())
                        .collect();
                }

                self.new_page();
                self.heading(&format!("{} (continued)", title));
                if let Some(header) = header {
                    self.header_row(widths, header);
                }
            }
        }

        self.y -= self.layout.section_gap_mm;
    }

    fn basic_information(&mut self, record: &TypedRecord) {
        let basic = record.basic();
        let values = [
            (names::SERVICE_SUPPORT_MOBILE, basic.service_support_mobile.clone()),
            (names::REPORT_DATE, format_date(basic.report_date)),
            (names::STARTING_DATE, format_date(basic.starting_date)),
            (names::COMPLETION_DATE, format_date(basic.completion_date)),
            (names::CUSTOMER_NAME_ADDRESS, basic.customer_name_address.clone()),
            (names::SPOC_NAME, basic.spoc_name.clone()),
            (names::SPOC_DESIGNATION, basic.spoc_designation.clone()),
            (names::SPOC_CONTACT, basic.spoc_contact.clone()),
            (names::PO_CODE, basic.po_code.clone()),
        ];
        let rows: Vec<Vec<String>> = values
            .into_iter()
            .map(|(name, value)| vec![field_label(name).to_string(), value])
            .collect();

        let label_width = self.layout.label_col_width_mm;
        let widths = [label_width, self.layout.usable_width_mm() - label_width];
        self.table("Basic Information", &widths, None, &rows);
    }

    fn technical_parameters(&mut self, record: &TypedRecord) {
        let technical = record.technical();
        let wan_ip = if technical.wan_ip_type.is_empty() {
            "WAN IP:".to_string()
        } else {
            format!("WAN IP: {}", technical.wan_ip_type)
        };
        let rows = vec![vec!["1".to_string(), wan_ip, technical.wan_ip_remark.clone()]];

        let widths = self.layout.table_columns_mm();
        self.table(
            "Technical Parameters of the System",
            &widths,
            Some(&["S.N", "Particulars", "Remark"][..]),
            &rows,
        );
    }

    fn checklist(&mut self, kind: ChecklistKind, rows: &[ChecklistRow]) {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.sequence_number().to_string(),
                    row.particulars().to_string(),
                    row.remark().to_string(),
                ]
            })
            .collect();

        let widths = self.layout.table_columns_mm();
        self.table(kind.title(), &widths, Some(&kind.headers()[..]), &rows);
    }

    fn remark(&mut self, remark: &str) {
        let widths = [self.layout.usable_width_mm()];
        self.table(
            "LSSE Remark",
            &widths,
            Some(&["Detailed Observations and Actions Taken"][..]),
            &[vec![remark.to_string()]],
        );
    }

    /// 署名欄（顧客・技術者の2列）。ページをまたがない
    fn signatures(&mut self, record: &TypedRecord) {
        let lh = line_height_mm(BODY_FONT_SIZE);
        let column_width = self.layout.usable_width_mm() / 2.0;
        let text_width = column_width - 5.0;

        let columns: Vec<(Signatory, Vec<String>, String)> = Signatory::ALL
            .iter()
            .map(|&signatory| {
                let sign_off = record.sign_off(signatory);
                let name_lines = wrap_text(&format!("Name: {}", sign_off.name), text_width, BODY_FONT_SIZE);
                (signatory, name_lines, format!("Date: {}", format_date(sign_off.date)))
            })
            .collect();

        let name_lines = columns.iter().map(|(_, lines, _)| lines.len()).max().unwrap_or(1);
        let block_height = line_height_mm(SECTION_FONT_SIZE)
            + 1.0
            + lh
            + 1.0
            + self.layout.signature_height_mm
            + 2.0
            + (name_lines + 1) as f32 * lh;
        self.ensure_space(block_height);
        self.heading("Signatures");

        let top = self.y;
        let mut lowest = top;
        for (i, (signatory, name_lines, date_line)) in columns.into_iter().enumerate() {
            let x = self.left() + i as f32 * column_width;
            let mut y = top;

            self.text(x, y - pt_to_mm(BODY_FONT_SIZE), BODY_FONT_SIZE, FontStyle::Bold, signature_label(signatory));
            y -= lh + 1.0;

            let (width, height) = (self.layout.signature_width_mm, self.layout.signature_height_mm);
            y -= height;
            self.current.ops.push(DrawOp::Image {
                signatory,
                x_mm: x,
                y_mm: y,
                width_mm: width,
                height_mm: height,
            });
            self.rect(x, y, width, height);
            y -= 2.0;

            for line in name_lines.into_iter().chain(std::iter::once(date_line)) {
                self.text(x, y - pt_to_mm(BODY_FONT_SIZE), BODY_FONT_SIZE, FontStyle::Regular, line);
                y -= lh;
            }
            lowest = lowest.min(y);
        }
        self.y = lowest;
    }

    /// ページ番号を入れて全ページを返す
    fn finish(self, footer: &str) -> Vec<PagePlan> {
        let layout = self.layout;
        let mut pages = self.done;
        pages.push(self.current);

        let total = pages.len();
        let right = layout.page_width_mm - layout.margin_mm;
        for (i, page) in pages.iter_mut().enumerate() {
            let number = format!("Page {} of {}", i + 1, total);
            let number_x = right - text_width_mm(&number, FOOTER_FONT_SIZE);
            // ページ番号と重ならない幅に切り詰める
            let room = number_x - layout.margin_mm - CELL_PADDING_MM * 2.0;
            page.ops.push(DrawOp::Text {
                x_mm: layout.margin_mm,
                y_mm: layout.margin_mm,
                size_pt: FOOTER_FONT_SIZE,
                style: FontStyle::Regular,
                text: truncate_to_width(footer, room, FOOTER_FONT_SIZE),
            });
            page.ops.push(DrawOp::Text {
                x_mm: number_x,
                y_mm: layout.margin_mm,
                size_pt: FOOTER_FONT_SIZE,
                style: FontStyle::Regular,
                text: number,
            });
        }
        pages
    }
}

fn field_label(name: &str) -> &str {
    report_schema()
        .descriptor(name)
        .map(|d| d.label)
        .unwrap_or(name)
}

fn signature_label(signatory: Signatory) -> &'static str {
    match signatory {
        Signatory::Customer => "Customer Signature & Stamp",
        Signatory::Engineer => "Engineer Signature",
    }
}
