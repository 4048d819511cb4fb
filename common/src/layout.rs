//! レイアウト設定モジュール
//!
//! mm基準のレイアウト定義（Source of Truth）
//! 座標はテンプレートで固定。内容量に応じて変わるのは縦方向の送りだけ。

// ============================================
// mm基準レイアウト（Source of Truth）
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 余白設定（mm）
pub const MARGIN_MM: f32 = 15.0;
pub const SECTION_GAP_MM: f32 = 6.0;
pub const CELL_PADDING_MM: f32 = 1.5;

/// 利用可能幅（mm）
pub const USABLE_WIDTH_MM: f32 = A4_WIDTH_MM - MARGIN_MM * 2.0; // 180mm

/// 表の列幅（mm）
pub const SERIAL_COL_WIDTH_MM: f32 = 12.0;
pub const PARTICULARS_RATIO: f32 = 0.55;
pub const REMARK_RATIO: f32 = 0.45;

/// 基本情報のラベル列幅（mm）
pub const LABEL_COL_WIDTH_MM: f32 = 55.0;

/// 署名画像枠（mm）
pub const SIGNATURE_WIDTH_MM: f32 = 60.0;
pub const SIGNATURE_HEIGHT_MM: f32 = 30.0;

// ============================================
// フォントサイズ（pt）
// ============================================

pub const TITLE_FONT_SIZE: f32 = 18.0;
pub const ORGANIZATION_FONT_SIZE: f32 = 12.0;
pub const SECTION_FONT_SIZE: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 9.0;
pub const FOOTER_FONT_SIZE: f32 = 8.0;

/// 行送り（フォントサイズに対する倍率）
pub const LINE_SPACING: f32 = 1.35;

/// Helvetica の平均文字幅（em）。折り返し計算用に少し広めに見積もる
pub const AVG_CHAR_WIDTH_EM: f32 = 0.55;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

// ============================================
// レイアウト設定構造体
// ============================================

/// PDFレイアウト設定
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    /// ページ幅（mm）
    pub page_width_mm: f32,
    /// ページ高さ（mm）
    pub page_height_mm: f32,
    /// マージン（mm）
    pub margin_mm: f32,
    /// セクション間ギャップ（mm）
    pub section_gap_mm: f32,
    /// 連番列の幅（mm）
    pub serial_col_width_mm: f32,
    /// 基本情報ラベル列の幅（mm）
    pub label_col_width_mm: f32,
    /// 署名画像の幅（mm）
    pub signature_width_mm: f32,
    /// 署名画像の高さ（mm）
    pub signature_height_mm: f32,
}

impl PdfLayout {
    /// A4縦
    pub fn a4() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm: MARGIN_MM,
            section_gap_mm: SECTION_GAP_MM,
            serial_col_width_mm: SERIAL_COL_WIDTH_MM,
            label_col_width_mm: LABEL_COL_WIDTH_MM,
            signature_width_mm: SIGNATURE_WIDTH_MM,
            signature_height_mm: SIGNATURE_HEIGHT_MM,
        }
    }

    /// 利用可能幅（mm）
    pub fn usable_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm * 2.0
    }

    /// 利用可能高さ（mm）
    pub fn usable_height_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm * 2.0
    }

    /// コンテンツ開始Y座標（mm、下から）
    pub fn content_top_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm
    }

    /// コンテンツ下端Y座標（mm、下から）。フッター分を空ける
    pub fn content_bottom_mm(&self) -> f32 {
        self.margin_mm + line_height_mm(FOOTER_FONT_SIZE) * 2.0
    }

    /// 表の列幅 [連番, 項目, 入力欄]（mm）
    pub fn table_columns_mm(&self) -> [f32; 3] {
        let rest = self.usable_width_mm() - self.serial_col_width_mm;
        [
            self.serial_col_width_mm,
            rest * PARTICULARS_RATIO,
            rest * REMARK_RATIO,
        ]
    }
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self::a4()
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// pt → mm 変換
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// 行送り（mm）
#[inline]
pub fn line_height_mm(font_size_pt: f32) -> f32 {
    pt_to_mm(font_size_pt * LINE_SPACING)
}

/// 文字列の概算幅（mm）
pub fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    pt_to_mm(text.chars().count() as f32 * font_size_pt * AVG_CHAR_WIDTH_EM)
}

/// 幅に収まらない文字列を末尾 "..." で切り詰める
pub fn truncate_to_width(text: &str, max_width_mm: f32, font_size_pt: f32) -> String {
    const ELLIPSIS: &str = "...";

    if text_width_mm(text, font_size_pt) <= max_width_mm {
        return text.to_string();
    }
    let char_width = text_width_mm("x", font_size_pt);
    let room = ((max_width_mm - text_width_mm(ELLIPSIS, font_size_pt)) / char_width).floor();
    if room < 1.0 {
        return String::new();
    }
    let kept: String = text.chars().take(room as usize).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert!((USABLE_WIDTH_MM - 180.0).abs() < 0.01);
        let layout = PdfLayout::a4();
        assert!((layout.usable_width_mm() - USABLE_WIDTH_MM).abs() < 0.01);
        assert!(layout.content_bottom_mm() > layout.margin_mm);
        assert!(layout.content_top_mm() < layout.page_height_mm);
    }

    #[test]
    fn test_ratios() {
        let total = PARTICULARS_RATIO + REMARK_RATIO;
        assert!((total - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_table_columns_fill_width() {
        let layout = PdfLayout::a4();
        let total: f32 = layout.table_columns_mm().iter().sum();
        assert!((total - layout.usable_width_mm()).abs() < 0.01);
    }

    #[test]
    fn test_conversion() {
        assert!((MM_TO_PT - 2.835).abs() < 0.01);
        assert!((mm_to_pt(10.0) - 28.35).abs() < 0.1);
        assert!((pt_to_mm(mm_to_pt(42.0)) - 42.0).abs() < 0.001);
    }

    #[test]
    fn test_text_width_grows_with_length() {
        assert!(text_width_mm("abcdef", BODY_FONT_SIZE) > text_width_mm("abc", BODY_FONT_SIZE));
        assert_eq!(text_width_mm("", BODY_FONT_SIZE), 0.0);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 100.0, FOOTER_FONT_SIZE), "short");

        let long = "a".repeat(500);
        let cut = truncate_to_width(&long, 50.0, FOOTER_FONT_SIZE);
        assert!(cut.ends_with("..."));
        assert!(text_width_mm(&cut, FOOTER_FONT_SIZE) <= 50.0);

        assert_eq!(truncate_to_width(&long, 0.5, FOOTER_FONT_SIZE), "");
    }
}
