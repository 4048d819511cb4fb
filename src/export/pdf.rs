use crate::error::{ReportError, Result};
use networking_report_common::export::pdf_core::FontStyle;
use networking_report_common::{DocumentPlan, DrawOp, ReportRecord, Signatory};
use printpdf::*;

/// 罫線の太さ（pt）
const RULE_THICKNESS: f32 = 0.4;

/// WinAnsiEncoding の 0x80..=0x9F に割り当てられた文字
const WIN_ANSI_EXTRA: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•', '–',
    '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// 組み込みフォント（WinAnsiEncoding）で描ける文字か
pub fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRA.contains(&c)
}

/// 組み込みフォントで描けない文字を含むテキストを探す
fn check_encodable(plan: &DocumentPlan) -> Result<()> {
    let texts = plan.pages.iter().flat_map(|page| &page.ops).filter_map(|op| match op {
        DrawOp::Text { text, .. } => Some(text),
        _ => None,
    });
    for text in texts {
        let unsupported: String = text.chars().filter(|c| !is_win_ansi(*c)).collect();
        if !unsupported.is_empty() {
            return Err(ReportError::Export(format!(
                "\"{}\" contains characters the built-in font cannot render: {:?}",
                text, unsupported
            )));
        }
    }
    Ok(())
}

/// 描画計画をPDFに書き出す
pub fn render_plan(plan: &DocumentPlan, record: &ReportRecord, page_width_mm: f32, page_height_mm: f32) -> Result<Vec<u8>> {
    // 描けない文字は黙って落とさずに失敗させる
    check_encodable(plan)?;

    let (doc, page1, layer1) = PdfDocument::new(
        &plan.title,
        Mm(page_width_mm),
        Mm(page_height_mm),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Export(format!("font error: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Export(format!("font error: {:?}", e)))?;

    let customer = signature_xobject(record, Signatory::Customer)?;
    let engineer = signature_xobject(record, Signatory::Engineer)?;

    for (index, page) in plan.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(page_width_mm), Mm(page_height_mm), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };
        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.set_outline_thickness(RULE_THICKNESS);

        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x_mm,
                    y_mm,
                    size_pt,
                    style,
                    text,
                } => {
                    let font = match style {
                        FontStyle::Regular => &regular,
                        FontStyle::Bold => &bold,
                    };
                    layer.use_text(text.as_str(), *size_pt, Mm(*x_mm), Mm(*y_mm), font);
                }
                DrawOp::Line {
                    x1_mm,
                    y1_mm,
                    x2_mm,
                    y2_mm,
                } => draw_line(&layer, *x1_mm, *y1_mm, *x2_mm, *y2_mm),
                DrawOp::Image {
                    signatory,
                    x_mm,
                    y_mm,
                    width_mm,
                    height_mm,
                } => {
                    let xobject = match signatory {
                        Signatory::Customer => &customer,
                        Signatory::Engineer => &engineer,
                    };
                    place_signature(&layer, xobject, *x_mm, *y_mm, *width_mm, *height_mm);
                }
            }
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::Export(format!("PDF save error: {:?}", e)))
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let points = vec![
        (Point::new(Mm(x1), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y2)), false),
    ];
    layer.add_line(Line {
        points,
        is_closed: false,
    });
}

/// 署名PNGを白背景に合成したRGB画像
struct SignatureXObject {
    width_px: u32,
    height_px: u32,
    rgb: Vec<u8>,
}

fn signature_xobject(record: &ReportRecord, signatory: Signatory) -> Result<SignatureXObject> {
    let signature = record.signature(signatory);
    let decoded = ::image::load_from_memory(signature.png_bytes()).map_err(|e| {
        ReportError::Export(format!("{} signature could not be decoded: {}", signatory, e))
    })?;

    let rgba = decoded.to_rgba8();
    let (width_px, height_px) = rgba.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(ReportError::Export(format!("{} signature has no pixels", signatory)));
    }

    let mut rgb = Vec::with_capacity(width_px as usize * height_px as usize * 3);
    for ::image::Rgba([r, g, b, a]) in rgba.pixels() {
        let alpha = *a as f32 / 255.0;
        for channel in [*r, *g, *b] {
            rgb.push((channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
        }
    }

    Ok(SignatureXObject {
        width_px,
        height_px,
        rgb,
    })
}

/// 枠内に縦横比を保って中央配置
fn place_signature(
    layer: &PdfLayerReference,
    xobject: &SignatureXObject,
    x_mm: f32,
    y_mm: f32,
    box_width_mm: f32,
    box_height_mm: f32,
) {
    let aspect = xobject.width_px as f32 / xobject.height_px as f32;
    let (width_mm, height_mm) = if box_width_mm / box_height_mm > aspect {
        (box_height_mm * aspect, box_height_mm)
    } else {
        (box_width_mm, box_width_mm / aspect)
    };
    let x = x_mm + (box_width_mm - width_mm) / 2.0;
    let y = y_mm + (box_height_mm - height_mm) / 2.0;

    let image = Image::from(ImageXObject {
        width: Px(xobject.width_px as usize),
        height: Px(xobject.height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: xobject.rgb.clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    let dpi = xobject.width_px as f32 / (width_mm / 25.4);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi_characters() {
        assert!("Ravi Kumar, 12/B Street".chars().all(is_win_ansi));
        assert!("José Müller – Straße €5".chars().all(is_win_ansi));
        assert!(!is_win_ansi('र'));
        assert!(!is_win_ansi('漢'));
        assert!(!is_win_ansi('\t'));
        // 0x81 は WinAnsi で未定義
        assert!(!is_win_ansi('\u{81}'));
    }
}
