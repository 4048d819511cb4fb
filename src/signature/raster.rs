//! 筆跡のラスタ化（透明背景・黒ペン・丸い線端）

use super::{Point, Stroke};
use crate::error::{ReportError, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// 円を打つ間隔（ペン半径に対する比）
const STAMP_SPACING: f32 = 0.25;

/// 筆跡をPNGにする
pub fn rasterize(width: u32, height: u32, pen_width: f32, strokes: &[&Stroke]) -> Result<Vec<u8>> {
    let mut canvas = RgbaImage::new(width, height);
    let radius = (pen_width / 2.0).max(0.5);

    for stroke in strokes {
        match stroke.as_slice() {
            [] => {}
            [only] => stamp(&mut canvas, *only, radius),
            points => {
                for segment in points.windows(2) {
                    draw_segment(&mut canvas, segment[0], segment[1], radius);
                }
            }
        }
    }

    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ReportError::ImageLoad(format!("PNG encode failed: {}", e)))?;
    Ok(png)
}

fn draw_segment(canvas: &mut RgbaImage, from: Point, to: Point, radius: f32) {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    let steps = ((length / (radius * STAMP_SPACING)).ceil() as usize).max(1);

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp(canvas, Point::new(from.x + dx * t, from.y + dy * t), radius);
    }
}

/// 円を塗る。キャンバス外は切り捨て
fn stamp(canvas: &mut RgbaImage, center: Point, radius: f32) {
    let (width, height) = canvas.dimensions();
    let min_x = (center.x - radius).floor().max(0.0);
    let min_y = (center.y - radius).floor().max(0.0);
    let max_x = (center.x + radius).ceil().min(width as f32 - 1.0);
    let max_y = (center.y + radius).ceil().min(height as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    let r2 = radius * radius;
    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let px = x as f32 + 0.5 - center.x;
            let py = y as f32 + 0.5 - center.y;
            if px * px + py * py <= r2 {
                canvas.put_pixel(x, y, INK);
            }
        }
    }
}
