//! 署名入力
//!
//! ポインタイベントから筆跡（ポリライン）を蓄積し、PNG画像に書き出す。
//! 座標はキャンバスのピクセル座標。キャンバスの大きさが変わると筆跡は消える。

mod raster;

use crate::error::{ReportError, Result};
use networking_report_common::SignatureImage;
use serde::{Deserialize, Serialize};

pub use raster::rasterize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 1筆分の点列
pub type Stroke = Vec<Point>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

#[derive(Debug, Clone)]
pub struct SignatureCapture {
    width: u32,
    height: u32,
    pen_width: f32,
    strokes: Vec<Stroke>,
    /// 描画中（Up前）の筆跡
    active: Option<Stroke>,
}

impl SignatureCapture {
    pub const DEFAULT_PEN_WIDTH: f32 = 2.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self::with_pen_width(width, height, Self::DEFAULT_PEN_WIDTH)
    }

    pub fn with_pen_width(width: u32, height: u32, pen_width: f32) -> Self {
        Self {
            width,
            height,
            pen_width,
            strokes: Vec::new(),
            active: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(x, y),
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let point = Point::new(x, y);
        if !point.is_finite() {
            tracing::warn!("署名: 不正な座標を無視 ({}, {})", x, y);
            return;
        }
        // Up が来ないまま次の Down が来たら、それまでの筆跡を確定する
        self.pointer_up();
        self.active = Some(vec![point]);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let point = Point::new(x, y);
        if !point.is_finite() {
            tracing::warn!("署名: 不正な座標を無視 ({}, {})", x, y);
            return;
        }
        if let Some(stroke) = self.active.as_mut() {
            stroke.push(point);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.strokes.push(stroke);
        }
    }

    /// 確定済みの筆跡として追加する（空の点列は無視）
    pub fn add_stroke(&mut self, stroke: Stroke) {
        let stroke: Stroke = stroke.into_iter().filter(Point::is_finite).collect();
        if !stroke.is_empty() {
            self.pointer_up();
            self.strokes.push(stroke);
        }
    }

    /// 描画中の筆跡も含めた全筆跡
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().chain(self.active.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.strokes().all(|stroke| stroke.is_empty())
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    /// キャンバスの大きさ変更。座標系が変わるため筆跡は常に消える
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.is_empty() {
            tracing::debug!(
                "署名: リサイズ {}x{} -> {}x{} で筆跡を破棄",
                self.width,
                self.height,
                width,
                height
            );
        }
        self.width = width;
        self.height = height;
        self.clear();
    }

    pub fn export_image(&self) -> Result<SignatureImage> {
        if self.width == 0 || self.height == 0 {
            return Err(ReportError::ImageLoad(format!(
                "canvas has no area ({}x{})",
                self.width, self.height
            )));
        }
        let strokes: Vec<&Stroke> = self.strokes().collect();
        let png = rasterize(self.width, self.height, self.pen_width, &strokes)?;
        Ok(SignatureImage::new(png, self.width, self.height, self.is_empty()))
    }
}
