use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::skeleton::{Overlay, JOINT_RADIUS, SKELETON_COLOR};

/// オーバーレイ描画用のオフスクリーンRGBバッファ
pub struct Canvas {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl Canvas {
    /// 黒で初期化したバッファを作成
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffer: vec![0u32; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// バッファを単色で塗りつぶす
    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// ピクセル値を取得（範囲外はNone）
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buffer[y * self.width + x])
    }

    /// オーバーレイを描画（骨格線→関節の順）
    pub fn draw_overlay(&mut self, overlay: &Overlay) {
        for segment in &overlay.segments {
            let (x1, y1) = segment.from;
            let (x2, y2) = segment.to;
            self.draw_line(x1, y1, x2, y2, SKELETON_COLOR);
        }
        for joint in &overlay.joints {
            self.draw_circle(joint.at.0, joint.at.1, JOINT_RADIUS, joint.color);
        }
    }

    /// バッファをPPM (P6) で保存
    pub fn write_ppm<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut data = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        data.reserve(self.buffer.len() * 3);
        for &px in &self.buffer {
            data.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, px as u8]);
        }
        fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 塗りつぶし円を描画
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルを設定（範囲外は無視）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }
}
