// 职责：把应用状态画到屏幕上（双摆、轨迹、信息面板）

use double_pendulum::{DoublePendulum, Vector2D};
use macroquad::prelude::*;

use crate::app::{AppState, PendulumEntry};

const BACKGROUND: Color = BLACK;
const PENDULUM_COLOR: Color = Color::new(0.59, 0.59, 0.59, 1.0);
const TEXT_COLOR: Color = PENDULUM_COLOR;
/// 整个双摆占屏幕短边的 1 / 2.2
const VIEW_MARGIN: f64 = 2.2;

// 底部的按键说明，和 main.rs 的 handle_input 对应
const HELP_LINES: [&str; 2] = [
    "SPACE: Run/Stop | R: Reset | 1/2/3: FE/BE/RK4 | Up/Down: Speed",
    "Tab: Select | N: Add | Delete: Remove | F: Fade trace | V: Show pendulum | P: Panel",
];

/// # 双摆渲染器
///
/// 世界坐标原点为悬挂点，y 轴向下，与屏幕方向一致。
pub struct PendulumRenderer {
    /// 视觉缩放比例 (像素/米)
    scale: f64,
    /// 悬挂点在屏幕上的像素位置
    origin: Vec2,
    // 用于判断是否需要重新计算缩放
    last_screen: (f32, f32),
    last_span: f64,
    fps: FpsMeter,
}

impl PendulumRenderer {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            origin: Vec2::ZERO,
            last_screen: (0.0, 0.0),
            last_span: 0.0,
            fps: FpsMeter::default(),
        }
    }

    /// 窗口大小或杆长变化时重新计算缩放和原点
    pub fn update_view(&mut self, span: f64) {
        let screen = (screen_width(), screen_height());
        if screen == self.last_screen && span == self.last_span {
            return;
        }
        self.last_screen = screen;
        self.last_span = span;

        self.origin = vec2(screen.0 / 2.0, screen.1 / 2.0);
        if span > 0.0 {
            self.scale = screen.0.min(screen.1) as f64 / (VIEW_MARGIN * span);
        }
    }

    pub fn draw(&mut self, app: &AppState) {
        clear_background(BACKGROUND);
        self.fps.update(get_fps());

        for entry in &app.entries {
            self.draw_trace(entry);
        }
        if app.display.show_pendulum {
            for entry in &app.entries {
                self.draw_pendulum(&entry.pendulum);
            }
        }

        self.draw_info_panel(app);
    }

    // --- 核心绘制函数 ---

    fn draw_pendulum(&self, p: &DoublePendulum) {
        if !p.is_finite() {
            return;
        }
        let thickness = 4.0;
        let pivot = self.origin;
        let bob1 = self.world_to_screen(p.position1());
        let bob2 = self.world_to_screen(p.position2());

        // 杆 1
        draw_line(pivot.x, pivot.y, bob1.x, bob1.y, thickness, PENDULUM_COLOR);
        draw_circle(bob1.x, bob1.y, bob_radius(p.m1), PENDULUM_COLOR);
        // 杆 2
        draw_line(bob1.x, bob1.y, bob2.x, bob2.y, thickness, PENDULUM_COLOR);
        draw_circle(bob2.x, bob2.y, bob_radius(p.m2), PENDULUM_COLOR);
    }

    fn draw_trace(&self, entry: &PendulumEntry) {
        if entry.trace.is_empty() {
            return;
        }
        for (a, b) in entry.trace.segments() {
            let p1 = self.world_to_screen(a);
            let p2 = self.world_to_screen(b);
            draw_line(p1.x, p1.y, p2.x, p2.y, 1.3, entry.color);
        }
    }

    /// 左上角的信息面板
    fn draw_info_panel(&self, app: &AppState) {
        let x = 20.0;
        let y = 30.0;
        let line_height = 22.0;
        let font_size = 20.0;

        let mut lines = vec![
            format!("FPS: {}", self.fps.current()),
            format!("Method: {} | Speed: {} tick/frame", app.method, app.speed),
            format!(
                "{} | Pendulums: {}",
                if app.running { "Running" } else { "Stopped" },
                app.entries.len()
            ),
        ];

        if let Some(entry) = app.selected_entry() {
            let p = &entry.pendulum;
            lines.push(format!(
                "Selected: #{}{} | Trace: {} pts",
                app.selected + 1,
                if entry.frozen { " (diverged)" } else { "" },
                entry.trace.len()
            ));
            lines.push(format!("a1, a2: {:.1}, {:.1} deg", p.a1.to_degrees(), p.a2.to_degrees()));
            lines.push(format!("v1, v2: {:.4}, {:.4} rad/tick", p.v1, p.v2));
            lines.push(format!("Kinetic: {:.6e}", p.kinetic_energy()));
            lines.push(format!("Potential: {:.6e}", p.potential_energy()));
            lines.push(format!("K - P: {:.6e}", p.mechanical_energy()));
            lines.push(format!("K + P: {:.6e}", p.total_energy()));
        }

        for (i, line) in lines.iter().enumerate() {
            draw_text(line, x, y + line_height * i as f32, font_size, TEXT_COLOR);
        }

        for (i, line) in HELP_LINES.iter().enumerate() {
            let y = screen_height() - 40.0 + line_height * i as f32;
            draw_text(line, 20.0, y, font_size, GRAY);
        }
    }

    // --- 坐标 ---

    /// 坐标转换: 物理世界 (m) -> 屏幕 (px)
    fn world_to_screen(&self, world_pos: Vector2D) -> Vec2 {
        vec2(
            self.origin.x + (world_pos.x * self.scale) as f32,
            self.origin.y + (world_pos.y * self.scale) as f32,
        )
    }
}

// 摆锤半径随质量对数增长（像素）
fn bob_radius(mass_kg: f64) -> f32 {
    let grams = (mass_kg * 1000.0).max(0.0);
    ((grams + 1.0).ln() * 1.5).max(4.0) as f32
}

/// 每 10 帧取一次平均 FPS
#[derive(Default)]
struct FpsMeter {
    accumulator: i32,
    frames: u32,
    current: i32,
}

impl FpsMeter {
    const WINDOW: u32 = 10;

    fn update(&mut self, fps: i32) {
        self.accumulator += fps;
        self.frames += 1;
        if self.frames == Self::WINDOW {
            self.current = (self.accumulator as f32 / Self::WINDOW as f32).round() as i32;
            self.accumulator = 0;
            self.frames = 0;
        }
    }

    fn current(&self) -> i32 {
        self.current
    }
}
