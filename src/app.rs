// 应用状态：所有双摆、运行开关、速度和积分方法都放在这里，由主循环显式传递

use std::collections::VecDeque;

use double_pendulum::config::{DisplayParams, PendulumParams, SimulationParams};
use double_pendulum::physics::TICK;
use double_pendulum::{DoublePendulum, Method, Parameter, ParameterError, Vector2D};
use macroquad::color::{Color, hsl_to_rgb};
use tracing::{info, warn};

/// 每条轨迹最多保留的点数（不淡出时）
pub const MAX_TRACE_POINTS: usize = 20_000;
pub const MAX_SPEED: u32 = 256;

// 新增双摆时给 a1 的扰动（度）
const NUDGE_DEG: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct TracePoint {
    position: Vector2D,
    time: f64,
}

/// 摆锤 2 走过的轨迹（世界坐标）
#[derive(Debug, Default)]
pub struct Trace {
    points: VecDeque<TracePoint>,
}

impl Trace {
    pub fn push(&mut self, position: Vector2D, time: f64) {
        if !position.is_finite() {
            return;
        }
        self.points.push_back(TracePoint { position, time });
        while self.points.len() > MAX_TRACE_POINTS {
            self.points.pop_front();
        }
    }

    /// 丢掉早于 `now - lifetime` 的点
    pub fn fade(&mut self, now: f64, lifetime: f64) {
        while let Some(front) = self.points.front() {
            if front.time >= now - lifetime {
                break;
            }
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vector2D, Vector2D)> + '_ {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|(a, b)| (a.position, b.position))
    }
}

pub struct PendulumEntry {
    pub pendulum: DoublePendulum,
    /// R 键恢复到这里
    pub initial: PendulumParams,
    pub color: Color,
    pub trace: Trace,
    /// 状态出现 inf / NaN 后停止推进，直到重置
    pub frozen: bool,
}

impl PendulumEntry {
    fn new(pendulum: DoublePendulum, initial: PendulumParams, index: usize) -> Self {
        Self {
            pendulum,
            initial,
            color: trace_color(index),
            trace: Trace::default(),
            frozen: false,
        }
    }

    fn reset(&mut self) {
        self.initial.reset(&mut self.pendulum);
        self.trace.clear();
        self.frozen = false;
    }
}

// 第一条轨迹沿用 hsl(160, 100%, 50%)，之后按黄金角错开色相
fn trace_color(index: usize) -> Color {
    let hue = (160.0 / 360.0 + index as f32 * 0.618_034).fract();
    hsl_to_rgb(hue, 1.0, 0.5)
}

pub struct AppState {
    pub entries: Vec<PendulumEntry>,
    pub selected: usize,
    pub method: Method,
    pub speed: u32,
    pub running: bool,
    pub display: DisplayParams,
    /// 新增双摆使用的 g (m/tick^2)
    pub g: f64,
}

impl AppState {
    pub fn new(params: &SimulationParams) -> Self {
        let entries = params
            .pendulums
            .iter()
            .enumerate()
            .map(|(i, initial)| PendulumEntry::new(initial.build(params.g()), *initial, i))
            .collect();

        Self {
            entries,
            selected: 0,
            method: params.method,
            speed: params.speed.clamp(1, MAX_SPEED),
            running: false,
            display: params.display,
            g: params.g(),
        }
    }

    pub fn selected_entry(&self) -> Option<&PendulumEntry> {
        self.entries.get(self.selected)
    }

    /// 推进一帧：每个双摆走 `speed` 个 tick，并记录轨迹
    pub fn advance(&mut self, now: f64) {
        if self.running {
            for (index, entry) in self.entries.iter_mut().enumerate() {
                if entry.frozen {
                    continue;
                }
                for _ in 0..self.speed {
                    entry.pendulum.step(self.method, TICK);
                    if !entry.pendulum.is_finite() {
                        entry.frozen = true;
                        warn!(pendulum = index + 1, method = %self.method, "state became non-finite, pendulum frozen until reset");
                        break;
                    }
                    entry.trace.push(entry.pendulum.position2(), now);
                }
            }
        }

        if self.display.fade_trace {
            let lifetime = self.display.fade_ms / 1000.0 / self.speed as f64;
            for entry in &mut self.entries {
                entry.trace.fade(now, lifetime);
            }
        }
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
        info!(running = self.running, "simulation toggled");
    }

    pub fn set_method(&mut self, method: Method) {
        if self.method != method {
            self.method = method;
            info!(%method, "integration method changed");
        }
    }

    pub fn faster(&mut self) {
        self.speed = (self.speed * 2).min(MAX_SPEED);
    }

    pub fn slower(&mut self) {
        self.speed = (self.speed / 2).max(1);
    }

    pub fn reset_all(&mut self) {
        for entry in &mut self.entries {
            entry.reset();
        }
        info!(count = self.entries.len(), "pendulums reset");
    }

    pub fn cycle_selection(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    /// 复制当前选中的双摆，a1 加一点扰动
    pub fn add_pendulum(&mut self) {
        let Some(source) = self.selected_entry() else {
            return;
        };
        let nudge = NUDGE_DEG.to_radians();

        let mut pendulum = source.pendulum;
        pendulum.a1 += nudge;
        let mut initial = source.initial;
        initial.a1 += nudge;

        let index = self.entries.len();
        let mut entry = PendulumEntry::new(pendulum, initial, index);
        entry.frozen = !pendulum.is_finite();
        self.entries.push(entry);
        self.selected = index;
        info!(count = self.entries.len(), "pendulum added");
    }

    /// 至少保留一个双摆
    pub fn remove_selected(&mut self) {
        if self.entries.len() <= 1 {
            warn!("cannot remove the last pendulum");
            return;
        }
        self.entries.remove(self.selected);
        if self.selected >= self.entries.len() {
            self.selected = self.entries.len() - 1;
        }
        info!(count = self.entries.len(), "pendulum removed");
    }

    /// 通过参数面板修改选中的双摆。`display_value` 为界面单位
    pub fn edit_selected(&mut self, parameter: Parameter, display_value: f64) -> Result<(), ParameterError> {
        let value = parameter.validate(parameter.from_display(display_value))?;
        if let Some(entry) = self.entries.get_mut(self.selected) {
            entry.pendulum.set_parameter(parameter, value);
            entry.frozen = !entry.pendulum.is_finite();
        }
        Ok(())
    }

    /// 所有双摆中 r1 + r2 的最大值，用于计算缩放比例
    pub fn max_span(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.pendulum.r1 + e.pendulum.r2)
            .filter(|span| span.is_finite() && *span > 0.0)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(&SimulationParams::default())
    }

    fn running_state() -> AppState {
        let mut app = state();
        app.toggle_running();
        app
    }

    #[test]
    fn advance_steps_speed_ticks_per_frame() {
        let mut app = running_state();
        app.speed = 4;
        let mut expected = app.entries[0].pendulum;
        for _ in 0..4 {
            expected.step(app.method, TICK);
        }

        app.advance(0.0);
        assert_eq!(app.entries[0].pendulum, expected);
        assert_eq!(app.entries[0].trace.len(), 4);
    }

    #[test]
    fn app_starts_stopped_and_does_not_move() {
        let mut app = state();
        assert!(!app.running);
        let before = app.entries[0].pendulum;
        app.advance(1.0);
        assert_eq!(app.entries[0].pendulum, before);
        assert!(app.entries[0].trace.is_empty());
    }

    #[test]
    fn fading_drops_old_points() {
        let mut app = running_state();
        app.display.fade_trace = true;
        app.display.fade_ms = 500.0;
        app.advance(0.0);
        app.advance(0.2);
        assert_eq!(app.entries[0].trace.len(), 2);
        app.advance(0.6);
        // t = 0 的点已超过 0.5 s
        assert_eq!(app.entries[0].trace.len(), 2);
    }

    #[test]
    fn non_finite_pendulum_is_frozen_and_reset_revives_it() {
        let mut app = running_state();
        app.entries[0].pendulum.v1 = f64::NAN;
        app.advance(0.0);
        assert!(app.entries[0].frozen);

        app.reset_all();
        assert!(!app.entries[0].frozen);
        assert!(app.entries[0].pendulum.is_finite());
        assert_eq!(app.entries[0].pendulum.v1, 0.0);
    }

    #[test]
    fn add_and_remove_pendulums() {
        let mut app = state();
        app.add_pendulum();
        assert_eq!(app.entries.len(), 2);
        assert_eq!(app.selected, 1);
        let delta = app.entries[1].pendulum.a1 - app.entries[0].pendulum.a1;
        assert!((delta - NUDGE_DEG.to_radians()).abs() < 1e-12);

        app.remove_selected();
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.selected, 0);
        app.remove_selected();
        assert_eq!(app.entries.len(), 1);
    }

    #[test]
    fn editing_converts_units_and_validates() {
        let mut app = state();
        app.edit_selected(Parameter::M1, 250.0).unwrap();
        assert!((app.entries[0].pendulum.m1 - 0.25).abs() < 1e-15);

        app.edit_selected(Parameter::A2, 90.0).unwrap();
        assert!((app.entries[0].pendulum.a2 - std::f64::consts::FRAC_PI_2).abs() < 1e-15);

        assert!(app.edit_selected(Parameter::R2, 0.0).is_err());
        assert_eq!(app.entries[0].pendulum.r2, 2.5);
    }

    #[test]
    fn speed_is_clamped() {
        let mut app = state();
        app.slower();
        assert_eq!(app.speed, 1);
        for _ in 0..20 {
            app.faster();
        }
        assert_eq!(app.speed, MAX_SPEED);
    }

    #[test]
    fn span_uses_longest_pendulum() {
        let mut app = state();
        app.add_pendulum();
        app.entries[1].pendulum.r2 = 4.0;
        assert_eq!(app.max_span(), 6.0);
    }
}
