use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::basic_structs::Vector2D;
use crate::physics::derivative::AngularState;
use crate::solver::rk4_step;

/// RK4 每次调用固定推进的步长（一个 tick）
pub const TICK: f64 = 1.0;

/// 双摆：两根无质量刚性杆末端各挂一个质点，平面运动，均匀重力场。
///
/// 所有字段都可以在两次步进之间直接修改（参数滑块就是这样做的）。
/// 本结构不校验参数：长度、质量或 g 非正时结果会退化成 inf / NaN。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoublePendulum {
    /// 杆长 (m)
    pub r1: f64,
    pub r2: f64,
    /// 质量 (kg)
    pub m1: f64,
    pub m2: f64,
    /// 角度 (rad)，从竖直向下方向量起，不做取模
    pub a1: f64,
    pub a2: f64,
    /// 角速度 (rad / tick)
    pub v1: f64,
    pub v2: f64,
    /// 重力加速度，已换算到 tick 单位 (m / tick^2)
    pub g: f64,
}

/// 每个 tick 由外部选择的数值积分方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Method {
    #[serde(rename = "forward_euler", alias = "fe")]
    ForwardEuler,
    #[serde(rename = "backward_euler", alias = "be")]
    BackwardEuler,
    #[serde(rename = "rk4")]
    RungeKutta4,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::ForwardEuler, Method::BackwardEuler, Method::RungeKutta4];

    pub fn label(self) -> &'static str {
        match self {
            Method::ForwardEuler => "Forward Euler",
            Method::BackwardEuler => "Backward Euler",
            Method::RungeKutta4 => "RK4",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl DoublePendulum {
    /// 角速度初始化为 0
    pub fn new(r1: f64, r2: f64, m1: f64, m2: f64, a1: f64, a2: f64, g: f64) -> Self {
        Self {
            r1,
            r2,
            m1,
            m2,
            a1,
            a2,
            v1: 0.0,
            v2: 0.0,
            g,
        }
    }

    /// 重新设定几何、质量和角度，角速度清零，g 保持不变
    pub fn reset(&mut self, r1: f64, r2: f64, m1: f64, m2: f64, a1: f64, a2: f64) {
        *self = Self::new(r1, r2, m1, m2, a1, a2, self.g);
    }

    // --- 运动学 ---

    /// 摆锤 1 的直角坐标 (r1*sin(a1), r1*cos(a1))
    pub fn position1(&self) -> Vector2D {
        Vector2D::from_polar(self.r1, self.a1)
    }

    /// 摆锤 2 的坐标相对于摆锤 1
    pub fn position2(&self) -> Vector2D {
        self.position1() + Vector2D::from_polar(self.r2, self.a2)
    }

    // --- 能量 ---

    pub fn kinetic_energy(&self) -> f64 {
        let (r1, r2, m1, m2) = (self.r1, self.r2, self.m1, self.m2);
        let (v1, v2) = (self.v1, self.v2);
        0.5 * m1 * r1 * r1 * v1 * v1
            + 0.5 * m2 * (r1 * r1 * v1 * v1 + r2 * r2 * v2 * v2 + 2.0 * r1 * r2 * v1 * v2 * (self.a1 - self.a2).cos())
    }

    pub fn potential_energy(&self) -> f64 {
        -(self.m1 + self.m2) * self.g * self.r1 * self.a1.cos() - self.m2 * self.g * self.r2 * self.a2.cos()
    }

    /// 动能减势能。
    ///
    /// 注意这不是守恒量；守恒的哈密顿量见 [`DoublePendulum::total_energy`]。
    pub fn mechanical_energy(&self) -> f64 {
        self.kinetic_energy() - self.potential_energy()
    }

    /// 动能加势能，精确解下守恒，用来衡量积分误差
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }

    // --- 状态 ---

    pub fn angular_state(&self) -> AngularState {
        AngularState::new(self.a1, self.a2, self.v1, self.v2)
    }

    pub fn set_angular_state(&mut self, state: AngularState) {
        self.a1 = state.a1;
        self.a2 = state.a2;
        self.v1 = state.v1;
        self.v2 = state.v2;
    }

    /// 一旦出现 inf / NaN，之后的每一步都会保持非有限值
    pub fn is_finite(&self) -> bool {
        self.angular_state().is_finite()
    }

    // --- 数值积分，每次调用推进一个 tick ---

    /// 显式欧拉：先用旧角速度更新角度，再更新角速度
    pub fn step_forward_euler(&mut self) {
        let (acc1, acc2) = self.euler_accelerations();

        self.a1 += self.v1;
        self.a2 += self.v2;

        self.v1 += acc1;
        self.v2 += acc2;
    }

    /// 半隐式（辛）欧拉：先更新角速度，再用新角速度更新角度
    pub fn step_backward_euler(&mut self) {
        let (acc1, acc2) = self.euler_accelerations();

        self.v1 += acc1;
        self.v2 += acc2;

        self.a1 += self.v1;
        self.a2 += self.v2;
    }

    /// 四阶龙格-库塔。
    ///
    /// `_dt` 只为保持接口形状而保留：组合步骤不乘步长，每次调用总是推进一个 tick。
    pub fn step_rk4(&mut self, _dt: f64) {
        let next = rk4_step(&*self, 0.0, &self.angular_state(), TICK);
        self.set_angular_state(next);
    }

    pub fn step(&mut self, method: Method, dt: f64) {
        match method {
            Method::ForwardEuler => self.step_forward_euler(),
            Method::BackwardEuler => self.step_backward_euler(),
            Method::RungeKutta4 => self.step_rk4(dt),
        }
    }
}

// 轨迹中的一帧
#[derive(Debug, Clone, Copy)]
pub struct Stamp {
    pub tick: u64,
    pub state: AngularState,
    pub total_energy: f64,
}

impl Stamp {
    fn of(tick: u64, pendulum: &DoublePendulum) -> Self {
        Self {
            tick,
            state: pendulum.angular_state(),
            total_energy: pendulum.total_energy(),
        }
    }
}

/// 用指定方法推进 `ticks` 步，返回包括初始状态在内的整条轨迹。
///
/// 状态变成非有限值后立即停止记录。
pub fn simulate(pendulum: &mut DoublePendulum, method: Method, ticks: usize) -> Vec<Stamp> {
    let mut trajectory = Vec::with_capacity(ticks + 1);
    trajectory.push(Stamp::of(0, pendulum));

    for tick in 1..=ticks as u64 {
        pendulum.step(method, TICK);

        if !pendulum.is_finite() {
            warn!(%method, tick, "state became non-finite, trajectory truncated");
            break;
        }
        trajectory.push(Stamp::of(tick, pendulum));
    }

    debug!(%method, recorded = trajectory.len(), "simulation finished");
    trajectory
}

/// 从 `initial` 的副本出发推进 `ticks` 步后总能量的绝对变化量
pub fn energy_drift(initial: &DoublePendulum, method: Method, ticks: usize) -> f64 {
    let mut pendulum = *initial;
    let e0 = pendulum.total_energy();
    for _ in 0..ticks {
        pendulum.step(method, TICK);
    }
    (pendulum.total_energy() - e0).abs()
}

/// 轨迹首尾总能量之差的绝对值。
///
/// 轨迹在发散处截断，所以结果总是按最后一个有限状态计算。
pub fn trajectory_drift(trajectory: &[Stamp]) -> f64 {
    match (trajectory.first(), trajectory.last()) {
        (Some(first), Some(last)) => (last.total_energy - first.total_energy).abs(),
        _ => 0.0,
    }
}
