use crate::physics::simulation::DoublePendulum;
use crate::solver::{OdeSystem, VectorSpace};

// 一阶系统的状态向量 y = (a1, a2, v1, v2)
// [0]:杆 1 角度
// [1]:杆 2 角度
// [2]:杆 1 角速度
// [3]:杆 2 角速度
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularState {
    pub a1: f64,
    pub a2: f64,
    pub v1: f64,
    pub v2: f64,
}

impl AngularState {
    pub fn new(a1: f64, a2: f64, v1: f64, v2: f64) -> Self {
        Self { a1, a2, v1, v2 }
    }

    pub fn is_finite(&self) -> bool {
        self.a1.is_finite() && self.a2.is_finite() && self.v1.is_finite() && self.v2.is_finite()
    }
}

impl VectorSpace for AngularState {
    fn add(&self, other: &Self) -> Self {
        Self {
            a1: self.a1 + other.a1,
            a2: self.a2 + other.a2,
            v1: self.v1 + other.v1,
            v2: self.v2 + other.v2,
        }
    }

    fn scale(&self, scalar: f64) -> Self {
        Self {
            a1: self.a1 * scalar,
            a2: self.a2 * scalar,
            v1: self.v1 * scalar,
            v2: self.v2 * scalar,
        }
    }
}

/// 拉格朗日方程导出的导数函数，供 RK4 使用。
///
/// 只读取摆的几何、质量和重力；角度与角速度取自参数 `y`，
/// 返回 `(da1/dt, da2/dt, dv1/dt, dv2/dt)`。
impl OdeSystem<AngularState> for DoublePendulum {
    fn derivatives(&self, _t: f64, y: &AngularState) -> AngularState {
        let (r1, r2, m1, m2, g) = (self.r1, self.r2, self.m1, self.m2, self.g);
        let AngularState { a1: t1, a2: t2, v1: w1, v2: w2 } = *y;

        let mass_ratio = m2 / (m1 + m2);
        let delta = t1 - t2;

        // 耦合系数
        let an1 = (r2 / r1) * mass_ratio * delta.cos();
        let an2 = (r1 / r2) * delta.cos();

        // 未耦合的加速度项
        let f1 = -(r2 / r1) * mass_ratio * (w2 * w2) * delta.sin() - (g / r1) * t1.sin();
        let f2 = (r1 / r2) * (w1 * w1) * delta.sin() - (g / r2) * t2.sin();

        // 解 2x2 线性方程组，m1 = 0 且 sin(delta) = 0 时分母为零
        let det = 1.0 - an1 * an2;
        let g1 = (f1 - an1 * f2) / det;
        let g2 = (f2 - an2 * f1) / det;

        AngularState { a1: w1, a2: w2, v1: g1, v2: g2 }
    }
}

// 两种欧拉法共用的闭式角加速度
impl DoublePendulum {
    /// 共用分母中的括号项 `2*m1 + m2 - m2*cos(2*a1 - 2*a2)`。
    ///
    /// 对正质量它不小于 `2*m1`；只有 m1 = 0 且 a1 - a2 为 π 的整数倍时才为零。
    /// 这里不做任何保护，分母为零时加速度为 inf 或 NaN。
    pub fn acceleration_denominator(&self) -> f64 {
        2.0 * self.m1 + self.m2 - self.m2 * (2.0 * self.a1 - 2.0 * self.a2).cos()
    }

    /// 由当前 (a1, a2, v1, v2) 计算 (acc1, acc2)
    pub fn euler_accelerations(&self) -> (f64, f64) {
        let (r1, r2, m1, m2, g) = (self.r1, self.r2, self.m1, self.m2, self.g);
        let (a1, a2, v1, v2) = (self.a1, self.a2, self.v1, self.v2);
        let den = self.acceleration_denominator();

        // acc1
        let num1 = -g * (2.0 * m1 + m2) * a1.sin();
        let num2 = -m2 * g * (a1 - 2.0 * a2).sin();
        let num3 = -2.0 * (a1 - a2).sin() * m2;
        let num4 = v2 * v2 * r2 + v1 * v1 * r1 * (a1 - a2).cos();
        let acc1 = (num1 + num2 + num3 * num4) / (r1 * den);

        // acc2
        let num1 = 2.0 * (a1 - a2).sin();
        let num2 = v1 * v1 * r1 * (m1 + m2);
        let num3 = g * (m1 + m2) * a1.cos();
        let num4 = v2 * v2 * r2 * m2 * (a1 - a2).cos();
        let acc2 = (num1 * (num2 + num3 + num4)) / (r2 * den);

        (acc1, acc2)
    }
}
