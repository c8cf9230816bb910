//! 小角度线性化的解析解。
//!
//! 在 sin(a) ≈ a、cos(a) ≈ 1 下双摆化为 `M q'' + K q = 0`：
//!
//! ```text
//! M = | (m1+m2) r1^2   m2 r1 r2 |      K = | (m1+m2) g r1      0     |
//!     |  m2 r1 r2      m2 r2^2  |          |      0         m2 g r2  |
//! ```
//!
//! 解是两个简正模的叠加，频率由 det(K - w^2 M) = 0 给出。

use std::f64::consts::TAU;

use crate::physics::simulation::DoublePendulum;

// 一个简正模：频率、模态形状 (a1, a2) 以及 cos / sin 分量的系数
#[derive(Debug, Clone, Copy)]
struct NormalMode {
    omega: f64,
    shape: (f64, f64),
    cos_coeff: f64,
    sin_coeff: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SmallAngleSolution {
    modes: [NormalMode; 2],
}

impl SmallAngleSolution {
    /// 以 `pendulum` 当前的角度和角速度为 t = 0 时刻的初值
    pub fn new(pendulum: &DoublePendulum) -> Self {
        let DoublePendulum { r1, r2, m1, m2, g, .. } = *pendulum;

        let m11 = (m1 + m2) * r1 * r1;
        let m12 = m2 * r1 * r2;
        let m22 = m2 * r2 * r2;
        let k11 = (m1 + m2) * g * r1;
        let k22 = m2 * g * r2;

        // det(K - l M) = a l^2 + b l + c，l = w^2
        let a = m11 * m22 - m12 * m12;
        let b = -(k11 * m22 + k22 * m11);
        let c = k11 * k22;
        let root = (b * b - 4.0 * a * c).sqrt();
        let lambdas = [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)];

        // (K - l M) v = 0 的第一行给出 v = (l m12, k11 - l m11)
        let shapes = lambdas.map(|l| (l * m12, k11 - l * m11));
        let omegas = lambdas.map(f64::sqrt);

        // 把初值分解到两个模态上
        let solve = |x: f64, y: f64| {
            let [(x1, y1), (x2, y2)] = shapes;
            let det = x1 * y2 - x2 * y1;
            [(x * y2 - x2 * y) / det, (x1 * y - x * y1) / det]
        };
        let cos_coeffs = solve(pendulum.a1, pendulum.a2);
        let velocity_coeffs = solve(pendulum.v1, pendulum.v2);

        let mode = |i: usize| NormalMode {
            omega: omegas[i],
            shape: shapes[i],
            cos_coeff: cos_coeffs[i],
            sin_coeff: velocity_coeffs[i] / omegas[i],
        };

        Self { modes: [mode(0), mode(1)] }
    }

    /// t 时刻（单位 tick）的 (a1, a2)
    pub fn angles_at(&self, t: f64) -> (f64, f64) {
        self.modes.iter().fold((0.0, 0.0), |(a1, a2), mode| {
            let phase = mode.omega * t;
            let amplitude = mode.cos_coeff * phase.cos() + mode.sin_coeff * phase.sin();
            (a1 + amplitude * mode.shape.0, a2 + amplitude * mode.shape.1)
        })
    }

    /// (慢模, 快模) 角频率，单位 rad / tick
    pub fn frequencies(&self) -> (f64, f64) {
        (self.modes[0].omega, self.modes[1].omega)
    }

    /// 慢模周期 (tick)
    pub fn slow_period(&self) -> f64 {
        TAU / self.modes[0].omega
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reproduces_initial_conditions() {
        let mut p = DoublePendulum::new(2.0, 2.5, 0.05, 0.05, 0.05, -0.03, 9.8 / 3600.0);
        p.v1 = 0.001;
        p.v2 = -0.002;
        let solution = SmallAngleSolution::new(&p);

        let (a1, a2) = solution.angles_at(0.0);
        assert_relative_eq!(a1, 0.05, epsilon = 1e-12);
        assert_relative_eq!(a2, -0.03, epsilon = 1e-12);

        // 数值微分检查初始角速度
        let h = 1e-4;
        let (b1, b2) = solution.angles_at(h);
        let (c1, c2) = solution.angles_at(-h);
        assert_relative_eq!((b1 - c1) / (2.0 * h), 0.001, epsilon = 1e-8);
        assert_relative_eq!((b2 - c2) / (2.0 * h), -0.002, epsilon = 1e-8);
    }

    #[test]
    fn equal_arms_and_masses_give_known_frequencies() {
        // r1 = r2 = l, m1 = m2：w^2 = (2 ∓ sqrt(2)) g / l
        let p = DoublePendulum::new(1.0, 1.0, 1.0, 1.0, 0.01, 0.0, 1.0);
        let (slow, fast) = SmallAngleSolution::new(&p).frequencies();
        assert_relative_eq!(slow * slow, 2.0 - 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(fast * fast, 2.0 + 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn at_rest_stays_at_rest() {
        let p = DoublePendulum::new(2.0, 2.5, 0.05, 0.05, 0.0, 0.0, 9.8 / 3600.0);
        let solution = SmallAngleSolution::new(&p);
        assert_eq!(solution.angles_at(123.0), (0.0, 0.0));
    }
}
