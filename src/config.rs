use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::physics::{DoublePendulum, Method, Parameter};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigRoot {
    #[serde(default)]
    simulation: SimulationSection,
    #[serde(default)]
    display: DisplaySection,
    #[serde(default = "default_pendulums")]
    pendulums: Vec<PendulumSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SimulationSection {
    #[serde(default = "default_method")]
    method: Method,
    #[serde(default = "default_speed")]
    speed: u32,
    #[serde(default = "default_gravity")]
    gravity: f64,
    #[serde(default = "default_ticks_per_second")]
    ticks_per_second: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            method: default_method(),
            speed: default_speed(),
            gravity: default_gravity(),
            ticks_per_second: default_ticks_per_second(),
        }
    }
}

fn default_method() -> Method {
    Method::RungeKutta4
}

fn default_speed() -> u32 {
    1
}

fn default_gravity() -> f64 {
    9.8
}

fn default_ticks_per_second() -> f64 {
    60.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplaySection {
    #[serde(default = "default_true")]
    show_pendulum: bool,
    #[serde(default)]
    fade_trace: bool,
    #[serde(default = "default_fade_ms")]
    fade_ms: f64,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            show_pendulum: true,
            fade_trace: false,
            fade_ms: default_fade_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fade_ms() -> f64 {
    500.0
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct PendulumSection {
    r1: f64,
    r2: f64,
    m1: f64,
    m2: f64,
    a1_deg: f64,
    a2_deg: f64,
}

fn default_pendulums() -> Vec<PendulumSection> {
    vec![PendulumSection {
        r1: 2.0,
        r2: 2.5,
        m1: 0.05,
        m2: 0.05,
        a1_deg: 130.0,
        a2_deg: -130.0,
    }]
}

#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub method: Method,
    /// 每帧推进的 tick 数
    pub speed: u32,
    /// 重力加速度 (m/s^2)
    pub gravity: f64,
    pub ticks_per_second: f64,
    pub display: DisplayParams,
    pub pendulums: Vec<PendulumParams>,
}

#[derive(Debug, Clone, Copy)]
pub struct DisplayParams {
    pub show_pendulum: bool,
    pub fade_trace: bool,
    pub fade_ms: f64,
}

/// 单个双摆的初始参数，物理单位（m, kg, rad）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumParams {
    pub r1: f64,
    pub r2: f64,
    pub m1: f64,
    pub m2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl SimulationParams {
    /// 换算到 tick 单位的重力加速度: gravity / ticks_per_second^2
    pub fn g(&self) -> f64 {
        self.gravity / (self.ticks_per_second * self.ticks_per_second)
    }

    pub fn build_pendulums(&self) -> Vec<DoublePendulum> {
        let g = self.g();
        self.pendulums.iter().map(|p| p.build(g)).collect()
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            method: default_method(),
            speed: default_speed(),
            gravity: default_gravity(),
            ticks_per_second: default_ticks_per_second(),
            display: DisplayParams {
                show_pendulum: true,
                fade_trace: false,
                fade_ms: default_fade_ms(),
            },
            pendulums: vec![PendulumParams {
                r1: 2.0,
                r2: 2.5,
                m1: 0.05,
                m2: 0.05,
                a1: 130f64.to_radians(),
                a2: (-130f64).to_radians(),
            }],
        }
    }
}

impl PendulumParams {
    pub fn build(&self, g: f64) -> DoublePendulum {
        DoublePendulum::new(self.r1, self.r2, self.m1, self.m2, self.a1, self.a2, g)
    }

    /// 恢复到这组初始参数，g 不变
    pub fn reset(&self, pendulum: &mut DoublePendulum) {
        pendulum.reset(self.r1, self.r2, self.m1, self.m2, self.a1, self.a2);
    }
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<SimulationParams> {
    let raw = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

    load_from_str(&raw)
}

pub fn load_from_str(raw: &str) -> Result<SimulationParams> {
    let parsed: ConfigRoot = toml::from_str(raw).context("Failed to parse simulation configuration")?;
    from_root(parsed)
}

fn from_root(root: ConfigRoot) -> Result<SimulationParams> {
    let simulation = &root.simulation;

    if !simulation.gravity.is_finite() || simulation.gravity <= 0.0 {
        return Err(anyhow!("Gravity must be positive"));
    }

    if !simulation.ticks_per_second.is_finite() || simulation.ticks_per_second <= 0.0 {
        return Err(anyhow!("Ticks per second must be positive"));
    }

    if simulation.speed == 0 {
        return Err(anyhow!("Speed must be at least one tick per frame"));
    }

    if !root.display.fade_ms.is_finite() || root.display.fade_ms <= 0.0 {
        return Err(anyhow!("Trace fade time must be positive"));
    }

    if root.pendulums.is_empty() {
        return Err(anyhow!("At least one [[pendulums]] entry is required"));
    }

    let pendulums = root
        .pendulums
        .iter()
        .enumerate()
        .map(|(index, section)| {
            load_pendulum(section).with_context(|| format!("Invalid pendulum #{}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SimulationParams {
        method: simulation.method,
        speed: simulation.speed,
        gravity: simulation.gravity,
        ticks_per_second: simulation.ticks_per_second,
        display: DisplayParams {
            show_pendulum: root.display.show_pendulum,
            fade_trace: root.display.fade_trace,
            fade_ms: root.display.fade_ms,
        },
        pendulums,
    })
}

fn load_pendulum(section: &PendulumSection) -> Result<PendulumParams> {
    Ok(PendulumParams {
        r1: Parameter::R1.validate(section.r1)?,
        r2: Parameter::R2.validate(section.r2)?,
        m1: Parameter::M1.validate(section.m1)?,
        m2: Parameter::M2.validate(section.m2)?,
        a1: Parameter::A1.validate(section.a1_deg.to_radians())?,
        a2: Parameter::A2.validate(section.a2_deg.to_radians())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_config_uses_builtin_defaults() {
        let params = load_from_str("").unwrap();
        assert_eq!(params.method, Method::RungeKutta4);
        assert_eq!(params.speed, 1);
        assert_relative_eq!(params.g(), 9.8 / 3600.0);
        assert_eq!(params.pendulums.len(), 1);

        let p = params.pendulums[0];
        assert_eq!((p.r1, p.r2, p.m1, p.m2), (2.0, 2.5, 0.05, 0.05));
        assert_relative_eq!(p.a1, 130f64.to_radians());
        assert_relative_eq!(p.a2, -130f64.to_radians());
    }

    #[test]
    fn parses_several_pendulums() {
        let raw = r#"
            [simulation]
            method = "be"
            speed = 4
            gravity = 9.81
            ticks_per_second = 120.0

            [display]
            fade_trace = true

            [[pendulums]]
            r1 = 1.0
            r2 = 1.0
            m1 = 0.1
            m2 = 0.2
            a1_deg = 90.0
            a2_deg = 0.0

            [[pendulums]]
            r1 = 1.5
            r2 = 0.5
            m1 = 0.01
            m2 = 0.01
            a1_deg = -45.0
            a2_deg = 170.0
        "#;
        let params = load_from_str(raw).unwrap();
        assert_eq!(params.method, Method::BackwardEuler);
        assert_eq!(params.speed, 4);
        assert!(params.display.fade_trace);
        assert!(params.display.show_pendulum);
        assert_relative_eq!(params.g(), 9.81 / 14400.0);

        let pendulums = params.build_pendulums();
        assert_eq!(pendulums.len(), 2);
        assert_relative_eq!(pendulums[1].a1, -std::f64::consts::FRAC_PI_4);
        assert_eq!(pendulums[1].g, params.g());
        assert_eq!((pendulums[1].v1, pendulums[1].v2), (0.0, 0.0));
    }

    #[test]
    fn rejects_non_positive_mass_with_pendulum_index() {
        let raw = r#"
            [[pendulums]]
            r1 = 1.0
            r2 = 1.0
            m1 = 0.1
            m2 = 0.1
            a1_deg = 10.0
            a2_deg = 0.0

            [[pendulums]]
            r1 = 1.0
            r2 = 1.0
            m1 = 0.0
            m2 = 0.1
            a1_deg = 10.0
            a2_deg = 0.0
        "#;
        let err = load_from_str(raw).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("pendulum #2"), "{message}");
        assert!(message.contains("m1 must be positive"), "{message}");
    }

    #[test]
    fn rejects_zero_speed_and_unknown_method() {
        assert!(load_from_str("[simulation]\nspeed = 0").is_err());
        assert!(load_from_str("[simulation]\nmethod = \"verlet\"").is_err());
        assert!(load_from_str("pendulums = []").is_err());
    }

    #[test]
    fn reset_restores_initial_parameters_and_keeps_g() {
        let params = SimulationParams::default();
        let initial = params.pendulums[0];
        let mut pendulum = initial.build(params.g());
        pendulum.g = 0.5;
        pendulum.r1 = 3.0;
        for _ in 0..10 {
            pendulum.step_backward_euler();
        }

        initial.reset(&mut pendulum);
        assert_eq!(pendulum.r1, initial.r1);
        assert_eq!(pendulum.a1, initial.a1);
        assert_eq!((pendulum.v1, pendulum.v2), (0.0, 0.0));
        assert_eq!(pendulum.g, 0.5);
    }
}
