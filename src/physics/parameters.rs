use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

use crate::physics::simulation::DoublePendulum;

/// 可由界面修改的物理参数。
///
/// 界面和配置都用这个枚举定位字段，不再按字段名字符串查找。
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Parameter {
    R1,
    R2,
    M1,
    M2,
    A1,
    A2,
    V1,
    V2,
    G,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("{parameter} must be a finite number, got {value}")]
    NotFinite { parameter: Parameter, value: f64 },

    #[error("{parameter} must be positive, got {value}")]
    NotPositive { parameter: Parameter, value: f64 },

    #[error("unknown parameter `{0}`")]
    Unknown(String),
}

impl Parameter {
    pub const ALL: [Parameter; 9] = [
        Parameter::R1,
        Parameter::R2,
        Parameter::M1,
        Parameter::M2,
        Parameter::A1,
        Parameter::A2,
        Parameter::V1,
        Parameter::V2,
        Parameter::G,
    ];

    /// 参数面板上有滑块的参数
    pub const EDITABLE: [Parameter; 6] = [
        Parameter::R1,
        Parameter::R2,
        Parameter::M1,
        Parameter::M2,
        Parameter::A1,
        Parameter::A2,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Parameter::R1 => "r1",
            Parameter::R2 => "r2",
            Parameter::M1 => "m1",
            Parameter::M2 => "m2",
            Parameter::A1 => "a1",
            Parameter::A2 => "a2",
            Parameter::V1 => "v1",
            Parameter::V2 => "v2",
            Parameter::G => "g",
        }
    }

    /// 带显示单位的标签
    pub fn label(self) -> &'static str {
        match self {
            Parameter::R1 => "Length 1 (m)",
            Parameter::R2 => "Length 2 (m)",
            Parameter::M1 => "Mass 1 (g)",
            Parameter::M2 => "Mass 2 (g)",
            Parameter::A1 => "Angle 1 (deg)",
            Parameter::A2 => "Angle 2 (deg)",
            Parameter::V1 => "Velocity 1 (rad/tick)",
            Parameter::V2 => "Velocity 2 (rad/tick)",
            Parameter::G => "Gravity (m/tick^2)",
        }
    }

    // 只有长度、质量和重力要求为正
    fn must_be_positive(self) -> bool {
        matches!(self, Parameter::R1 | Parameter::R2 | Parameter::M1 | Parameter::M2 | Parameter::G)
    }

    // --- 单位换算：界面用角度制和克，内部用弧度和千克 ---

    pub fn to_display(self, value: f64) -> f64 {
        match self {
            Parameter::A1 | Parameter::A2 => value.to_degrees(),
            Parameter::M1 | Parameter::M2 => value * 1000.0,
            _ => value,
        }
    }

    pub fn from_display(self, value: f64) -> f64 {
        match self {
            Parameter::A1 | Parameter::A2 => value.to_radians(),
            Parameter::M1 | Parameter::M2 => value / 1000.0,
            _ => value,
        }
    }

    /// 滑块范围（显示单位）
    pub fn slider_range(self) -> RangeInclusive<f64> {
        match self {
            Parameter::R1 | Parameter::R2 => 0.1..=5.0,
            Parameter::M1 | Parameter::M2 => 1.0..=1000.0,
            Parameter::A1 | Parameter::A2 => -180.0..=180.0,
            Parameter::V1 | Parameter::V2 => -0.5..=0.5,
            Parameter::G => 1e-4..=1e-2,
        }
    }

    /// 校验一个物理单位下的取值。积分器本身从不调用这里
    pub fn validate(self, value: f64) -> Result<f64, ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NotFinite { parameter: self, value });
        }
        if self.must_be_positive() && value <= 0.0 {
            return Err(ParameterError::NotPositive { parameter: self, value });
        }
        Ok(value)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Parameter {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| ParameterError::Unknown(s.to_string()))
    }
}

impl DoublePendulum {
    pub fn parameter(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::R1 => self.r1,
            Parameter::R2 => self.r2,
            Parameter::M1 => self.m1,
            Parameter::M2 => self.m2,
            Parameter::A1 => self.a1,
            Parameter::A2 => self.a2,
            Parameter::V1 => self.v1,
            Parameter::V2 => self.v2,
            Parameter::G => self.g,
        }
    }

    /// 直接赋值，不校验。需要校验时先调用 [`Parameter::validate`]
    pub fn set_parameter(&mut self, parameter: Parameter, value: f64) {
        let field = match parameter {
            Parameter::R1 => &mut self.r1,
            Parameter::R2 => &mut self.r2,
            Parameter::M1 => &mut self.m1,
            Parameter::M2 => &mut self.m2,
            Parameter::A1 => &mut self.a1,
            Parameter::A2 => &mut self.a2,
            Parameter::V1 => &mut self.v1,
            Parameter::V2 => &mut self.v2,
            Parameter::G => &mut self.g,
        };
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn keys_round_trip_through_from_str() {
        for p in Parameter::ALL {
            assert_eq!(p.key().parse::<Parameter>(), Ok(p));
        }
        assert_eq!(
            "x1".parse::<Parameter>(),
            Err(ParameterError::Unknown("x1".to_string()))
        );
    }

    #[test]
    fn set_then_get_each_parameter() {
        let mut pendulum = DoublePendulum::new(1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0);
        for (i, p) in Parameter::ALL.into_iter().enumerate() {
            pendulum.set_parameter(p, 10.0 + i as f64);
        }
        for (i, p) in Parameter::ALL.into_iter().enumerate() {
            assert_eq!(pendulum.parameter(p), 10.0 + i as f64);
        }
        assert_eq!(pendulum.r1, 10.0);
        assert_eq!(pendulum.g, 18.0);
    }

    #[test]
    fn display_units() {
        assert_relative_eq!(Parameter::A1.to_display(std::f64::consts::PI), 180.0);
        assert_relative_eq!(Parameter::A2.from_display(-130.0), -130f64.to_radians());
        assert_relative_eq!(Parameter::M1.to_display(0.05), 50.0);
        assert_relative_eq!(Parameter::M2.from_display(50.0), 0.05);
        assert_eq!(Parameter::R1.to_display(2.5), 2.5);
    }

    #[test]
    fn validation_rejects_non_positive_lengths_and_masses() {
        assert_eq!(
            Parameter::R1.validate(0.0),
            Err(ParameterError::NotPositive { parameter: Parameter::R1, value: 0.0 })
        );
        assert!(Parameter::M2.validate(-0.01).is_err());
        assert!(Parameter::G.validate(0.0).is_err());
        assert!(Parameter::A1.validate(f64::NAN).is_err());
        // 角度和角速度可以为负
        assert_eq!(Parameter::A1.validate(-2.0), Ok(-2.0));
        assert_eq!(Parameter::V2.validate(-0.3), Ok(-0.3));
    }

    #[test]
    fn error_messages_name_the_parameter() {
        let err = Parameter::M1.validate(-1.0).unwrap_err();
        assert_eq!(err.to_string(), "m1 must be positive, got -1");
    }
}
