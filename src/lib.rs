//! 双摆模拟的数值核心：状态、三种积分方法、能量与参数，以及 TOML 配置。
//!
//! 窗口、绘制和参数面板在 `double-pendulum` 可执行文件里。

pub mod basic_structs;
pub mod config;
pub mod physics;
pub mod solver;

pub use basic_structs::Vector2D;
pub use physics::{DoublePendulum, Method, Parameter, ParameterError};
