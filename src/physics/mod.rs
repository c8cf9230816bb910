pub mod derivative;
pub mod parameters;
pub mod simulation;
pub mod small_angle;

pub use derivative::AngularState;
pub use parameters::{Parameter, ParameterError};
pub use simulation::{DoublePendulum, Method, Stamp, TICK, energy_drift, simulate, trajectory_drift};
pub use small_angle::SmallAngleSolution;
