pub mod metropolis;
pub mod sweep;
pub mod thermalization;

pub use metropolis::{attempt_flip, metropolis_step, AcceptanceTable, StepDelta};
pub use sweep::{
    temperature_sweep, thermalization_trajectory, EquilibriumSnapshot, SweepSettings, Trajectory,
    TrajectorySettings,
};
pub use thermalization::{
    run_thermalization, SeriesRecording, ThermalizationResult, ThermalizationSettings, TimeSeries,
};
