use crate::error::IsingError;
use crate::lattice::K_BOLTZMANN;
use crate::monte_carlo::{SweepSettings, TrajectorySettings};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 2D Ising model with single-spin-flip Metropolis updates.
#[derive(Debug, Parser)]
#[command(name = "ising_metropolis", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory the CSV outputs are written to
    #[arg(long, global = true, default_value = "figures")]
    pub output_dir: PathBuf,

    /// Seed of the random number generator; drawn at random when omitted
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record magnetisation and energy while a random lattice thermalizes
    Thermalize(ThermalizeArgs),
    /// Burn in one lattice per temperature and export the final spin configurations
    Snapshots(SnapshotArgs),
}

#[derive(Debug, Args)]
pub struct ThermalizeArgs {
    /// Side length L of the lattice
    #[arg(long, default_value_t = 30)]
    pub lattice_size: usize,

    /// Temperature T
    #[arg(long, conflicts_with = "beta", allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    /// Inverse temperature, 1 if neither this nor the temperature is given
    #[arg(long, allow_negative_numbers = true)]
    pub beta: Option<f64>,

    /// Number of entries in the recorded time series
    #[arg(long, default_value_t = 100_000)]
    pub steps: usize,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Side length L of the lattice
    #[arg(long, default_value_t = 50)]
    pub lattice_size: usize,

    /// Temperatures to equilibrate at
    #[arg(long, value_delimiter = ',', default_values_t = [1.0, 2.27, 3.5])]
    pub temperatures: Vec<f64>,

    /// Metropolis steps discarded before the snapshot is taken
    #[arg(long, default_value_t = 50_000)]
    pub burn_in: usize,

    /// Run the temperatures one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,
}

fn check_lattice_size(lattice_size: usize) -> Result<(), IsingError> {
    if lattice_size == 0 {
        return Err(IsingError::InvalidParameter {
            name: "lattice_size",
            reason: String::from("must be at least 1"),
        });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<f64, IsingError> {
    if !(value.is_finite() && value > 0.) {
        return Err(IsingError::InvalidParameter {
            name,
            reason: format!("must be finite and positive, got {value}"),
        });
    }
    Ok(value)
}

impl ThermalizeArgs {
    pub fn resolve_beta(&self) -> Result<f64, IsingError> {
        match (self.temperature, self.beta) {
            (Some(temperature), _) => {
                Ok(1. / (K_BOLTZMANN * check_positive("temperature", temperature)?))
            }
            (None, Some(beta)) => check_positive("beta", beta),
            (None, None) => Ok(1.),
        }
    }

    pub fn to_settings(&self, seed: u64) -> Result<TrajectorySettings, IsingError> {
        check_lattice_size(self.lattice_size)?;
        Ok(TrajectorySettings::new(
            self.lattice_size,
            self.resolve_beta()?,
            self.steps,
            seed,
        ))
    }
}

impl SnapshotArgs {
    pub fn to_settings(&self, seed: u64) -> Result<SweepSettings, IsingError> {
        check_lattice_size(self.lattice_size)?;
        for temperature in &self.temperatures {
            check_positive("temperatures", *temperature)?;
        }
        Ok(SweepSettings::new(
            self.lattice_size,
            self.burn_in,
            seed,
            self.sequential,
        ))
    }
}
