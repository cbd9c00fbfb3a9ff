use super::metropolis::AcceptanceTable;
use super::thermalization::{
    run_thermalization, SeriesRecording, ThermalizationSettings, TimeSeries,
};
use crate::error::IsingError;
use crate::lattice::SquareLattice;
use log::info;
use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    lattice_size: usize,
    burn_in_steps: usize,
    base_seed: u64,
    sequential: bool,
}

impl SweepSettings {
    pub fn new(lattice_size: usize, burn_in_steps: usize, base_seed: u64, sequential: bool) -> Self {
        SweepSettings {
            lattice_size,
            burn_in_steps,
            base_seed,
            sequential,
        }
    }

    pub fn get_lattice_size(&self) -> usize {
        self.lattice_size
    }

    pub fn get_burn_in_steps(&self) -> usize {
        self.burn_in_steps
    }

    pub fn get_base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Seed of the chain at position `chain_idx` in the temperature list.
    pub fn chain_seed(&self, chain_idx: usize) -> u64 {
        self.base_seed.wrapping_add(chain_idx as u64)
    }
}

/// Lattice left behind by a burn-in run at one temperature.
#[derive(Debug, Clone)]
pub struct EquilibriumSnapshot {
    temperature: f64,
    beta: f64,
    lattice: SquareLattice,
    acceptance_rate: f64,
}

impl EquilibriumSnapshot {
    pub fn get_temperature(&self) -> f64 {
        self.temperature
    }

    pub fn get_beta(&self) -> f64 {
        self.beta
    }

    pub fn get_lattice(&self) -> &SquareLattice {
        &self.lattice
    }

    pub fn get_acceptance_rate(&self) -> f64 {
        self.acceptance_rate
    }
}

fn equilibrate_at_temperature(
    temperature: f64,
    seed: u64,
    settings: &SweepSettings,
) -> Result<EquilibriumSnapshot, IsingError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let table = AcceptanceTable::from_temperature(temperature);
    let mut lattice = SquareLattice::new_random(settings.lattice_size, &mut rng)?;

    let burn_in = ThermalizationSettings::new(settings.burn_in_steps, SeriesRecording::Discard);
    let result = run_thermalization(&mut lattice, &burn_in, &table, &mut rng)?;

    info!(
        "T = {:.3}: m = {:.4}, e = {:.4} after {} burn-in steps",
        temperature,
        result.get_final_magnetisation(),
        result.get_final_energy(),
        settings.burn_in_steps
    );

    Ok(EquilibriumSnapshot {
        temperature,
        beta: table.get_beta(),
        lattice,
        acceptance_rate: result.get_acceptance_rate(),
    })
}

/// Burn in one freshly randomised lattice per temperature and return the final lattices.
///
/// Chain `k` draws from its own generator seeded with `base_seed + k`, so the
/// snapshots do not depend on whether the chains run in parallel. The output
/// keeps the order of `temperatures`.
pub fn temperature_sweep(
    temperatures: &[f64],
    settings: &SweepSettings,
) -> Result<Vec<EquilibriumSnapshot>, IsingError> {
    info!(
        "Sweeping {} temperatures on a {}x{} lattice with {} burn-in steps each",
        temperatures.len(),
        settings.lattice_size,
        settings.lattice_size,
        settings.burn_in_steps
    );

    let run_chain = |(chain_idx, temperature): (usize, &f64)| {
        equilibrate_at_temperature(*temperature, settings.chain_seed(chain_idx), settings)
    };

    if settings.sequential {
        temperatures.iter().enumerate().map(run_chain).collect()
    } else {
        temperatures.par_iter().enumerate().map(run_chain).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySettings {
    lattice_size: usize,
    beta: f64,
    num_steps: usize,
    seed: u64,
}

impl TrajectorySettings {
    pub fn new(lattice_size: usize, beta: f64, num_steps: usize, seed: u64) -> Self {
        TrajectorySettings {
            lattice_size,
            beta,
            num_steps,
            seed,
        }
    }

    pub fn get_lattice_size(&self) -> usize {
        self.lattice_size
    }

    pub fn get_beta(&self) -> f64 {
        self.beta
    }

    pub fn get_num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }
}

/// Recorded run from a random start, used to watch a lattice approach equilibrium.
#[derive(Debug, Clone)]
pub struct Trajectory {
    series: TimeSeries,
    final_lattice: SquareLattice,
    acceptance_rate: f64,
}

impl Trajectory {
    pub fn get_series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn get_final_lattice(&self) -> &SquareLattice {
        &self.final_lattice
    }

    pub fn get_acceptance_rate(&self) -> f64 {
        self.acceptance_rate
    }
}

pub fn thermalization_trajectory(settings: &TrajectorySettings) -> Result<Trajectory, IsingError> {
    let mut rng = SmallRng::seed_from_u64(settings.seed);
    let table = AcceptanceTable::from_beta(settings.beta);
    let mut lattice = SquareLattice::new_random(settings.lattice_size, &mut rng)?;

    info!(
        "Thermalizing {} at beta = {} for {} steps",
        lattice.describe(),
        settings.beta,
        settings.num_steps
    );

    let recorded = ThermalizationSettings::new(settings.num_steps, SeriesRecording::Record);
    let result = run_thermalization(&mut lattice, &recorded, &table, &mut rng)?;
    let acceptance_rate = result.get_acceptance_rate();

    Ok(Trajectory {
        series: result.into_series().unwrap_or_default(),
        final_lattice: lattice,
        acceptance_rate,
    })
}
