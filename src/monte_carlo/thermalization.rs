use super::metropolis::{metropolis_step, AcceptanceTable};
use crate::error::IsingError;
use crate::lattice::SquareLattice;
use log::debug;
use rand;
use statrs::statistics::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesRecording {
    #[default]
    Record,
    /// Only the final lattice and running totals survive the run.
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThermalizationSettings {
    num_steps: usize,
    recording: SeriesRecording,
}

impl ThermalizationSettings {
    pub fn new(num_steps: usize, recording: SeriesRecording) -> Self {
        ThermalizationSettings {
            num_steps,
            recording,
        }
    }
}

/// Magnetisation and energy per site after every step of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    magnetisations: Vec<f64>,
    energies: Vec<f64>,
}

/// One entry of a `TimeSeries`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesRow {
    pub step: usize,
    pub magnetisation: f64,
    pub energy_per_site: f64,
}

impl TimeSeries {
    fn with_capacity(capacity: usize) -> Self {
        TimeSeries {
            magnetisations: Vec::with_capacity(capacity),
            energies: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, magnetisation: f64, energy: f64) {
        self.magnetisations.push(magnetisation);
        self.energies.push(energy);
    }

    pub fn len(&self) -> usize {
        self.magnetisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnetisations.is_empty()
    }

    pub fn get_magnetisations(&self) -> &[f64] {
        &self.magnetisations
    }

    pub fn get_energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn rows(&self) -> impl Iterator<Item = TimeSeriesRow> + '_ {
        self.magnetisations
            .iter()
            .zip(&self.energies)
            .enumerate()
            .map(|(step, (magnetisation, energy))| TimeSeriesRow {
                step,
                magnetisation: *magnetisation,
                energy_per_site: *energy,
            })
    }

    /// Mean magnetisation and energy over the trailing `fraction` of the series.
    ///
    /// Returns `None` for an empty series or a fraction outside (0, 1].
    pub fn tail_means(&self, fraction: f64) -> Option<(f64, f64)> {
        if self.is_empty() || !(fraction > 0. && fraction <= 1.) {
            return None;
        }
        let tail_len = ((self.len() as f64 * fraction).ceil() as usize).max(1);
        let start = self.len() - tail_len;

        Some((
            self.magnetisations[start..].iter().mean(),
            self.energies[start..].iter().mean(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermalizationResult {
    series: Option<TimeSeries>,
    final_magnetisation: f64,
    final_energy: f64,
    num_proposals: usize,
    num_accepted: usize,
}

impl ThermalizationResult {
    pub fn get_series(&self) -> Option<&TimeSeries> {
        self.series.as_ref()
    }

    pub fn into_series(self) -> Option<TimeSeries> {
        self.series
    }

    /// Running magnetisation after the last step, accumulated from the per-step deltas.
    pub fn get_final_magnetisation(&self) -> f64 {
        self.final_magnetisation
    }

    /// Running energy per site after the last step, accumulated from the per-step deltas.
    pub fn get_final_energy(&self) -> f64 {
        self.final_energy
    }

    pub fn get_num_proposals(&self) -> usize {
        self.num_proposals
    }

    pub fn get_num_accepted(&self) -> usize {
        self.num_accepted
    }

    pub fn get_acceptance_rate(&self) -> f64 {
        if self.num_proposals == 0 {
            return 0.;
        }
        self.num_accepted as f64 / self.num_proposals as f64
    }
}

/// Evolve `lattice` in place with single-spin-flip Metropolis updates.
///
/// In `Record` mode the series has exactly `num_steps` entries: the state of the
/// initial lattice followed by `num_steps - 1` proposals. In `Discard` mode all
/// `num_steps` steps are proposals. The totals are only computed from scratch once,
/// every later value is the previous one plus the step's deltas.
pub fn run_thermalization<R: rand::Rng + ?Sized>(
    lattice: &mut SquareLattice,
    settings: &ThermalizationSettings,
    table: &AcceptanceTable,
    rng: &mut R,
) -> Result<ThermalizationResult, IsingError> {
    let mut magnetisation = lattice.get_magnetisation();
    let mut energy = lattice.get_energy_per_site();

    let (mut series, num_proposals) = match settings.recording {
        SeriesRecording::Record if settings.num_steps == 0 => (Some(TimeSeries::default()), 0),
        SeriesRecording::Record => {
            let mut series = TimeSeries::with_capacity(settings.num_steps);
            series.push(magnetisation, energy);
            (Some(series), settings.num_steps - 1)
        }
        SeriesRecording::Discard => (None, settings.num_steps),
    };

    let mut num_accepted = 0;
    for _ in 0..num_proposals {
        let delta = metropolis_step(lattice, table, rng)?;
        magnetisation += delta.magnetisation;
        energy += delta.energy;
        num_accepted += delta.accepted as usize;

        if let Some(series) = series.as_mut() {
            series.push(magnetisation, energy);
        }
    }

    let result = ThermalizationResult {
        series,
        final_magnetisation: magnetisation,
        final_energy: energy,
        num_proposals,
        num_accepted,
    };
    debug!(
        "{}: {} proposals at beta = {}, acceptance rate {:.4}",
        lattice.describe(),
        num_proposals,
        table.get_beta(),
        result.get_acceptance_rate()
    );

    Ok(result)
}
