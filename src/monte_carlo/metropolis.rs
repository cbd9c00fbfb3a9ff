use crate::error::IsingError;
use crate::lattice::{Site, SquareLattice, K_BOLTZMANN};
use rand;

/// General Metropolis acceptance probability `min(1, exp(-beta * dE))`.
pub fn mrt2_prob(delta_energy: f64, beta: f64) -> f64 {
    f64::min(1.0, (-beta * delta_energy).exp())
}

/// Acceptance probabilities for the two positive energy changes a single
/// flip can cause on the square lattice: `[exp(-4 beta), exp(-8 beta)]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceTable {
    beta: f64,
    probs: [f64; 2],
}

impl AcceptanceTable {
    pub fn from_beta(beta: f64) -> Self {
        AcceptanceTable {
            beta,
            probs: [mrt2_prob(4., beta), mrt2_prob(8., beta)],
        }
    }

    pub fn from_temperature(temperature: f64) -> Self {
        Self::from_beta(1. / (K_BOLTZMANN * temperature))
    }

    pub fn get_beta(&self) -> f64 {
        self.beta
    }

    pub fn get_probs(&self) -> [f64; 2] {
        self.probs
    }
}

/// Change of the running totals caused by one proposal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDelta {
    pub magnetisation: f64,
    pub energy: f64,
    pub accepted: bool,
}

impl StepDelta {
    pub const REJECTED: StepDelta = StepDelta {
        magnetisation: 0.,
        energy: 0.,
        accepted: false,
    };
}

/// Decide on flipping `site` given the uniform draw `draw`, flipping it in place when accepted.
///
/// Energy changes other than -8, -4, 0, 4 and 8 cannot occur with unit spins and
/// four neighbours. Any other value means the lattice is corrupt and is returned as
/// `IsingError::UnexpectedEnergyChange`, never as a rejection.
#[inline]
pub fn attempt_flip(
    lattice: &mut SquareLattice,
    site: Site,
    draw: f64,
    table: &AcceptanceTable,
) -> Result<StepDelta, IsingError> {
    let delta_energy = lattice.calc_delta_energy(site);

    let accept = match delta_energy {
        -8 | -4 | 0 => true,
        4 => draw <= table.probs[0],
        8 => draw <= table.probs[1],
        _ => {
            return Err(IsingError::UnexpectedEnergyChange { delta_energy, site });
        }
    };

    if !accept {
        return Ok(StepDelta::REJECTED);
    }

    let num_sites = lattice.number_sites() as f64;
    let old_spin = lattice.idx_into(site);
    lattice.flip(site);

    Ok(StepDelta {
        magnetisation: -2. * old_spin as f64 / num_sites,
        energy: delta_energy as f64 / num_sites,
        accepted: true,
    })
}

/// One single-spin-flip Metropolis proposal.
///
/// The uniform draw is taken before the site, row before column.
#[inline]
pub fn metropolis_step<R: rand::Rng + ?Sized>(
    lattice: &mut SquareLattice,
    table: &AcceptanceTable,
    rng: &mut R,
) -> Result<StepDelta, IsingError> {
    let draw: f64 = rng.random();
    let site = lattice.draw_random_index(rng);
    attempt_flip(lattice, site, draw, table)
}
