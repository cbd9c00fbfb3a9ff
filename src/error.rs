use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsingError {
    #[error("lattice width must be positive")]
    EmptyLattice,

    #[error("expected {expected} spins for the lattice, got {actual}")]
    SpinCountMismatch { expected: usize, actual: usize },

    #[error("spin at site {site:?} is {value}, expected -1 or +1")]
    InvalidSpin { site: (usize, usize), value: i8 },

    /// Nearest-neighbour coupling of unit spins only admits energy changes in {-8, -4, 0, 4, 8}.
    #[error("energy change {delta_energy} when flipping site {site:?} is impossible for nearest-neighbour unit spins")]
    UnexpectedEnergyChange {
        delta_energy: i32,
        site: (usize, usize),
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
