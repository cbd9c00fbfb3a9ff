pub const K_BOLTZMANN: f64 = 1.; // using Planck units

pub mod square_lattice;

pub use square_lattice::SquareLattice;

/// Row and column of a lattice site.
pub type Site = (usize, usize);
