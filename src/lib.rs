pub mod config;
pub mod error;
pub mod lattice;
pub mod monte_carlo;
pub mod output;

pub use error::IsingError;
