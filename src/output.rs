use crate::error::IsingError;
use crate::lattice::SquareLattice;
use crate::monte_carlo::{EquilibriumSnapshot, TimeSeries};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const THERMALIZATION_FILE: &str = "thermalization.csv";
pub const SNAPSHOT_SUMMARY_FILE: &str = "snapshot_summary.csv";

/// File name of the snapshot of chain `chain_idx`. The index keeps repeated or
/// nearly equal temperatures from sharing a file.
pub fn snapshot_file_name(chain_idx: usize, temperature: f64) -> String {
    format!("snapshot_{chain_idx:02}_T{temperature:.2}.csv")
}

pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf, IsingError> {
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

#[derive(Debug, Serialize)]
struct SeriesRecord {
    step: usize,
    magnetisation: f64,
    energy_per_site: f64,
    energy: f64,
}

/// Write one row per step. `energy` is the energy per site scaled back to the whole lattice.
pub fn write_time_series<W: io::Write>(
    writer: W,
    series: &TimeSeries,
    lattice_size: usize,
) -> Result<(), IsingError> {
    let num_sites = (lattice_size * lattice_size) as f64;
    let mut csv_writer = csv::Writer::from_writer(writer);

    for row in series.rows() {
        csv_writer.serialize(SeriesRecord {
            step: row.step,
            magnetisation: row.magnetisation,
            energy_per_site: row.energy_per_site,
            energy: row.energy_per_site * num_sites,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the spins as L rows of L values, no header.
pub fn write_snapshot<W: io::Write>(writer: W, lattice: &SquareLattice) -> Result<(), IsingError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for row in lattice.rows() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SnapshotRecord {
    temperature: f64,
    beta: f64,
    lattice_size: usize,
    magnetisation: f64,
    energy_per_site: f64,
}

pub fn write_sweep_summary<W: io::Write>(
    writer: W,
    snapshots: &[EquilibriumSnapshot],
) -> Result<(), IsingError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for snapshot in snapshots {
        let lattice = snapshot.get_lattice();
        csv_writer.serialize(SnapshotRecord {
            temperature: snapshot.get_temperature(),
            beta: snapshot.get_beta(),
            lattice_size: lattice.linear_system_size(),
            magnetisation: lattice.get_magnetisation(),
            energy_per_site: lattice.get_energy_per_site(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
