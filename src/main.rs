use clap::Parser;
use ising_metropolis::config::{Cli, Command, SnapshotArgs, ThermalizeArgs};
use ising_metropolis::monte_carlo;
use ising_metropolis::output;
use log::info;
use rand::Rng;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    info!("Using seed {seed}");

    let output_dir = output::ensure_output_dir(&cli.output_dir)?;
    match &cli.command {
        Command::Thermalize(args) => run_thermalize(args, seed, &output_dir),
        Command::Snapshots(args) => run_snapshots(args, seed, &output_dir),
    }
}

fn run_thermalize(args: &ThermalizeArgs, seed: u64, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let settings = args.to_settings(seed)?;
    let trajectory = monte_carlo::thermalization_trajectory(&settings)?;

    if let Some((m, e)) = trajectory.get_series().tail_means(0.1) {
        info!("Last 10% of the run: <m> = {m:.4}, <e> = {e:.4}");
    }
    info!("Acceptance rate {:.4}", trajectory.get_acceptance_rate());

    let path = output_dir.join(output::THERMALIZATION_FILE);
    output::write_time_series(
        BufWriter::new(File::create(&path)?),
        trajectory.get_series(),
        settings.get_lattice_size(),
    )?;
    info!("Saved: {}", path.display());

    Ok(())
}

fn run_snapshots(args: &SnapshotArgs, seed: u64, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let settings = args.to_settings(seed)?;
    let snapshots = monte_carlo::temperature_sweep(&args.temperatures, &settings)?;

    for (chain_idx, snapshot) in snapshots.iter().enumerate() {
        let path = output_dir.join(output::snapshot_file_name(
            chain_idx,
            snapshot.get_temperature(),
        ));
        output::write_snapshot(BufWriter::new(File::create(&path)?), snapshot.get_lattice())?;
        info!("Saved: {}", path.display());
    }

    let path = output_dir.join(output::SNAPSHOT_SUMMARY_FILE);
    output::write_sweep_summary(BufWriter::new(File::create(&path)?), &snapshots)?;
    info!("Saved: {}", path.display());

    Ok(())
}
