use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use ems_core::config::SimConfig;
use ems_core::tables::{SharedTables, Tables};

#[derive(Parser)]
#[command(
    name = "ems_optimizer",
    about = "Optimize ambulance allocations against a simulated shift",
    long_about = "Loads the settings file and data tables, synthesizes an \
                  incident scenario, runs the configured heuristic, and \
                  writes the resulting artifacts."
)]
struct Cli {
    /// Settings file (KEY: value lines)
    #[arg(long, default_value = "settings.txt")]
    config: PathBuf,
    /// Directory holding od_matrix.txt, stations.csv, traffic.csv, and
    /// incidents.csv
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = match SimConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}: {error}", cli.config.display());
            exit(2);
        }
    };

    eprintln!("Loading tables from {}...", cli.data_dir.display());
    let tables = match Tables::load_from_dir(&cli.data_dir) {
        Ok(tables) => SharedTables::new(tables),
        Err(error) => {
            eprintln!("{}: {error}", cli.data_dir.display());
            exit(2);
        }
    };

    if let Err(error) = ems_optimizer::runner::run(&config, tables) {
        eprintln!("run failed: {error}");
        exit(1);
    }
}
