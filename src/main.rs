use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use gen_config_migrate::logging;
use gen_config_migrate::migrate::migrate_files;

#[derive(Parser)]
#[command(
    name = "gen-config-migrate",
    version,
    long_version = env!("GEN_CONFIG_MIGRATE_LONG_VERSION"),
    about = "Migrate legacy generation configs to schema version 1.0 in place"
)]
struct Cli {
    /// Config files to migrate; each original is kept as <FILE>.bak
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if cli.files.is_empty() {
        println!("{}", Cli::command().render_usage());
        std::process::exit(1);
    }

    logging::init();

    if let Err(e) = migrate_files(&cli.files) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
