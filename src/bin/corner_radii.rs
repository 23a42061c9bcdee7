use clap::Parser;
use gen_config_migrate::corner::max_sqr_radii;

#[derive(Parser)]
#[command(
    name = "corner-radii",
    version,
    about = "Print the maximum squared radius of each corner band per kernel size"
)]
struct Cli {
    /// Print kernel sizes below this bound
    #[arg(default_value_t = 19)]
    max_size: usize,
}

fn main() {
    let cli = Cli::parse();
    for size in 0..cli.max_size {
        let radii: Vec<String> = max_sqr_radii(size).iter().map(f64::to_string).collect();
        println!("{size}: {}", radii.join(", "));
    }
}
