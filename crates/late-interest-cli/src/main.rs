mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::accrue::AccrueArgs;
use commands::calculate::{CalculateArgs, NewLpArgs};

/// Late interest on subsequent fund closes
#[derive(Parser)]
#[command(
    name = "lie",
    version,
    about = "Late interest and pro-rata allocation for subsequent fund closes",
    long_about = "Calculates the late interest owed by limited partners admitted at a \
                  subsequent close on capital calls they missed, and allocates the \
                  proceeds pro-rata to partners admitted at earlier closes. All \
                  arithmetic is decimal with half-up rounding."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the complete calculation across every close
    Calculate(CalculateArgs),
    /// Late interest owed by a single new LP
    NewLp(NewLpArgs),
    /// Accrue interest on a principal between two dates
    Accrue(AccrueArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args),
        Commands::NewLp(args) => commands::calculate::run_new_lp(args),
        Commands::Accrue(args) => commands::accrue::run_accrue(args),
        Commands::Version => {
            println!("lie {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
