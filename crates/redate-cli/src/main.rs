use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::Commands;

#[derive(Parser)]
#[command(
    name = "redate",
    version,
    about = "Rewrite git commit timestamps according to a schedule"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let code = match cli.command.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", error::format_error(&err));
            2
        }
    };
    std::process::exit(code);
}
