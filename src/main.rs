use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use csvpipe::cli::{self, Args};

fn main() {
    let args = Args::parse();

    // Logs go to stderr so they never mix with records on stdout
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli::run(&args) {
        Ok(stats) => {
            if args.stats && !args.quiet {
                eprintln!("\nRun Statistics:");
                eprintln!("{}", stats.summary());
            }
            if args.output.is_some() {
                cli::show_success(
                    &format!("Processed {}", args.input_description()),
                    args.quiet,
                );
            }
        }
        Err(e) => {
            cli::handle_error(&e);
            std::process::exit(1);
        }
    }
}
