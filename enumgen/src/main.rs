mod cli;

use clap::Parser;
use cli::Cli;
use enumgen_core::generator::OutputMode;
use enumgen_core::{EnumGenerator, EnumgenConfig, Result};
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = EnumgenConfig::load(&cli.dir, cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    debug!(?config, "Effective configuration");

    let output = if cli.stdout {
        OutputMode::Collect
    } else {
        OutputMode::Files
    };
    let report = EnumGenerator::new(&cli.dir, config, invocation())
        .with_output(output)
        .generate(&cli.types)?;

    if cli.stdout {
        let mut stdout = std::io::stdout().lock();
        for file in &report.files {
            stdout.write_all(file.source.as_bytes())?;
        }
        stdout.flush()?;
    }

    info!(
        package = %report.package,
        types = report.files.len(),
        "Done"
    );
    Ok(())
}

/// The command line as given, recorded in generated headers.
fn invocation() -> String {
    std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
