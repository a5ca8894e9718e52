//! `labelprint` - CLI for the label print dispatcher
//!
//! `labelprint label.svg` rasterizes and prints one label; the `config` and
//! `labels` subcommands help set up a deployment.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use labelprint::cli::{Cli, Command, ConfigCommand, LabelsCommand, PrintArgs};
use labelprint::error::EXIT_FAILURE;
use labelprint::labels::KNOWN_LABELS;
use labelprint::{
    init_logging, shutdown_signal, Config, Dispatcher, Error, Overrides, PrintRequest, Result,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here
            let code = if err.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("labelprint: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    cli.check_print_args()?;

    let overrides = cli.overrides();
    match cli.command {
        Some(Command::Config(config_cmd)) => handle_config(cli.config, config_cmd),
        Some(Command::Labels(labels_cmd)) => handle_labels(&labels_cmd),
        None => handle_print(cli.config, cli.print, overrides).await,
    }
}

async fn handle_print(
    config_path: Option<PathBuf>,
    args: PrintArgs,
    overrides: Overrides,
) -> Result<()> {
    let Some(input) = args.input else {
        return Err(Error::usage(format!(
            "missing input file\n\n{}",
            Cli::command().render_usage()
        )));
    };

    let config = Config::load_with(config_path, overrides)?;
    let request = PrintRequest::new(input, &config)?;
    let dispatcher = Dispatcher::from_config(&config);

    let outcome = dispatcher
        .dispatch_until(&request, shutdown_signal())
        .await?;
    if outcome.is_advisory() {
        eprintln!(
            "labelprint: warning: {} exited with {}; check the printed label",
            config.printer.program, outcome.driver_status
        );
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let size = config
                    .dimensions()
                    .map_or_else(|_| "unset".to_string(), |d| d.to_string());
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Printer]");
                println!("  Driver:             {}", config.printer.program);
                println!("  Device:             {}", config.printer.device);
                println!(
                    "  Model:              {}",
                    config.printer.model.as_deref().unwrap_or("(driver default)")
                );
                println!(
                    "  Backend:            {}",
                    config.printer.backend.as_deref().unwrap_or("(driver default)")
                );
                println!("  Label:              {}", config.printer.label);
                println!("  On driver failure:  {:?}", config.printer.on_failure);
                println!();
                println!("[Raster]");
                println!("  Converter:          {}", config.raster.program);
                println!("  Size:               {size}");
                println!("  Background:         {}", config.raster.background);
                println!("  Temp directory:     {}", config.temp_dir().display());
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn handle_labels(cmd: &LabelsCommand) -> Result<()> {
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(KNOWN_LABELS)?);
        return Ok(());
    }

    println!("{:<10} {:<9} {:>12}", "LABEL", "FORM", "PIXELS");
    for label in KNOWN_LABELS {
        let pixels = label
            .dimensions()
            .map_or_else(|| format!("{} wide", label.width), |d| d.to_string());
        println!("{:<10} {:<9} {:>12}", label.code, label.form.to_string(), pixels);
    }
    Ok(())
}
