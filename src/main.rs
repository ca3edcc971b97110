mod categorizer;
mod cli;
mod error;
mod exporter;
mod fmt;
mod importer;
mod lookups;
mod models;
mod normalizer;
mod pipeline;
mod pivot;
mod reports;
mod reshape;
mod settings;
mod status;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::transform::TransformOptions;
use cli::{settings_with, Cli, Commands, EngineArgs};
use settings::settings_path;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn version_only(rule_version: Option<String>) -> EngineArgs {
    EngineArgs {
        rule_version,
        ..EngineArgs::default()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Transform {
            file,
            output,
            format,
            all_months,
            long,
            engine,
        } => settings_with(config, &engine).and_then(|settings| {
            cli::transform::run(
                &file,
                &settings,
                TransformOptions {
                    output,
                    format,
                    all_months,
                    long,
                },
            )
        }),
        Commands::Melt {
            file,
            output,
            format,
            sheet,
        } => settings_with(config, &EngineArgs { sheet, ..EngineArgs::default() })
            .and_then(|settings| cli::melt::run(&file, &settings.sheet_name, output, format)),
        Commands::Summary { file, top, engine } => settings_with(config, &engine)
            .and_then(|settings| cli::summary::run(&file, &settings, top)),
        Commands::Rules {
            rule_version,
            json,
            save,
        } => settings_with(config, &version_only(rule_version)).and_then(|settings| {
            let target = save.then(|| config.map(PathBuf::from).unwrap_or_else(settings_path));
            cli::rules::run(&settings, json, target.as_deref())
        }),
        Commands::Classify(args) => settings_with(config, &version_only(args.rule_version.clone()))
            .and_then(|settings| cli::classify::run(&args, &settings)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
