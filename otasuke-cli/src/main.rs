mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
};
use anyhow::Context;
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json_errors = matches!(
        args.output,
        Some(OutputFormat::Json) | Some(OutputFormat::JsonCompact)
    );

    if let Err(e) = run(args).await {
        if json_errors {
            let error_json = serde_json::json!({
                "status": "error",
                "message": format!("{e:#}"),
            });
            println!("{error_json}");
        } else {
            error!("Application error: {:#}", e);
            #[cfg(feature = "colored-output")]
            {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            }
            #[cfg(not(feature = "colored-output"))]
            {
                eprintln!("Error: {e:#}");
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "Configuration loaded");

    let format = args.output.unwrap_or(config.output_format);

    // Commands that never talk to the Backend API.
    match &args.command {
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config { show, reset } => {
            if *reset {
                AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults");
            } else if *show {
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
            return Ok(());
        }
        _ => {}
    }

    let executor = CommandExecutor::new(
        &config,
        args.api_url.as_deref(),
        args.credentials.as_deref(),
        format,
    )?;

    match args.command {
        Commands::Login { email, password } => executor.login(&email, password).await?,
        Commands::Register {
            email,
            role,
            password,
        } => executor.register(&email, role, password).await?,
        Commands::Logout => executor.logout()?,
        Commands::Whoami => executor.whoami().await?,
        Commands::Projects { action } => executor.projects(action).await?,
        Commands::Quotes { action } => executor.quotes(action).await?,
        Commands::Orders { action } => executor.orders(action).await?,
        Commands::Notifications { action } => executor.notifications(action).await?,
        Commands::DirectOrders { action } => executor.direct_orders(action).await?,
        Commands::Dashboard => executor.dashboard().await?,
        Commands::Completions { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    subscriber
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
    Ok(())
}
