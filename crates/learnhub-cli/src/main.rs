mod cli;
mod commands;
mod config;
mod observability;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use learnhub_gateway::{
    FileSessionStorage, Gateway, GatewayConfig, Navigator, Role, SessionStore,
};
use tracing::debug;

use cli::{Cli, Commands, OutputFormat};
use config::ProfileConfig;
use output::print_error;

/// Tells the user the session is gone; there is no screen to route to.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate_to_login(&self) {
        eprintln!(
            "{} Session expired or revoked. Run `{}` to sign in again.",
            "!".yellow(),
            "learnhub login".bold()
        );
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let profile = cli.profile.as_str();
    let profile_cfg = config::load_profile(profile)?;
    let format = resolve_format(cli.format, &profile_cfg)?;

    if let Commands::Config(args) = &cli.command {
        return config_command(profile, profile_cfg, &args.command);
    }
    if let Commands::Resources = &cli.command {
        commands::resource::resources(format);
        return Ok(());
    }

    let (gateway, server) = make_gateway(&cli, &profile_cfg)?;

    match &cli.command {
        Commands::Login(args) => commands::auth::login(&gateway, &server, args).await?,
        Commands::Logout => commands::auth::logout(&gateway, profile),
        Commands::Whoami => commands::auth::whoami(&gateway, &server, profile),
        Commands::Status => commands::server::status(&gateway, &server).await?,
        Commands::Stats => commands::server::stats(&gateway, format).await?,
        Commands::List(args) => {
            commands::resource::list(&gateway, &args.resource, &args.params, format).await?
        }
        Commands::Get(args) => commands::resource::get(&gateway, &args.reference, format).await?,
        Commands::Create(args) => {
            commands::resource::create(&gateway, &args.resource, &args.file, format).await?
        }
        Commands::Update(args) => {
            commands::resource::update(&gateway, &args.reference, &args.file, format).await?
        }
        Commands::Patch(args) => {
            commands::resource::patch(&gateway, &args.reference, &args.file, format).await?
        }
        Commands::Delete(args) => commands::resource::delete(&gateway, &args.reference).await?,
        Commands::Dashboard(args) => {
            commands::dashboard::show(&gateway, args.role.map(Role::from), format).await?
        }
        Commands::Config(_) | Commands::Resources => {}
    }

    Ok(())
}

fn resolve_format(flag: Option<OutputFormat>, profile: &ProfileConfig) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match profile.format.as_deref() {
        Some(name) => name
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid format in profile: {e}")),
        None => Ok(OutputFormat::default()),
    }
}

fn config_command(
    profile: &str,
    mut cfg: ProfileConfig,
    command: &cli::ConfigCommands,
) -> Result<()> {
    match command {
        cli::ConfigCommands::Show => {
            output::print_field("Profile", profile);
            output::print_field("Server", cfg.server.as_deref().unwrap_or("(not set)"));
            output::print_field("Format", cfg.format.as_deref().unwrap_or("json"));
        }
        cli::ConfigCommands::Set(set_args) => {
            match set_args.key.as_str() {
                "server" => cfg.server = Some(set_args.value.clone()),
                "format" => {
                    set_args
                        .value
                        .parse::<OutputFormat>()
                        .map_err(|e| anyhow::anyhow!("Invalid format: {e}"))?;
                    cfg.format = Some(set_args.value.clone());
                }
                other => anyhow::bail!("Unknown config key: {other}. Valid keys: server, format"),
            }
            config::save_profile(profile, &cfg)?;
            output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
        }
    }
    Ok(())
}

fn make_gateway(cli: &Cli, profile_cfg: &ProfileConfig) -> Result<(Gateway, String)> {
    let mut gateway_cfg =
        GatewayConfig::load(cli.config.as_deref()).context("Failed to load gateway config")?;
    gateway_cfg.base_url = config::resolve_server(&cli.server, profile_cfg, &gateway_cfg.base_url);

    let storage = FileSessionStorage::new(config::session_path(&cli.profile)?);
    let store = Arc::new(SessionStore::restore(Arc::new(storage)));
    debug!(
        server = %gateway_cfg.base_url,
        profile = %cli.profile,
        authenticated = store.is_authenticated(),
        "Gateway configured"
    );
    let gateway = Gateway::connect(&gateway_cfg, store, Arc::new(TerminalNavigator))?;
    Ok((gateway, gateway_cfg.base_url))
}
