// Keyconf terminal front-end
// Browse keymaps and remap keys through the popover editor

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use keyconf_core::{default_settings_content, AppState, Settings, Store, UserConfiguration};

#[path = "../tui/mod.rs"]
mod tui;

/// Terminal keymap editor
#[derive(Parser, Debug)]
#[command(name = "keyconf-tui")]
#[command(version)]
#[command(about = "Terminal keymap editor", long_about = None)]
struct Args {
    /// TOML file with keymaps and macros (default: ~/.config/keyconf/keymaps.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Settings file (default: ~/.config/keyconf/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Open and close the popover without animating
    #[arg(long)]
    no_animation: bool,

    /// Where log output goes while the terminal is in use
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print a settings template and exit
    #[arg(long)]
    print_default_settings: bool,
}

fn init_logging(args: &Args) -> Result<()> {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("keyconf-tui.log"));
    let file = File::create(&path)
        .with_context(|| format!("Cannot open log file {}", path.display()))?;

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Cannot load settings from {}", path.display()))?,
        None => Settings::load_default().context("Cannot load default settings")?,
    };
    if args.no_animation {
        settings.set_animation_enabled(false);
    }
    Ok(settings)
}

/// Returns the configuration and the path edits are saved to
fn load_configuration(args: &Args) -> Result<(UserConfiguration, Option<PathBuf>)> {
    if let Some(path) = &args.config {
        let config = UserConfiguration::from_file(path)
            .with_context(|| format!("Cannot load configuration from {}", path.display()))?;
        return Ok((config, Some(path.clone())));
    }

    let default_path = UserConfiguration::default_path();
    match &default_path {
        Some(path) if path.exists() => {
            let config = UserConfiguration::from_file(path)
                .with_context(|| format!("Cannot load configuration from {}", path.display()))?;
            Ok((config, default_path))
        }
        _ => {
            log::info!("No keymap file found, using the built-in configuration");
            Ok((UserConfiguration::builtin(), default_path))
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_settings {
        print!("{}", default_settings_content());
        return Ok(());
    }

    init_logging(&args)?;

    let settings = load_settings(&args)?;
    let (user_configuration, config_path) = load_configuration(&args)?;
    let state = AppState {
        user_configuration,
        app: settings.app_flags(),
        device: settings.device_state()?,
        remap_target: None,
    };
    log::info!(
        "Loaded {} keymaps and {} macros",
        state.user_configuration.keymaps.len(),
        state.user_configuration.macros.len()
    );

    let store = Arc::new(Store::new(state));
    let app = tui::App::new(store, settings, config_path);
    tui::run(app).context("Terminal UI failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "keyconf-tui",
            "--config",
            "/tmp/keymaps.toml",
            "--no-animation",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/keymaps.toml")));
        assert!(args.settings.is_none());
        assert!(args.no_animation);
        assert!(!args.verbose);
        assert!(!args.print_default_settings);
    }

    #[test]
    fn test_no_animation_overrides_settings() {
        let args = Args::parse_from(["keyconf-tui", "--no-animation", "--settings", "/nonexistent"]);
        assert!(load_settings(&args).is_err());

        let args = Args::parse_from(["keyconf-tui", "--no-animation"]);
        if let Ok(settings) = load_settings(&args) {
            assert!(!settings.popover().animation_enabled);
        }
    }
}
