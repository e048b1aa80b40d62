/*
[INPUT]:  Interactive user input via CLI (or defaults)
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When DashboardConfig schema changes
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};

use taskdeck_dashboard::DashboardConfig;

pub fn run_init(output: &Path, accept_defaults: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            output.display()
        );
    }

    let config = if accept_defaults {
        DashboardConfig::default()
    } else {
        prompt_config()?
    };
    config.validate()?;

    let yaml = config.to_yaml()?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}

fn prompt_config() -> Result<DashboardConfig> {
    println!("{}", style("taskdeck configuration").bold().cyan());
    println!(
        "{}",
        style("Press enter to keep the suggested value.").dim()
    );

    let theme = ColorfulTheme::default();
    let defaults = DashboardConfig::default();

    println!("\n{}", style("--- Task Service ---").bold());
    let base_url: String = Input::with_theme(&theme)
        .with_prompt("Base URL")
        .default(defaults.base_url.clone())
        .interact_text()?;

    let poll_interval_ms: u64 = Input::with_theme(&theme)
        .with_prompt("Poll interval (ms)")
        .default(defaults.poll_interval_ms)
        .interact_text()?;

    println!("\n{}", style("--- Files ---").bold());
    let download_dir: String = Input::with_theme(&theme)
        .with_prompt("Download directory")
        .default(defaults.download_dir.display().to_string())
        .interact_text()?;

    let log_dir: String = Input::with_theme(&theme)
        .with_prompt("Log directory (empty for console only)")
        .allow_empty(true)
        .interact_text()?;

    Ok(DashboardConfig {
        base_url,
        poll_interval_ms,
        download_dir: PathBuf::from(download_dir),
        log_dir: (!log_dir.trim().is_empty()).then(|| PathBuf::from(log_dir.trim())),
        ..defaults
    })
}
