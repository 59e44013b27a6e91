use std::io::Write as _;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::app::ConfigStore;
use crate::modes::{registry, Mode};

/// Open the configuration file with `$EDITOR` or the platform opener.
pub fn open_config(store: &ConfigStore) -> Result<()> {
    // Make sure there is a file to open
    store.load_or_recover()?;
    open_in_editor(&store.config_path())?;
    println!("{}", "Configuration file opened".green());
    Ok(())
}

/// Open the instruction file for one mode, seeding it first if needed.
pub fn edit_instructions(store: &ConfigStore, mode_identifier: &str) -> Result<()> {
    let mode = match Mode::from_str(mode_identifier) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", format!("{}", e).red());
            let available: Vec<_> = registry::all().iter().map(|d| d.mode.as_str()).collect();
            eprintln!("{}", format!("Available modes: {}", available.join(", ")).yellow());
            return Ok(());
        }
    };
    store.seed_instructions()?;
    open_in_editor(&store.instruction_path(mode))?;
    println!("{}", format!("Instruction file opened: {}", mode).green());
    Ok(())
}

/// Reset the configuration to defaults after an interactive confirmation.
pub fn reset_config(store: &ConfigStore) -> Result<()> {
    print!("Reset configuration file to defaults? (y/n): ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    if answer.trim().eq_ignore_ascii_case("y") {
        store.reset_to_defaults()?;
        println!("{}", "Configuration reset to defaults".green());
    } else {
        println!("{}", "Configuration reset cancelled".yellow());
    }
    Ok(())
}

fn open_in_editor(path: &Path) -> Result<()> {
    let status = if let Ok(editor) = std::env::var("EDITOR") {
        Command::new(editor).arg(path).status()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    }
    .with_context(|| format!("failed to open {}", path.display()))?;

    if !status.success() {
        anyhow::bail!("editor exited with {}", status);
    }
    Ok(())
}
