// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::{ConfigCommand, OutputFormat};
use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::Result;

/// Execute a config subcommand.
pub fn run(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { output } => {
            let work_dir = find_work_dir()?;
            let config = Config::load(&work_dir)?;
            println!("{}", render(&config, &work_dir, output)?);
            Ok(())
        }
    }
}

/// The effective configuration, with the resolved store path.
pub(crate) fn render(
    config: &Config,
    work_dir: &std::path::Path,
    output: OutputFormat,
) -> Result<String> {
    let db_path = get_db_path(work_dir, config);
    match output {
        OutputFormat::Text => Ok(format!(
            "# {}\n# store: {}\n{}",
            work_dir.display(),
            db_path.display(),
            config.to_toml()?
        )),
        OutputFormat::Json => {
            let mut value = serde_json::to_value(config)?;
            value["store"]["resolved_path"] = serde_json::json!(db_path.display().to_string());
            Ok(serde_json::to_string_pretty(&value)?)
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
