//! Init Command

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;

use uiverify_e2e::E2eConfig;

use crate::output::print_success;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Write the default configuration to `path`
pub fn execute(args: InitArgs, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    E2eConfig::default().save(path)?;
    print_success(&format!("Wrote {}", path.display()));
    Ok(())
}
