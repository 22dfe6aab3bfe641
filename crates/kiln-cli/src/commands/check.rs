//! `kiln check`: full analysis, every error reported, nothing written.

use crate::cli::CheckArgs;
use crate::commands::{compiler, load_config, print_report};
use crate::error::Result;

pub async fn execute(args: CheckArgs) -> Result<()> {
    let config = load_config(&args.overrides())?;
    let report = compiler(config).check_project().await?;
    print_report(&report, "checked");
    Ok(())
}
