//! `kiln build`

use crate::cli::BuildArgs;
use crate::commands::{compiler, load_config, print_report};
use crate::error::Result;
use crate::ui;

pub async fn execute(args: BuildArgs) -> Result<()> {
    let config = load_config(&args.overrides())?;
    let out_dir = config.output_root();
    let compiler = compiler(config);

    let report = compiler.build_project().await?;
    print_report(&report, "compiled");
    ui::info(&format!(
        "wrote {} to {}",
        ui::plural(report.written.len(), "file"),
        out_dir.display()
    ));
    Ok(())
}
