use colored::*;
use tracing::warn;

use netry_common::config::ScanConfig;
use netry_common::success;
use netry_core::plan::ScanPlan;

use crate::terminal::{colors, print};

/// Shows the scanner invocation for `cfg` without running it.
pub fn compile(cfg: &ScanConfig, quiet: u8) -> anyhow::Result<()> {
    let plan: ScanPlan = ScanPlan::from_config(cfg)?;

    for keyword in plan.skipped_info() {
        warn!("Info keyword '{}' is not supported and was left out", keyword);
    }

    if quiet == 0 {
        let key_width: usize = "Passthrough".len();
        print::aligned_line("Scanner", cfg.scanner.display().to_string(), key_width);
        for option in plan.options() {
            print::aligned_line("Option", option.to_string(), key_width);
        }
        if !plan.passthrough().is_empty() {
            print::aligned_line("Passthrough", plan.passthrough().join(" "), key_width);
        }
        print::aligned_line("Timeout", format!("{}s", cfg.deadline.as_secs()), key_width);
        if plan.needs_privileges() {
            print::aligned_line("Privileges", "root".color(colors::ACCENT), key_width);
        }
    }

    let command: String = std::iter::once(cfg.scanner.display().to_string())
        .chain(plan.args())
        .collect::<Vec<String>>()
        .join(" ");
    success!("{}", command.bold());
    Ok(())
}
