use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::terminal::{colors, logging::NetryFormatter};

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TIP: &str = "You can press 'q' to finish early";

/// Installs the global subscriber: terminal formatter plus spinner support.
///
/// `RUST_LOG` overrides the level picked from `-v`/`-q`. Host output is never filtered.
pub fn init_logging(verbose: u8, quiet: u8) {
    let level: &str = match (verbose, quiet) {
        (0, 0) => "info",
        (0, _) => "warn",
        (1, _) => "debug",
        _ => "trace",
    };
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},netry::print=info,netry::success=info")));

    let indicatif_layer = IndicatifLayer::new();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(NetryFormatter)
        .with_writer(indicatif_layer.get_stderr_writer());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .map(|style| style.tick_strings(TICKS))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Turns `span` (created with `indicatif.pb_show`) into the scan spinner.
pub fn start(span: &Span, interactive: bool) {
    span.pb_set_style(&style());
    let message: String = if interactive {
        format!("Waiting for the first host... {}", TIP.italic().white())
    } else {
        "Waiting for the first host...".to_string()
    };
    span.pb_set_message(&message);
}

pub fn report_scan_progress(span: &Span, count: usize) {
    span.pb_set_message(
        &format!(
            "Identified {} so far...",
            format!("{} hosts", count).green().bold()
        )
        .color(colors::TEXT_DEFAULT)
        .to_string(),
    );
}
