//! Line-oriented output for scan reports. Everything goes through [`output!`] so
//! it interleaves cleanly with the spinner.

use std::fmt::Display;

use colored::*;
use netry_common::output;

use crate::terminal::colors;

pub const REPORT_WIDTH: usize = 64;

/// A section title padded with rules to [`REPORT_WIDTH`]. Hidden when quiet.
pub fn header(title: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let label: String = format!("⟦ {} ⟧", title.to_uppercase());
    let rule: usize = REPORT_WIDTH.saturating_sub(label.chars().count());
    output!(format!(
        "{}{}{}",
        "─".repeat(rule / 2).color(colors::SEPARATOR),
        label.color(colors::PRIMARY),
        "─".repeat(rule - rule / 2).color(colors::SEPARATOR)
    ));
}

/// `key.....: value`, with dots up to `key_width`.
pub fn aligned_line(key: &str, value: impl Display, key_width: usize) {
    let dots: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    print_status(format!(
        "{}{} {}",
        key.color(colors::PRIMARY),
        format!("{dots}:").color(colors::SEPARATOR),
        value
    ));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    output!(format!(
        "{} {}",
        ">".color(colors::SEPARATOR),
        msg.as_ref().color(colors::TEXT_DEFAULT)
    ));
}

pub fn tree_head(idx: usize, name: &str) {
    output!(format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

/// One level of `├─ key...: value` branches under a [`tree_head`].
pub fn as_tree_one_level(rows: &[(String, ColoredString)]) {
    let key_width: usize = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0)
        .max(7);

    for (i, (key, value)) in rows.iter().enumerate() {
        let branch: &str = if i + 1 == rows.len() { "└─" } else { "├─" };
        let dots: String = ".".repeat(key_width.saturating_sub(key.chars().count()));
        output!(format!(
            " {} {}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            format!("{dots}:").color(colors::SEPARATOR),
            value
        ));
    }
}

/// A double rule followed by `line` centred under it.
pub fn summary_banner(line: &str) {
    output!("═".repeat(REPORT_WIDTH).color(colors::SEPARATOR));
    let pad: String = " ".repeat(REPORT_WIDTH.saturating_sub(console::measure_text_width(line)) / 2);
    output!(format!("{pad}{line}"));
}

pub fn no_results() {
    print_status("The scanner reported no hosts.".red().bold().to_string());
    print_status("Check the target directive, or retry with a discover scan (-m discover).");
}
