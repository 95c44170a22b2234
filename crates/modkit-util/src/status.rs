//! Status lines on stderr, leaving stdout for command output.

use std::io::Write;

use console::Style;

fn line(style: Style, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{:>12} {message}", style.apply_to(label));
}

/// `    Resolved 4 modules`, with the label right-aligned in bold green.
pub fn status(label: &str, message: &str) {
    line(Style::new().green().bold(), label, message);
}

/// Informational line (bold cyan label).
pub fn status_info(label: &str, message: &str) {
    line(Style::new().cyan().bold(), label, message);
}

/// Warning line (bold yellow label).
pub fn status_warn(label: &str, message: &str) {
    line(Style::new().yellow().bold(), label, message);
}
