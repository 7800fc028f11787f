//! Terminal output for dexsync commands
//!
//! Data goes to stdout, problems to stderr. `colored` honors NO_COLOR and
//! CLICOLOR_FORCE.

use std::fmt::Display;

use colored::Colorize;

const LABEL_WIDTH: usize = 8;

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Table or section title (cyan bold)
pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// `label value` line with the label right-aligned, so blocks of fields line up
pub fn field(label: &str, value: &(impl Display + ?Sized)) {
    println!("{} {}", format!("{label:>LABEL_WIDTH$}").green(), value);
}

/// Indented ingestion counter. Nonzero `problem` counts are shown in red.
pub fn tally(count: usize, label: &str, problem: bool) {
    let padded = format!("{count:>LABEL_WIDTH$}");
    let count = match (problem, count) {
        (true, 0) => padded.dimmed(),
        (true, _) => padded.red().bold(),
        (false, _) => padded.green(),
    };
    println!("{} {}", count, label);
}

/// Resolved position of a species in its chain
pub fn stage(species: &str, stage: u32, is_fully_evolved: bool) {
    let status = if is_fully_evolved {
        "fully evolved".green()
    } else {
        "evolves further".yellow()
    };
    println!("{}: stage {}, {}", species.bold(), stage, status);
}

/// Unstyled output (tables, JSON, TOML)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
