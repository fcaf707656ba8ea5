mod exports;
mod styling;
mod summary;
mod tables;

use styling::{brand, label};

pub use exports::{export_result, render_markdown_report};

/// Prints the ci-hunter banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        brand("🔎 ci-hunter"),
        label(env!("CARGO_PKG_VERSION")),
        label("CI regression & flake detector")
    );
}
