//! Terminal output utilities
//!
//! Resolved image references are the only thing `resolve` writes to stdout;
//! status lines from these helpers go to stderr unless they are the report
//! itself.

use console::style;

/// Print a success message
pub fn success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Green `yes` or red `no`
pub fn yes_no(value: bool) -> String {
    if value {
        style("yes").green().to_string()
    } else {
        style("no").red().to_string()
    }
}
