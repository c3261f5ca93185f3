//! Terminal output formatting.
//!
//! Only the local subcommands print here. In `serve` mode stdout belongs to
//! the RPC channel.

use console::style;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

/// Prints a header for a section.
pub fn section_header(title: &str) {
    println!("\n{}", style(format!("── {} ──", title)).bold());
}

/// Prints a key-value pair.
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Prints a catalogue entry.
pub fn command(name: &str, cmd: &str, description: &str) {
    println!(
        "  {:<12} {} {}",
        style(name).cyan().bold(),
        cmd,
        style(format!("- {}", description)).dim()
    );
}

/// Echoes captured process output unchanged.
pub fn raw(bytes: &[u8]) {
    print!("{}", String::from_utf8_lossy(bytes));
}
