use colored::Colorize;

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a step that did not work out. Unlike [`error`] this is part of the
/// normal progress display, so it goes to stdout.
pub fn failure(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a neutral note.
pub fn info(msg: &str) {
    println!("  {} {}", "·".dimmed(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}
