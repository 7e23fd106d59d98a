use std::io::{self, BufRead, Write};

use crate::core::errors::Result;

/// Ask a yes/no question. An empty answer picks `default`; end of input
/// always counts as "no".
pub fn confirm(question: &str, default: bool) -> Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let Some(answer) = ask(&format!("{question} {hint}"))? else {
        return Ok(false);
    };

    Ok(match answer.to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Ask for a line of input. Returns `None` when stdin is closed.
pub fn ask(question: &str) -> Result<Option<String>> {
    print!("  {question}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
