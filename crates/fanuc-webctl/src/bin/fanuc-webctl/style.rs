use std::fmt::Display;
use std::io::IsTerminal;

use owo_colors::OwoColorize;

fn colored() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

pub fn success(text: impl Display) -> String {
    if colored() {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

pub fn warning(text: impl Display) -> String {
    if colored() {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

pub fn error(text: impl Display) -> String {
    if colored() && std::io::stderr().is_terminal() {
        text.red().bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn heading(text: impl Display) -> String {
    if colored() {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}
