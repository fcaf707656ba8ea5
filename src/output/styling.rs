use std::fmt::Display;

use console::{style, StyledObject};

/// Section titles
pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

/// Field names in key/value listings
pub fn label(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

/// Identifiers such as repository or metric names
pub fn highlight(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn healthy(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn warning(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn alert(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

/// Count styled by whether anything was found.
pub fn finding_count(count: usize) -> StyledObject<String> {
    if count == 0 {
        healthy(count)
    } else {
        alert(count)
    }
}

pub fn brand(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
