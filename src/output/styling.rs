use std::fmt::Display;

use console::{style, StyledObject};

/// Section or block title.
pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

pub fn icon(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

/// Field names and secondary details.
pub fn label(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn address(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

/// Counts, and phases still running.
pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn done(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

/// Jobs the audit could not inspect.
pub fn lost(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn brand(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
