use std::fmt;

/// Position of the `if`/`unless` keyword token an offense is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    /// 1-indexed line number.
    pub line: usize,
    /// 0-indexed column (character offset within the line).
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

pub fn favor_modifier_message(keyword: &str) -> String {
    format!("Favor modifier `{keyword}` usage when having a single-line body.")
}

pub fn line_too_long_message(keyword: &str) -> String {
    format!("Modifier form of `{keyword}` makes the line too long.")
}
