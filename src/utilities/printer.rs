//! Console printer with ANSI colour support.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    White,
    BoldGreen,
    BoldCyan,
    BoldWhite,
}

impl PrinterColor {
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::White => "\x1b[37m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldWhite => "\x1b[1;37m",
        }
    }

    /// Green for an accepted candidate, red for one scoring below the best,
    /// white otherwise.
    pub fn for_outcome(is_improvement: bool, total: u32, best_total: u32) -> Self {
        if is_improvement {
            Self::Green
        } else if total < best_total {
            Self::Red
        } else {
            Self::White
        }
    }
}

const RESET: &str = "\x1b[0m";

/// A piece of coloured text.
pub struct ColoredText {
    pub text: String,
    pub color: PrinterColor,
}

impl ColoredText {
    pub fn new(text: impl Into<String>, color: PrinterColor) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Prints to stdout, colouring unless `NO_COLOR` is set.
#[derive(Debug, Clone)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        if self.color {
            format!("{}{}{}", color.ansi_code(), content, RESET)
        } else {
            content.to_string()
        }
    }

    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }

    /// Print several coloured segments on one line.
    pub fn print_colored(&self, segments: &[ColoredText]) {
        let line: String = segments
            .iter()
            .map(|s| self.paint(&s.text, s.color))
            .collect();
        println!("{}", line);
    }
}
