//! One palette for terminal messages, report tables and `--help`.

use clap::builder::styling::{AnsiColor, Styles};
use colored::Color;
use comfy_table::Color as TableColor;
use fielder::Severity;

pub struct Theme {
    pub success: Color,
    pub note: Color,
    pub warning: Color,
    pub error: Color,
    pub heading: Color,
    pub muted: Color,
    pub key: Color,
    pub value: Color,
}

pub const THEME: Theme = Theme {
    success: Color::Green,
    note: Color::Cyan,
    warning: Color::Yellow,
    error: Color::Red,
    heading: Color::BrightBlue,
    muted: Color::BrightBlack,
    key: Color::BrightCyan,
    value: Color::White,
};

impl Theme {
    /// Level column color in diagnostic tables.
    pub fn table_color(&self, severity: Severity) -> TableColor {
        match severity {
            Severity::Note => TableColor::Cyan,
            Severity::Warning => TableColor::Yellow,
            Severity::Error => TableColor::Red,
        }
    }

    /// Clap help styles matching the palette above.
    pub fn help_styles(&self) -> Styles {
        Styles::styled()
            .header(AnsiColor::BrightBlue.on_default().bold())
            .usage(AnsiColor::BrightBlue.on_default().bold())
            .literal(AnsiColor::BrightCyan.on_default())
            .placeholder(AnsiColor::BrightBlack.on_default())
            .valid(AnsiColor::Green.on_default())
            .invalid(AnsiColor::Yellow.on_default())
            .error(AnsiColor::Red.on_default().bold())
    }
}

pub struct Icons {
    pub success: &'static str,
    pub note: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub arrow: &'static str,
    /// Prefix of a pending or written field.
    pub field: &'static str,
    pub file: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    note: "ℹ",
    warning: "⚠",
    error: "✗",
    arrow: "→",
    field: "+",
    file: "📄",
};
