//! Terminal rendering of the coordinate fields.

use std::cell::Cell;

use console::style;
use coordsync::sync::{ConversionStatus, CoordinateFields, Field, MemoryFields};

/// Field store that echoes completed updates to the terminal.
///
/// A pair is printed once its second field is written, so a lon/lat update
/// prints one line and a cleared pair prints nothing.
pub struct TerminalFields {
    fields: MemoryFields,
    echo: Cell<bool>,
}

impl TerminalFields {
    pub fn new() -> Self {
        Self {
            fields: MemoryFields::new(),
            echo: Cell::new(true),
        }
    }

    /// Turns echo on or off. `show` output is unaffected.
    pub fn set_echo(&self, echo: bool) {
        self.echo.set(echo);
    }

    pub fn status(&self) -> ConversionStatus {
        self.fields.status()
    }

    /// All four fields plus status, for `show`.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Field::ALL
            .iter()
            .map(|&field| format!("  {:<6} {}", field.label(), display(&self.fields.text(field))))
            .collect();
        lines.push(format!("  {:<6} {}", "status", render_status(&self.fields.status())));
        lines.join("\n")
    }

    fn echo_pair(&self, label: &str, first: Field, second: Field) {
        let first = self.fields.text(first);
        let second = self.fields.text(second);
        if self.echo.get() && !first.is_empty() && !second.is_empty() {
            println!("{} {}, {}", style(label).cyan(), first, second);
        }
    }
}

impl Default for TerminalFields {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateFields for TerminalFields {
    fn text(&self, field: Field) -> String {
        self.fields.text(field)
    }

    fn set_text(&self, field: Field, text: &str) {
        self.fields.set_text(field, text);
        match field {
            Field::Lat => self.echo_pair("lon/lat   ", Field::Lon, Field::Lat),
            Field::North => self.echo_pair("east/north", Field::East, Field::North),
            Field::Lon | Field::East => {}
        }
    }

    fn set_status(&self, status: &ConversionStatus) {
        if self.echo.get() {
            if let ConversionStatus::Failed(_) = status {
                eprintln!("{}", render_status(status));
            }
        }
        self.fields.set_status(status);
    }
}

fn display(text: &str) -> String {
    if text.is_empty() {
        style("-").dim().to_string()
    } else {
        text.to_string()
    }
}

fn render_status(status: &ConversionStatus) -> String {
    let text = style(status.to_string());
    if status.is_pending() {
        text.yellow().to_string()
    } else if let ConversionStatus::Failed(_) = status {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_fields_and_status() {
        console::set_colors_enabled(false);
        let fields = TerminalFields::new();
        fields.set_echo(false);
        fields.set_text(Field::Lon, "7.447400");
        fields.set_status(&ConversionStatus::Scheduled);

        let text = fields.render();
        assert!(text.contains("lon    7.447400"));
        assert!(text.contains("east   -"));
        assert!(text.contains("status scheduled"));
    }

    #[test]
    fn test_store_is_shared_with_status() {
        let fields = TerminalFields::new();
        fields.set_echo(false);
        fields.set_status(&ConversionStatus::Failed("HTTP 503".to_string()));
        assert_eq!(fields.status(), ConversionStatus::Failed("HTTP 503".to_string()));
        assert_eq!(fields.text(Field::North), "");
    }
}
