//! Reminder helper commands.

use colored::Colorize;

use crate::cli::args::{OutputFormat, ReminderCommands};
use crate::error::AccessAidError;
use crate::output::to_json;
use crate::reminders::{upcoming_occurrences, ReminderFields};

/// Execute reminder subcommands.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn reminder(cmd: ReminderCommands, format: OutputFormat) -> Result<String, AccessAidError> {
    match cmd {
        ReminderCommands::Preview {
            title,
            at,
            frequency,
            count,
        } => {
            let mut fields = ReminderFields::new(title, at);
            fields.frequency = frequency;
            let times = upcoming_occurrences(&fields, count);

            match format {
                OutputFormat::Json => to_json(&serde_json::json!({
                    "title": fields.title,
                    "frequency": fields.frequency,
                    "occurrences": times,
                })),
                OutputFormat::Pretty => {
                    let mut lines = Vec::new();
                    lines.push(format!("{} ({})", fields.title.bold(), fields.frequency));
                    lines.push("─".repeat(40));
                    for (i, when) in times.iter().enumerate() {
                        lines.push(format!(
                            "  {:>2}. {}",
                            i + 1,
                            when.format("%a %Y-%m-%d %H:%M UTC")
                        ));
                    }
                    Ok(lines.join("\n"))
                },
            }
        },
    }
}
