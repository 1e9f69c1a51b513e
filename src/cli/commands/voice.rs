//! Voice command implementation.
//!
//! Runs the dispatcher against the stock command set. There is no
//! microphone in a terminal, so phrases come from the command line.

use std::sync::Arc;

use colored::Colorize;

use crate::cli::args::{OutputFormat, VoiceCommands};
use crate::config::VoiceConfig;
use crate::error::AccessAidError;
use crate::features::voice::{
    register_builtin, ActionLog, CaptionSynthesizer, CommandCategory, CommandInfo, ManagerConfig,
    ProcessSynthesizer, SpeechSynthesizer, VoiceCommandManager,
};
use crate::output::to_json;

/// Where spoken feedback goes.
enum Voice {
    Captions(Arc<CaptionSynthesizer>),
    Aloud(Arc<ProcessSynthesizer>),
}

impl Voice {
    fn new(captions: bool) -> Self {
        if captions {
            Self::Captions(Arc::new(CaptionSynthesizer::new()))
        } else {
            Self::Aloud(Arc::new(ProcessSynthesizer::new()))
        }
    }

    fn synthesizer(&self) -> Arc<dyn SpeechSynthesizer> {
        match self {
            Self::Captions(s) => Arc::clone(s) as Arc<dyn SpeechSynthesizer>,
            Self::Aloud(s) => Arc::clone(s) as Arc<dyn SpeechSynthesizer>,
        }
    }

    /// Captured lines, after letting audible speech finish.
    fn finish(&self) -> Result<Vec<String>, AccessAidError> {
        match self {
            Self::Captions(s) => Ok(s.lines()),
            Self::Aloud(s) => {
                s.wait_until_done()?;
                Ok(Vec::new())
            },
        }
    }
}

/// Execute voice subcommands.
///
/// # Errors
///
/// Returns an error if waiting on the speech command fails or output
/// formatting fails.
pub fn voice(
    config: &VoiceConfig,
    cmd: VoiceCommands,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    match cmd {
        VoiceCommands::Say {
            text,
            rate,
            captions,
        } => say(config, &text.join(" "), rate, Voice::new(captions), format),
        VoiceCommands::Process { text, captions } => {
            process(config, &text.join(" "), Voice::new(captions), format)
        },
        VoiceCommands::Commands { category } => list_commands(category, format),
    }
}

fn say(
    config: &VoiceConfig,
    text: &str,
    rate: Option<f32>,
    voice: Voice,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let manager = VoiceCommandManager::new(ManagerConfig::from(config))
        .with_synthesizer(voice.synthesizer());
    let effective_rate = manager.clamp_rate(rate);
    manager.speak(text, rate);
    let spoken = voice.finish()?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "text": text,
            "rate": effective_rate,
            "captions": spoken,
        })),
        OutputFormat::Pretty => {
            if spoken.is_empty() {
                Ok(String::new())
            } else {
                Ok(captions_block(&spoken))
            }
        },
    }
}

fn process(
    config: &VoiceConfig,
    text: &str,
    voice: Voice,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let manager = VoiceCommandManager::new(ManagerConfig::from(config))
        .with_synthesizer(voice.synthesizer());
    let log = ActionLog::new();
    register_builtin(&manager, &log);

    let dispatched = manager.process_voice_input(text);
    let intents = log.fired();
    let spoken = voice.finish()?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "input": text,
            "dispatched": dispatched,
            "intents": intents,
            "captions": spoken,
        })),
        OutputFormat::Pretty => {
            let mut lines = Vec::new();
            if dispatched {
                lines.push(format!(
                    "{} {}",
                    "✓".green(),
                    format!("Dispatched: {}", intents.join(", ")).green()
                ));
            } else {
                lines.push(format!("{} {}", "✗".red(), "No command matched".red()));
            }
            if !spoken.is_empty() {
                lines.push(captions_block(&spoken));
            }
            Ok(lines.join("\n"))
        },
    }
}

fn list_commands(
    category: Option<CommandCategory>,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let manager = VoiceCommandManager::default();
    register_builtin(&manager, &ActionLog::new());

    let commands = category.map_or_else(|| manager.commands(), |c| manager.commands_for(c));

    match format {
        OutputFormat::Json => to_json(&commands),
        OutputFormat::Pretty => Ok(format_commands(&commands)),
    }
}

fn format_commands(commands: &[CommandInfo]) -> String {
    if commands.is_empty() {
        return "No voice commands registered.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Voice Commands ({})", commands.len()).bold().to_string());
    lines.push("─".repeat(60));

    for cmd in commands {
        lines.push(format!(
            "  {:<28} {}",
            cmd.description,
            format!("[{}]", cmd.category).dimmed()
        ));
        let quoted: Vec<String> = cmd.keywords.iter().map(|k| format!("\"{k}\"")).collect();
        lines.push(format!("    {}", quoted.join(", ").cyan()));
    }

    lines.join("\n")
}

fn captions_block(spoken: &[String]) -> String {
    spoken
        .iter()
        .map(|line| format!("  {} {}", "said:".dimmed(), line))
        .collect::<Vec<_>>()
        .join("\n")
}
