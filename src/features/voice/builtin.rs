//! The stock command set registered by the command-line front end.
//!
//! The app screens register their own commands; the CLI has no screens, so
//! these actions only record which intent fired.

use std::sync::{Arc, Mutex, PoisonError};

use super::command::{CommandCategory, VoiceCommand};
use super::manager::VoiceCommandManager;

/// Intents dispatched by the stock commands, in dispatch order.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    fired: Arc<Mutex<Vec<String>>>,
}

impl ActionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, intent: &str) {
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(intent.to_string());
    }

    /// Intents fired so far.
    #[must_use]
    pub fn fired(&self) -> Vec<String> {
        self.fired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

const BUILTIN: &[(&[&str], &str, &str, CommandCategory)] = &[
    (&["go home", "home"], "navigate_home", "Go to the home screen", CommandCategory::Navigation),
    (&["reminders", "my reminders"], "open_reminders", "Open reminders", CommandCategory::Navigation),
    (&["settings"], "open_settings", "Open settings", CommandCategory::Navigation),
    (&["read screen", "read this"], "read_screen", "Read the screen aloud", CommandCategory::Accessibility),
    (&["bigger text", "larger text"], "increase_text", "Increase text size", CommandCategory::Accessibility),
    (&["new reminder", "set a reminder"], "create_reminder", "Create a reminder", CommandCategory::Reminder),
    (&["sync now"], "sync_now", "Send queued reminder changes", CommandCategory::Reminder),
    (&["what can i say", "help"], "list_commands", "List available commands", CommandCategory::General),
    (&["emergency", "help me", "sos"], "emergency", "Call emergency contact", CommandCategory::General),
];

/// Register the stock commands on `manager`, recording dispatches in `log`.
pub fn register_builtin(manager: &VoiceCommandManager, log: &ActionLog) {
    for &(keywords, intent, description, category) in BUILTIN {
        let log = log.clone();
        manager.add_command(VoiceCommand::new(
            keywords.iter(),
            description,
            category,
            move || log.record(intent),
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::features::voice::manager::ManagerConfig;

    fn manager() -> (VoiceCommandManager, ActionLog) {
        let manager = VoiceCommandManager::new(ManagerConfig {
            cooldown: Duration::ZERO,
            ..ManagerConfig::default()
        });
        let log = ActionLog::new();
        register_builtin(&manager, &log);
        (manager, log)
    }

    #[test]
    fn test_builtin_registers_all() {
        let (manager, _) = manager();
        assert_eq!(manager.commands().len(), BUILTIN.len());
    }

    #[test]
    fn test_help_me_is_emergency_not_help() {
        let (manager, log) = manager();
        assert!(manager.process_voice_input("Help me!"));
        assert_eq!(log.fired(), vec!["emergency".to_string()]);
    }

    #[test]
    fn test_set_a_reminder_phrase() {
        let (manager, log) = manager();
        assert!(manager.process_voice_input("please set a reminder for milk"));
        assert_eq!(log.fired(), vec!["create_reminder".to_string()]);
    }
}
