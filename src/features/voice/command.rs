//! Voice commands and keyword matching.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which screens a command is relevant on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    Navigation,
    Accessibility,
    Reminder,
    General,
}

impl CommandCategory {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Accessibility => "accessibility",
            Self::Reminder => "reminder",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommandCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "navigation" => Ok(Self::Navigation),
            "accessibility" => Ok(Self::Accessibility),
            "reminder" => Ok(Self::Reminder),
            "general" => Ok(Self::General),
            other => Err(format!("unknown command category: {other}")),
        }
    }
}

/// How a transcript that matches several commands is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The command with the longest matching keyword wins; registration
    /// order breaks ties. "set a reminder" beats "reminder".
    #[default]
    LongestKeyword,
    /// The first registered command with any matching keyword wins.
    FirstRegistered,
}

/// Callback run when a command is dispatched.
pub type CommandAction = Arc<dyn Fn() + Send + Sync>;

/// A keyword-triggered capability.
#[derive(Clone)]
pub struct VoiceCommand {
    keywords: Vec<String>,
    action: CommandAction,
    description: String,
    category: CommandCategory,
}

impl VoiceCommand {
    /// Create a command. Keywords are lowercased; blank ones are dropped.
    pub fn new<I, K, F>(
        keywords: I,
        description: impl Into<String>,
        category: CommandCategory,
        action: F,
    ) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| normalize(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
            action: Arc::new(action),
            description: description.into(),
            category,
        }
    }

    /// Lowercased trigger keywords.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Screen category.
    #[must_use]
    pub const fn category(&self) -> CommandCategory {
        self.category
    }

    /// Shared handle to the action.
    #[must_use]
    pub fn action(&self) -> CommandAction {
        Arc::clone(&self.action)
    }

    /// Longest keyword contained in an already-normalized transcript.
    #[must_use]
    pub fn matched_keyword(&self, normalized: &str) -> Option<&str> {
        self.keywords
            .iter()
            .filter(|k| normalized.contains(k.as_str()))
            .max_by_key(|k| k.len())
            .map(String::as_str)
    }

    /// Whether any of `keywords` (case-insensitive) is one of ours.
    #[must_use]
    pub fn shares_keyword<K: AsRef<str>>(&self, keywords: &[K]) -> bool {
        keywords
            .iter()
            .map(|k| normalize(k.as_ref()))
            .any(|k| self.keywords.contains(&k))
    }

    /// Serializable summary of this command.
    #[must_use]
    pub fn info(&self) -> CommandInfo {
        CommandInfo {
            keywords: self.keywords.clone(),
            description: self.description.clone(),
            category: self.category,
        }
    }
}

impl std::fmt::Debug for VoiceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCommand")
            .field("keywords", &self.keywords)
            .field("description", &self.description)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// A command without its action, for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub keywords: Vec<String>,
    pub description: String,
    pub category: CommandCategory,
}

/// Lowercase and trim a transcript or keyword.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Pick the command a normalized transcript dispatches to.
#[must_use]
pub fn find_match<'a>(
    commands: &'a [VoiceCommand],
    normalized: &str,
    policy: MatchPolicy,
) -> Option<&'a VoiceCommand> {
    match policy {
        MatchPolicy::FirstRegistered => commands
            .iter()
            .find(|cmd| cmd.matched_keyword(normalized).is_some()),
        MatchPolicy::LongestKeyword => {
            let mut best: Option<(&VoiceCommand, usize)> = None;
            for cmd in commands {
                if let Some(keyword) = cmd.matched_keyword(normalized) {
                    // Strictly longer only, so earlier registrations keep ties
                    if best.map_or(true, |(_, len)| keyword.len() > len) {
                        best = Some((cmd, keyword.len()));
                    }
                }
            }
            best.map(|(cmd, _)| cmd)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(keywords: &[&str], description: &str) -> VoiceCommand {
        VoiceCommand::new(keywords.iter(), description, CommandCategory::General, || {})
    }

    #[test]
    fn test_keywords_normalized() {
        let command = cmd(&["  Go Home ", "", "HOME"], "Go home");
        assert_eq!(command.keywords(), &["go home".to_string(), "home".to_string()]);
    }

    #[test]
    fn test_substring_match_is_permissive() {
        let command = VoiceCommand::new(
            ["reminder"],
            "create reminder",
            CommandCategory::Reminder,
            || {},
        );
        let text = normalize("Please set a REMINDER for milk");
        assert_eq!(command.matched_keyword(&text), Some("reminder"));
    }

    #[test]
    fn test_first_registered_policy() {
        let commands = vec![cmd(&["help"], "Help"), cmd(&["help me"], "Emergency")];
        let found = find_match(&commands, "help me please", MatchPolicy::FirstRegistered);
        assert_eq!(found.unwrap().description(), "Help");
    }

    #[test]
    fn test_longest_keyword_policy() {
        let commands = vec![cmd(&["help"], "Help"), cmd(&["help me"], "Emergency")];
        let found = find_match(&commands, "help me please", MatchPolicy::LongestKeyword);
        assert_eq!(found.unwrap().description(), "Emergency");
    }

    #[test]
    fn test_longest_keyword_tie_keeps_registration_order() {
        let commands = vec![cmd(&["home"], "First"), cmd(&["home"], "Second")];
        let found = find_match(&commands, "go home", MatchPolicy::LongestKeyword);
        assert_eq!(found.unwrap().description(), "First");
    }

    #[test]
    fn test_no_match() {
        let commands = vec![cmd(&["settings"], "Settings")];
        assert!(find_match(&commands, "open camera", MatchPolicy::LongestKeyword).is_none());
        assert!(find_match(&[], "anything", MatchPolicy::FirstRegistered).is_none());
    }

    #[test]
    fn test_shares_keyword_case_insensitive() {
        let command = cmd(&["go home", "home"], "Home");
        assert!(command.shares_keyword(&["HOME"]));
        assert!(!command.shares_keyword(&["go"]));
    }

    #[test]
    fn test_debug_omits_action() {
        let text = format!("{:?}", cmd(&["read"], "Read screen"));
        assert!(text.contains("Read screen"));
        assert!(text.contains(".."));
    }
}
