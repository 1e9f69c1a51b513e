use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::features::voice::CommandCategory;
use crate::reminders::{Frequency, Priority, DEFAULT_OCCURRENCES, MAX_OCCURRENCES};

#[derive(Parser)]
#[command(name = "accessaid")]
#[command(about = "Offline reminder sync queue and voice command dispatch for AccessAid")]
#[command(long_about = "accessaid - AccessAid sync and voice tools

Queue reminder changes while the backend is unreachable and replay them
later, and try out the voice command dispatcher from the terminal.

QUICK START:
  accessaid sync add create \"Take pills\" --at \"2026-01-05 09:00\"
  accessaid sync status              Show what is waiting
  accessaid sync run                 Send queued changes to the backend
  accessaid voice process \"go home\"  Dispatch a phrase to the stock commands

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  accessaid <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output. Defaults to `general.default_output` from
    /// the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the offline sync queue
    ///
    /// Reminder changes made while offline wait here until a drain sends
    /// them to the backend. Failures stay queued in their original order;
    /// an operation that keeps failing is parked as stuck.
    ///
    /// # Subcommands
    ///
    ///   status   Show queue counts
    ///   list     List queued operations
    ///   add      Queue a reminder change
    ///   run      Drain the queue against the backend
    ///   retry    Return stuck operations to pending
    ///   clear    Remove operations
    ///
    /// # Examples
    ///
    ///   accessaid sync status
    ///   accessaid sync list --status stuck
    ///   accessaid sync add complete r-42
    ///   accessaid sync run --url http://localhost:8000
    Sync(SyncArgs),

    /// Try the voice command dispatcher
    ///
    /// # Examples
    ///
    ///   accessaid voice commands --category navigation
    ///   accessaid voice process "please set a reminder for milk"
    ///   accessaid voice say "Reminder saved" --rate 1.2
    Voice(VoiceArgs),

    /// Reminder helpers
    Reminder(ReminderArgs),

    /// Generate shell completions
    ///
    /// # Example
    ///
    ///   accessaid completions zsh > ~/.zfunc/_accessaid
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for sync command.
#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommands,
}

/// Sync queue subcommands.
#[derive(Subcommand)]
pub enum SyncCommands {
    /// Show sync queue status
    ///
    /// Displays pending and stuck counts and the age of the oldest entry.
    Status,

    /// List queued operations
    List {
        /// Only show one status (pending, stuck)
        #[arg(long, short = 's')]
        status: Option<String>,

        /// Maximum operations to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Queue a reminder change
    Add {
        #[command(subcommand)]
        operation: QueueOperation,
    },

    /// Drain the queue against the backend
    ///
    /// Every pending operation is attempted in order. Successes are removed;
    /// failures stay queued.
    Run {
        /// Backend base URL (overrides `remote.base_url`)
        #[arg(long, env = "ACCESSAID_REMOTE_URL")]
        url: Option<String>,
    },

    /// Return stuck operations to pending
    Retry {
        /// Retry every stuck operation
        #[arg(long)]
        all: bool,

        /// Queue id of the operation to retry
        id: Option<String>,
    },

    /// Remove operations from the queue
    Clear {
        /// Remove every operation, pending included
        #[arg(long)]
        all: bool,

        /// Confirm removing everything
        #[arg(long)]
        force: bool,

        /// Queue id of a single operation to remove
        id: Option<String>,
    },
}

/// A reminder change to queue.
#[derive(Subcommand)]
pub enum QueueOperation {
    /// Create a reminder
    Create {
        /// Reminder title
        title: String,

        /// When the reminder fires (RFC 3339, "YYYY-MM-DD HH:MM", "today", "tomorrow")
        #[arg(long, value_parser = parse_datetime)]
        at: DateTime<Utc>,

        /// Longer description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Repeat rule (once, daily, weekly, monthly, custom)
        #[arg(long, short = 'f', default_value = "once")]
        frequency: Frequency,

        /// Priority (low, medium, high, urgent)
        #[arg(long, short = 'p', default_value = "medium")]
        priority: Priority,

        /// Owning user (overrides `general.user_id`)
        #[arg(long, short = 'u')]
        user: Option<String>,
    },

    /// Change fields of an existing reminder
    Update {
        /// Remote reminder id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        #[arg(long, value_parser = parse_datetime)]
        at: Option<DateTime<Utc>>,

        #[arg(long, short = 'f')]
        frequency: Option<Frequency>,

        #[arg(long, short = 'p')]
        priority: Option<Priority>,
    },

    /// Delete a reminder
    Delete {
        /// Remote reminder id
        id: String,
    },

    /// Mark a reminder completed
    Complete {
        /// Remote reminder id
        id: String,

        /// Mark it not completed instead
        #[arg(long)]
        undo: bool,
    },
}

/// Arguments for voice command.
#[derive(Args)]
pub struct VoiceArgs {
    #[command(subcommand)]
    pub command: VoiceCommands,
}

/// Voice subcommands.
#[derive(Subcommand)]
pub enum VoiceCommands {
    /// Speak text through the host speech command
    Say {
        /// Text to speak
        #[arg(required = true)]
        text: Vec<String>,

        /// Speech rate (clamped to the configured range)
        #[arg(long, short = 'r')]
        rate: Option<f32>,

        /// Print instead of speaking aloud
        #[arg(long)]
        captions: bool,
    },

    /// Dispatch a phrase to the stock command set
    Process {
        /// Recognized phrase
        #[arg(required = true)]
        text: Vec<String>,

        /// Print spoken feedback instead of speaking aloud
        #[arg(long)]
        captions: bool,
    },

    /// List the stock commands
    Commands {
        /// Only one category (navigation, accessibility, reminder, general)
        #[arg(long, short = 'c')]
        category: Option<CommandCategory>,
    },
}

/// Arguments for reminder command.
#[derive(Args)]
pub struct ReminderArgs {
    #[command(subcommand)]
    pub command: ReminderCommands,
}

/// Reminder subcommands.
#[derive(Subcommand)]
pub enum ReminderCommands {
    /// Show when a recurring reminder would fire next
    Preview {
        /// Reminder title
        title: String,

        /// First fire time
        #[arg(long, value_parser = parse_datetime)]
        at: DateTime<Utc>,

        /// Repeat rule
        #[arg(long, short = 'f', default_value = "once")]
        frequency: Frequency,

        /// How many fire times to show (1 to 366)
        #[arg(
            long,
            short = 'n',
            default_value_t = DEFAULT_OCCURRENCES,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new()
                .range(1..=MAX_OCCURRENCES as u64)
        )]
        count: usize,
    },
}

/// Parse a reminder time.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM` and `YYYY-MM-DD` (read as UTC), and
/// the words `now`, `today` and `tomorrow`.
///
/// # Errors
///
/// Returns a message naming the accepted formats if nothing matches.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "now" | "today" => return Ok(Utc::now()),
        "tomorrow" => return Ok(Utc::now() + Duration::days(1)),
        _ => {},
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(9, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(format!(
        "invalid time '{input}': use RFC 3339, YYYY-MM-DD HH:MM, YYYY-MM-DD, today or tomorrow"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use clap::Parser;

    // ==================== parse_datetime Tests ====================

    #[test]
    fn test_parse_datetime_rfc3339() {
        let dt = parse_datetime("2026-01-05T09:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 7);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_datetime_naive() {
        let dt = parse_datetime("2026-01-05 09:30").unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (5, 9, 30));
    }

    #[test]
    fn test_parse_datetime_date_only_is_morning() {
        let dt = parse_datetime("2026-03-01").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 1, 9));
    }

    #[test]
    fn test_parse_datetime_tomorrow() {
        let dt = parse_datetime("Tomorrow").unwrap();
        assert!(dt > Utc::now());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        let err = parse_datetime("next blue moon").unwrap_err();
        assert!(err.contains("next blue moon"));
    }

    // ==================== CLI Parsing Tests ====================

    #[test]
    fn test_cli_sync_status() {
        let cli = Cli::try_parse_from(["accessaid", "sync", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Sync(SyncArgs {
                command: SyncCommands::Status
            })
        ));
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["accessaid", "sync", "status", "-o", "json", "-v"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_sync_add_create() {
        let cli = Cli::try_parse_from([
            "accessaid",
            "sync",
            "add",
            "create",
            "Take pills",
            "--at",
            "2026-01-05 09:00",
            "--frequency",
            "daily",
            "--priority",
            "high",
        ])
        .unwrap();

        match cli.command {
            Commands::Sync(SyncArgs {
                command:
                    SyncCommands::Add {
                        operation:
                            QueueOperation::Create {
                                title,
                                frequency,
                                priority,
                                user,
                                ..
                            },
                    },
            }) => {
                assert_eq!(title, "Take pills");
                assert_eq!(frequency, Frequency::Daily);
                assert_eq!(priority, Priority::High);
                assert!(user.is_none());
            },
            _ => panic!("expected sync add create"),
        }
    }

    #[test]
    fn test_cli_sync_add_rejects_bad_frequency() {
        let result = Cli::try_parse_from([
            "accessaid", "sync", "add", "create", "x", "--at", "today", "-f", "hourly",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_voice_process_joins_words() {
        let cli = Cli::try_parse_from(["accessaid", "voice", "process", "go", "home"]).unwrap();
        match cli.command {
            Commands::Voice(VoiceArgs {
                command: VoiceCommands::Process { text, captions },
            }) => {
                assert_eq!(text.join(" "), "go home");
                assert!(!captions);
            },
            _ => panic!("expected voice process"),
        }
    }

    #[test]
    fn test_cli_voice_commands_category() {
        let cli =
            Cli::try_parse_from(["accessaid", "voice", "commands", "-c", "navigation"]).unwrap();
        match cli.command {
            Commands::Voice(VoiceArgs {
                command: VoiceCommands::Commands { category },
            }) => assert_eq!(category, Some(CommandCategory::Navigation)),
            _ => panic!("expected voice commands"),
        }
    }

    #[test]
    fn test_cli_reminder_preview_default_count() {
        let cli = Cli::try_parse_from([
            "accessaid", "reminder", "preview", "Walk", "--at", "2026-01-31", "-f", "monthly",
        ])
        .unwrap();
        match cli.command {
            Commands::Reminder(ReminderArgs {
                command: ReminderCommands::Preview { count, .. },
            }) => assert_eq!(count, DEFAULT_OCCURRENCES),
            _ => panic!("expected reminder preview"),
        }
    }

    #[test]
    fn test_cli_reminder_preview_count_bounds() {
        let preview = |count: &str| {
            Cli::try_parse_from([
                "accessaid", "reminder", "preview", "Walk", "--at", "2026-01-31", "-n", count,
            ])
        };
        assert!(preview("366").is_ok());
        assert!(preview("0").is_err());
        assert!(preview("367").is_err());
        assert!(preview("100000000").is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["accessaid"]).is_err());
    }
}
