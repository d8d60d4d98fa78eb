//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! `Output` also acts as the store's notification sink, so success
//! messages requested by commands come out in the same format.

use chrono::{DateTime, Utc};
use taskline_core::{Entry, EntryStatus, Notification, NotificationKind, NotificationSink};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a single entry
    pub fn print_entry(&self, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", entry.id);
                println!("Status:      {}", entry.status);
                println!("Description: {}", entry.description);
                println!(
                    "Created:     {} ({})",
                    entry.created_at_utc().format("%Y-%m-%d %H:%M"),
                    format_age(entry.created_at_utc(), Utc::now())
                );
            }
            OutputFormat::Json => {
                println!("{}", to_json(entry));
            }
            OutputFormat::Quiet => {
                println!("{}", entry.id);
            }
        }
    }

    /// Print a flat list of entries
    pub fn print_entries(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries found.");
                    return;
                }
                let now = Utc::now();
                for entry in entries {
                    print_entry_line(entry, now);
                }
                println!("\n{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json => {
                println!("{}", to_json(entries));
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print entries grouped into one column per status
    pub fn print_board(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                let now = Utc::now();
                for status in EntryStatus::ALL {
                    let column: Vec<_> = entries.iter().filter(|e| e.status == status).collect();
                    println!("── {} ({}) ──", status_heading(status), column.len());
                    for entry in column {
                        print_entry_line(entry, now);
                    }
                    println!();
                }
                println!("{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json | OutputFormat::Quiet => self.print_entries(entries),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an error message to stderr
    pub fn error(&self, msg: &str, suggestion: Option<&str>) {
        match self.format {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({"status": "error", "message": msg, "suggestion": suggestion})
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                eprintln!("✗ {}", msg);
                if let Some(suggestion) = suggestion {
                    eprintln!("  {}", suggestion);
                }
            }
        }
    }
}

impl NotificationSink for Output {
    fn notify(&self, notification: Notification) {
        // A terminal line doesn't auto-dismiss; duration has no meaning here
        match notification.kind {
            NotificationKind::Success => self.success(&notification.message),
            NotificationKind::Info => self.message(&notification.message),
            NotificationKind::Error => self.error(&notification.message, None),
        }
    }
}

fn print_entry_line(entry: &Entry, now: DateTime<Utc>) {
    println!(
        "{} | {:<11} | {} | {}",
        short_id(entry.id.as_str()),
        entry.status,
        truncate(&entry.description, 45),
        format_age(entry.created_at_utc(), now)
    );
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn status_heading(status: EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => "Pending",
        EntryStatus::InProgress => "In progress",
        EntryStatus::Finished => "Finished",
    }
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

/// First 8 characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Relative age such as "5 minutes ago"
pub fn format_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created);

    let (value, unit) = if elapsed.num_seconds() < 60 {
        return "just now".to_string();
    } else if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    if first_line.chars().count() <= max_len && first_line.len() == s.len() {
        return s.to_string();
    }
    let kept: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("line one\nline two", 20), "line one...");
        assert_eq!(truncate("ñandú ñandú ñandú", 8), "ñandú...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("64b7f0c2a1d3"), "64b7f0c2");
        assert_eq!(short_id("42"), "42");
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(5), now), "just now");
        assert_eq!(format_age(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_age(now - Duration::minutes(17), now), "17 minutes ago");
        assert_eq!(format_age(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_age(now - Duration::days(2), now), "2 days ago");
        assert_eq!(format_age(now - Duration::days(65), now), "2 months ago");
        assert_eq!(format_age(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let now = Utc::now();
        assert_eq!(format_age(now + Duration::minutes(10), now), "just now");
    }

    #[test]
    fn test_status_heading_covers_all() {
        for status in EntryStatus::ALL {
            assert!(!status_heading(status).is_empty());
        }
    }
}
