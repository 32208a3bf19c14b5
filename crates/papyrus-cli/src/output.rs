//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Plain lists print one item per line in both human and quiet mode, and
//! nothing at all when empty, so `papyrus list` output can be piped.

use papyrus_core::Entry;
use serde_yaml::Value;

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

    /// Print a list of plain values (keys, authors, titles, tags)
    pub fn print_list(&self, items: &[String]) {
        match self.format {
            OutputFormat::Human | OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!(items));
            }
        }
    }

    /// Print a single entry
    pub fn print_entry(&self, key: &str, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                println!("Key:      {}", key);
                if let Some(ref title) = entry.title {
                    println!("Title:    {}", title);
                }
                if !entry.authors().is_empty() {
                    println!("Author:   {}", entry.authors().join(", "));
                }
                for (name, value) in &entry.extra {
                    println!(
                        "{:<9} {}",
                        format!("{}:", format_value(name)),
                        format_value(value)
                    );
                }
            }
            OutputFormat::Json => {
                let mut json = serde_json::to_value(entry).unwrap_or_default();
                if let Some(map) = json.as_object_mut() {
                    map.insert("key".to_string(), serde_json::json!(key));
                }
                println!("{}", json);
            }
            OutputFormat::Quiet => {
                println!("{}", key);
            }
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
}

/// Render an uninterpreted field value on one line
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
