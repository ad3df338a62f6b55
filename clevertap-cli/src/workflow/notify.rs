//! User-visible notifications
//!
//! Controllers never print; they emit [`Notification`] values through the
//! [`Notifier`] seam. The CLI renders them to the terminal, tests record
//! them for assertions.

use std::fmt;

use chrono::{DateTime, Utc};
use colored::Colorize;
use log::info;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One user-visible message with a title, body, and severity
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            at: Utc::now(),
        }
    }
}

/// Sink for notifications emitted by the workflow controllers
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn info(&self, title: &str, message: &str) {
        self.notify(Notification::new(title, message, Severity::Info));
    }

    fn success(&self, title: &str, message: &str) {
        self.notify(Notification::new(title, message, Severity::Success));
    }

    fn warning(&self, title: &str, message: &str) {
        self.notify(Notification::new(title, message, Severity::Warning));
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(Notification::new(title, message, Severity::Error));
    }
}

/// Renders notifications to the terminal
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        info!(
            "notification [{}] {}: {}",
            notification.severity, notification.title, notification.message
        );
        let title = match notification.severity {
            Severity::Info => notification.title.cyan().bold(),
            Severity::Success => notification.title.green().bold(),
            Severity::Warning => notification.title.yellow().bold(),
            Severity::Error => notification.title.red().bold(),
        };
        println!("{}: {}", title, notification.message);
    }
}
