//! # MorningPost Mail
//! Notifier implementations: SMTP for real delivery, console for previews.

pub mod console;
pub mod smtp;

pub use console::ConsoleNotifier;
pub use smtp::SmtpNotifier;
