// =============================================================================
// Alerts Module
// =============================================================================
//
// Everything between "signals fired" and "email delivered": the
// at-most-one-notification-per-symbol-per-day log, its on-disk persistence,
// the outbound message format, and the SMTP transport.

pub mod log;
pub mod message;
pub mod notifier;
pub mod store;

pub use log::{AlertEngine, AlertOutcome, AlertRecord, AlertSummary};
pub use notifier::{Notifier, SmtpNotifier};
pub use store::{AlertStore, JsonFileStore};
