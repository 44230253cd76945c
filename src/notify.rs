//! Blocking user-facing alerts.

use log::info;

pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Prints alerts to stdout and mirrors them into the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        info!("🔔 [ALERT] {}", message);
        println!("{message}");
    }
}
