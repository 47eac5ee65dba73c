use tracing::{error, info};

/// User-facing surface: a blocking progress indicator and an alert dialog.
pub trait Notifier: Send + Sync {
    /// Opens the progress indicator with an initial message.
    fn show_progress(&self, message: &str);

    /// Reports transfer progress, 0-100.
    fn update_progress(&self, percent: u8);

    /// Closes the progress indicator.
    fn dismiss(&self);

    /// Shows a blocking error message.
    fn alert(&self, message: &str);
}

/// Notifier that writes everything to the log. Used by the CLI.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show_progress(&self, message: &str) {
        info!("⏳ {}", message);
    }

    fn update_progress(&self, percent: u8) {
        info!("📤 Uploading file, {}%", percent);
    }

    fn dismiss(&self) {}

    fn alert(&self, message: &str) {
        error!("❌ {}", message);
    }
}

/// Scoped ownership of the progress indicator.
///
/// The indicator is dismissed exactly once: either through [`ProgressGuard::dismiss`]
/// or, if the attempt unwinds first, when the guard is dropped.
pub struct ProgressGuard<'a> {
    notifier: &'a dyn Notifier,
    dismissed: bool,
}

impl<'a> ProgressGuard<'a> {
    pub fn show(notifier: &'a dyn Notifier, message: &str) -> Self {
        notifier.show_progress(message);
        Self {
            notifier,
            dismissed: false,
        }
    }

    pub fn dismiss(&mut self) {
        if !self.dismissed {
            self.dismissed = true;
            self.notifier.dismiss();
        }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.dismiss();
    }
}

pub(crate) fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) * 100) / total) as u8
}
