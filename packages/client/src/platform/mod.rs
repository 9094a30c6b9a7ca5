//! Platform data collaborators
//!
//! Sources for the user-settings and last-known-exception attachments.

pub mod panic_hook;
pub mod providers;
pub mod store;

pub use panic_hook::install_panic_hook;
pub use providers::{LastKnownExceptionProvider, UserSettingsProvider};
pub use store::{LAST_KNOWN_EXCEPTION_KEY, PlatformError, PreferenceStore};

/// Read access to persisted platform state.
pub trait PlatformData: Send + Sync {
    /// Every stored setting rendered as `"\n<key>: <value>"` lines.
    fn user_settings(&self) -> String;

    /// The last captured crash, or an empty string.
    fn last_known_exception(&self) -> String;
}
