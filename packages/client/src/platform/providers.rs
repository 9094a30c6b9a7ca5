//! Log providers backed by [`PlatformData`]

use std::sync::Arc;

use super::PlatformData;
use crate::report::{LogProvider, ProviderKind, ReportCategory};

/// Uploads the rendered user settings. Persisted data.
#[derive(Clone)]
pub struct UserSettingsProvider {
    platform: Arc<dyn PlatformData>,
    filename: String,
}

impl UserSettingsProvider {
    pub fn new(platform: Arc<dyn PlatformData>) -> Self {
        Self::with_filename(platform, "user_settings")
    }

    pub fn with_filename(platform: Arc<dyn PlatformData>, filename: impl Into<String>) -> Self {
        Self {
            platform,
            filename: filename.into(),
        }
    }
}

impl LogProvider for UserSettingsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::UserSettings
    }

    fn is_persisted_data(&self) -> bool {
        true
    }

    fn filename(&self) -> Option<String> {
        Some(self.filename.clone())
    }

    fn report_category(&self) -> ReportCategory {
        ReportCategory::Diagnostic
    }

    fn value(&self) -> Option<String> {
        Some(self.platform.user_settings())
    }
}

/// Uploads the last captured panic. Persisted data.
#[derive(Clone)]
pub struct LastKnownExceptionProvider {
    platform: Arc<dyn PlatformData>,
    filename: String,
}

impl LastKnownExceptionProvider {
    pub fn new(platform: Arc<dyn PlatformData>) -> Self {
        Self::with_filename(platform, "last_known_exception")
    }

    pub fn with_filename(platform: Arc<dyn PlatformData>, filename: impl Into<String>) -> Self {
        Self {
            platform,
            filename: filename.into(),
        }
    }
}

impl LogProvider for LastKnownExceptionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LastKnownException
    }

    fn is_persisted_data(&self) -> bool {
        true
    }

    fn filename(&self) -> Option<String> {
        Some(self.filename.clone())
    }

    fn report_category(&self) -> ReportCategory {
        ReportCategory::Crash
    }

    fn value(&self) -> Option<String> {
        Some(self.platform.last_known_exception())
    }
}
