//! Log providers: named sources of one diagnostic payload each

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of payload a provider contributes. At most one provider per
/// kind may be registered with a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    UserSettings,
    LastKnownException,
    RegionInfo,
    LoggingInfo,
    AppInfo,
    DeviceInfo,
    ProtocolInfo,
}

impl ProviderKind {
    /// Human readable name used in error attribution.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::UserSettings => "User Settings",
            ProviderKind::LastKnownException => "Last Known Exception",
            ProviderKind::RegionInfo => "Region Information",
            ProviderKind::LoggingInfo => "Logging Information",
            ProviderKind::AppInfo => "Application Information",
            ProviderKind::DeviceInfo => "Device Information",
            ProviderKind::ProtocolInfo => "Protocol Information",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Category the server files an attachment under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    Diagnostic,
    Crash,
    Log,
}

impl ReportCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportCategory::Diagnostic => "diagnostic",
            ReportCategory::Crash => "crash",
            ReportCategory::Log => "log",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source of one diagnostic attachment.
///
/// `value` is read at submission time, so implementations may compute it
/// lazily from live state.
pub trait LogProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether the payload is user data persisted on the device. Such
    /// providers are skipped unless the caller opts into sending it.
    fn is_persisted_data(&self) -> bool;

    fn filename(&self) -> Option<String>;

    fn report_category(&self) -> ReportCategory;

    fn value(&self) -> Option<String>;
}

/// Attribution string attached to every error produced for a provider.
pub fn provider_context(provider: &dyn LogProvider) -> String {
    format!(
        "provider for '{}' (filename: {}, report: {})",
        provider.kind().display_name(),
        provider.filename().as_deref().unwrap_or("null"),
        provider.report_category().as_str(),
    )
}

/// A provider with a fixed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticLogProvider {
    pub kind: ProviderKind,
    pub is_persisted_data: bool,
    pub filename: Option<String>,
    pub report_category: ReportCategory,
    pub value: Option<String>,
}

impl StaticLogProvider {
    pub fn new(
        kind: ProviderKind,
        filename: impl Into<String>,
        report_category: ReportCategory,
        value: impl Into<String>,
    ) -> Self {
        StaticLogProvider {
            kind,
            is_persisted_data: false,
            filename: Some(filename.into()),
            report_category,
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub fn persisted(mut self) -> Self {
        self.is_persisted_data = true;
        self
    }
}

impl LogProvider for StaticLogProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_persisted_data(&self) -> bool {
        self.is_persisted_data
    }

    fn filename(&self) -> Option<String> {
        self.filename.clone()
    }

    fn report_category(&self) -> ReportCategory {
        self.report_category
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }
}
