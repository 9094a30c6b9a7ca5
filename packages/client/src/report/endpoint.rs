//! Report collection endpoints

use serde::{Deserialize, Serialize};

/// One candidate report-collection endpoint.
///
/// `address` is a host, optionally followed by `:port`; requests are always
/// sent over HTTPS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    #[serde(default)]
    pub is_proxy: bool,
    #[serde(default)]
    pub use_pinned_certificate: bool,
    #[serde(default)]
    pub pinned_common_name: Option<String>,
}

impl Endpoint {
    /// An endpoint validated by the system trust store.
    pub fn new(address: impl Into<String>) -> Self {
        Endpoint {
            address: address.into(),
            is_proxy: false,
            use_pinned_certificate: false,
            pinned_common_name: None,
        }
    }

    /// An endpoint whose certificate must chain to the pinned certificate
    /// and present `common_name`.
    pub fn pinned(address: impl Into<String>, common_name: impl Into<String>) -> Self {
        Endpoint {
            address: address.into(),
            is_proxy: false,
            use_pinned_certificate: true,
            pinned_common_name: Some(common_name.into()),
        }
    }

    #[must_use]
    pub fn proxy(mut self) -> Self {
        self.is_proxy = true;
        self
    }

    /// Host part of `address`, without any port suffix.
    #[must_use]
    pub fn hostname(&self) -> &str {
        let address = self.address.as_str();
        if let Some(rest) = address.strip_prefix('[') {
            // bracketed IPv6 literal
            return rest.split(']').next().unwrap_or(rest);
        }
        match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
                host
            }
            _ => address,
        }
    }

    /// The pinned common name, if pinning is requested and it is non-empty.
    #[must_use]
    pub fn common_name(&self) -> Option<&str> {
        self.pinned_common_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// Source of the ordered endpoint list, queried once per submission.
pub trait EndpointProvider: Send + Sync {
    fn endpoints(&self) -> Vec<Endpoint>;
}

impl EndpointProvider for Vec<Endpoint> {
    fn endpoints(&self) -> Vec<Endpoint> {
        self.clone()
    }
}

impl EndpointProvider for [Endpoint] {
    fn endpoints(&self) -> Vec<Endpoint> {
        self.to_vec()
    }
}
