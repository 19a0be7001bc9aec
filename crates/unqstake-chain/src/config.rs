//! Service endpoints per network.
//!
//! - SDK REST: balances, chain queries and extrinsic build/submit
//! - Indexer: extrinsic and event search for history
//! - Explorer: human-facing transaction links

use std::time::Duration;

use unqstake_core::Network;

/// Timeout applied to every HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn default_sdk_url(network: Network) -> &'static str {
    match network {
        Network::Unique => "https://rest.unique.network/unique/v1",
        Network::Quartz => "https://rest.unique.network/quartz/v1",
    }
}

pub fn default_indexer_url(network: Network) -> &'static str {
    match network {
        Network::Unique => "https://api-unique.uniquescan.io/v2",
        Network::Quartz => "https://api-quartz.uniquescan.io/v2",
    }
}

/// Explorer link for a transaction. Quartz has no subscan deployment and
/// links to the block in polkadot.js apps instead.
pub fn explorer_url(network: Network, extrinsic_hash: &str, block_number: u64) -> String {
    match network {
        Network::Unique => format!("https://unique.subscan.io/extrinsic/{extrinsic_hash}?tab=event"),
        Network::Quartz => format!(
            "https://polkadot.js.org/apps/?rpc=wss://ws-quartz.unique.network#/explorer/query/{block_number}"
        ),
    }
}

/// Resolved endpoints for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub network: Network,
    pub sdk_url: String,
    pub indexer_url: String,
    pub request_timeout: Duration,
}

impl Endpoints {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            sdk_url: default_sdk_url(network).to_string(),
            indexer_url: default_indexer_url(network).to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the SDK URL when one is given.
    pub fn with_sdk_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.sdk_url = url;
        }
        self
    }

    /// Override the indexer URL when one is given.
    pub fn with_indexer_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.indexer_url = url;
        }
        self
    }
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_defaults() {
        let endpoints = Endpoints::for_network(Network::Quartz);
        assert_eq!(endpoints.sdk_url, "https://rest.unique.network/quartz/v1");
        assert_eq!(endpoints.indexer_url, "https://api-quartz.uniquescan.io/v2");
    }

    #[test]
    fn test_endpoints_overrides() {
        let endpoints = Endpoints::for_network(Network::Unique)
            .with_sdk_url(Some("http://localhost:3000".to_string()))
            .with_indexer_url(None);
        assert_eq!(endpoints.sdk_url, "http://localhost:3000");
        assert_eq!(endpoints.indexer_url, "https://api-unique.uniquescan.io/v2");
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(
            explorer_url(Network::Unique, "0xabc", 5),
            "https://unique.subscan.io/extrinsic/0xabc?tab=event"
        );
        assert!(explorer_url(Network::Quartz, "0xabc", 5).ends_with("/explorer/query/5"));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a/v2/", "/events"), "http://a/v2/events");
        assert_eq!(join_url("http://a/v2", "events"), "http://a/v2/events");
    }
}
