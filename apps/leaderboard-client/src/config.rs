//! Client configuration from environment variables.

/// Default viewer endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost:4000/ws";

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket endpoint of the leaderboard server.
    pub ws_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from `LEADERBOARD_WS_URL`, falling back to the default for an
    /// unset or blank value.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_url(std::env::var("LEADERBOARD_WS_URL").ok())
    }

    fn from_url(url: Option<String>) -> Self {
        url.map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map_or_else(Self::default, |ws_url| Self { ws_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_uses_default() {
        assert_eq!(ClientConfig::from_url(None).ws_url, DEFAULT_WS_URL);
    }

    #[test]
    fn blank_uses_default() {
        assert_eq!(
            ClientConfig::from_url(Some("   ".to_string())).ws_url,
            DEFAULT_WS_URL
        );
    }

    #[test]
    fn explicit_url_is_trimmed() {
        let config = ClientConfig::from_url(Some(" ws://example.test:9000/ws ".to_string()));
        assert_eq!(config.ws_url, "ws://example.test:9000/ws");
    }
}
