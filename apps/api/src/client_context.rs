use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};

/// Identity key used when neither a forwarded address nor a peer address is
/// known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Caller details resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    /// Key attempts are counted against.
    pub identity_key: String,
    /// Caller address, when one could be determined.
    pub ip_address: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
}

impl ClientContext {
    /// Resolves the caller from the first `x-forwarded-for` entry, then the
    /// peer socket address.
    pub fn resolve(headers: &HeaderMap, extensions: &Extensions) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .or_else(|| {
                extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(address)| address.ip().to_string())
            });

        let user_agent = headers
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);

        Self {
            identity_key: ip_address
                .clone()
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned()),
            ip_address,
            user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::extract::ConnectInfo;
    use axum::http::{Extensions, HeaderMap, HeaderValue};

    use super::{ClientContext, UNKNOWN_CLIENT};

    #[test]
    fn forwarded_header_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.9 , 10.0.0.1"),
        );
        headers.insert("user-agent", HeaderValue::from_static("curl/8.5.0"));
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40_000))));

        let context = ClientContext::resolve(&headers, &extensions);

        assert_eq!(context.identity_key, "203.0.113.9");
        assert_eq!(context.user_agent.as_deref(), Some("curl/8.5.0"));
    }

    #[test]
    fn falls_back_to_peer_address_then_unknown() {
        let headers = HeaderMap::new();
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 5_000))));

        let from_peer = ClientContext::resolve(&headers, &extensions);
        let unknown = ClientContext::resolve(&headers, &Extensions::new());

        assert_eq!(from_peer.identity_key, "192.0.2.4");
        assert_eq!(unknown.identity_key, UNKNOWN_CLIENT);
        assert_eq!(unknown.ip_address, None);
    }
}
