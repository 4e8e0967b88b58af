//! Clients for a running tabshare server
//!
//! [`TabshareHttp`] issues one-shot requests; [`SessionSocket`] follows a
//! session over its WebSocket.

mod connection;
mod http;

pub use connection::SessionSocket;
pub use http::TabshareHttp;

/// Turn an `http(s)://` base URL into the matching `ws(s)://` one
pub fn ws_base_url(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        format!("ws://{}", base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_base_url() {
        assert_eq!(ws_base_url("http://127.0.0.1:7450"), "ws://127.0.0.1:7450");
        assert_eq!(ws_base_url("https://tab.example/"), "wss://tab.example");
        assert_eq!(ws_base_url("localhost:7450"), "ws://localhost:7450");
    }
}
