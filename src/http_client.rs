use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client with connection pooling.
///
/// No overall request timeout: a portrait edit can take minutes and the
/// generation call waits for the transport to resolve or fail.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(concat!("hoodie-portrait/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});
