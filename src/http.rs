use std::time::Duration;

/// Builds the client shared by every request of a run. `timeout` bounds each
/// request from connect until its body has been read.
///
/// # Errors
///
/// Fails if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration, trace: bool) -> reqwest::Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connection_verbose(trace)
        .build()
}
