/// Errors returned by the container runtime client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid runtime endpoint `{0}`: expected `unix://<path>`, `tcp://<host:port>` or `http://<host:port>`")]
    InvalidEndpoint(String),
    #[error("failed to connect to runtime at `{endpoint}`: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build request for `{path}`: {source}")]
    InvalidRequest {
        path: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("runtime request failed: {0}")]
    Request(#[source] hyper::Error),
    #[error("runtime responded with status {status}: {message}")]
    Status {
        status: hyper::StatusCode,
        message: String,
    },
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("runtime did not respond before the scrape deadline")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
