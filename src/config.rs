//! Startup configuration, read once from the process environment.
//!
//! | Variable              | Default                       |
//! |-----------------------|-------------------------------|
//! | `DOCKER_HOST`         | `unix:///var/run/docker.sock` |
//! | `DOCKER_API_VERSION`  | `1.41`                        |
//! | `LISTEN_ADDR`         | `0.0.0.0:924`                 |
//! | `SCRAPE_TIMEOUT_SECS` | `0` (no deadline)             |

use std::net::SocketAddr;
use std::time::Duration;

use crate::runtime::{self, DEFAULT_API_VERSION, Endpoint};

pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:924";
/// `0` disables the per-scrape deadline.
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 0;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid `DOCKER_HOST`: {0}")]
    Endpoint(#[source] runtime::Error),
    #[error("invalid `DOCKER_API_VERSION` `{0}`: expected `<major>.<minor>`")]
    ApiVersion(String),
    #[error("invalid `LISTEN_ADDR` `{value}`: {source}")]
    ListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid `SCRAPE_TIMEOUT_SECS` `{value}`: {source}")]
    ScrapeTimeout {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the container runtime API is served.
    pub endpoint: Endpoint,
    /// Engine API version, used as the `/v<version>` request prefix.
    pub api_version: String,
    /// Address the `/metrics` endpoint listens on.
    pub listen_addr: SocketAddr,
    /// Deadline for one scrape; `None` means no deadline.
    pub scrape_timeout: Option<Duration>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let endpoint = var("DOCKER_HOST", DEFAULT_DOCKER_HOST)
            .parse::<Endpoint>()
            .map_err(Error::Endpoint)?;

        let api_version = var("DOCKER_API_VERSION", DEFAULT_API_VERSION);
        let api_version = api_version
            .strip_prefix('v')
            .unwrap_or(&api_version)
            .to_owned();
        if !is_api_version(&api_version) {
            return Err(Error::ApiVersion(api_version));
        }

        let listen_addr = var("LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|source| Error::ListenAddr {
                value: listen_addr.clone(),
                source,
            })?;

        let timeout = var(
            "SCRAPE_TIMEOUT_SECS",
            &DEFAULT_SCRAPE_TIMEOUT_SECS.to_string(),
        );
        let timeout = timeout
            .parse::<u64>()
            .map_err(|source| Error::ScrapeTimeout {
                value: timeout.clone(),
                source,
            })?;
        let scrape_timeout = (timeout > 0).then(|| Duration::from_secs(timeout));

        Ok(Self {
            endpoint,
            api_version,
            listen_addr,
            scrape_timeout,
        })
    }
}

fn is_api_version(src: &str) -> bool {
    match src.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
