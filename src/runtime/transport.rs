use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{Error, Result};

/// Address of the container runtime API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A Unix domain socket, e.g. `/var/run/docker.sock`.
    Unix(PathBuf),
    /// A `host:port` pair reached over plain TCP.
    Tcp(String),
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Parses a `DOCKER_HOST`-style address.
    ///
    /// Accepts `unix://<path>`, `tcp://<host:port>` and `http://<host:port>`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(Error::InvalidEndpoint(s.to_owned()));
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }

        let addr = s
            .strip_prefix("tcp://")
            .or_else(|| s.strip_prefix("http://"))
            .map(|addr| addr.trim_end_matches('/'))
            .ok_or_else(|| Error::InvalidEndpoint(s.to_owned()))?;
        if addr.is_empty() || addr.contains('/') {
            return Err(Error::InvalidEndpoint(s.to_owned()));
        }

        Ok(Endpoint::Tcp(addr.to_owned()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

impl Endpoint {
    /// Sends a single request over a fresh connection and reads the whole response body.
    ///
    /// The connection is torn down before returning, on success as well as on
    /// error or when the returned future is dropped.
    pub(super) async fn send(&self, request: Request<Empty<Bytes>>) -> Result<Response<Bytes>> {
        log::trace!("{} {} via {}", request.method(), request.uri(), self);
        match self {
            Endpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(|source| self.connect_error(source))?;
                send_over(stream, request).await
            }
            Endpoint::Tcp(addr) => {
                let stream = tokio::net::TcpStream::connect(addr.as_str())
                    .await
                    .map_err(|source| self.connect_error(source))?;
                send_over(stream, request).await
            }
        }
    }

    fn connect_error(&self, source: std::io::Error) -> Error {
        Error::Connect {
            endpoint: self.to_string(),
            source,
        }
    }
}

/// Aborts the task driving a client connection when dropped.
struct ConnectionGuard(tokio::task::JoinHandle<()>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn send_over<S>(stream: S, request: Request<Empty<Bytes>>) -> Result<Response<Bytes>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(Error::Request)?;
    let _guard = ConnectionGuard(tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::debug!("runtime connection closed with error: {}", err);
        }
    }));

    let response = sender.send_request(request).await.map_err(Error::Request)?;
    let (parts, body) = response.into_parts();
    let body = body.collect().await.map_err(Error::Request)?.to_bytes();

    Ok(Response::from_parts(parts, body))
}
