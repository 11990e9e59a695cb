/// Entry point for the Docker exporter.
///
/// Reads its configuration from the environment and serves `/metrics` until
/// interrupted. Log verbosity is controlled through `RUST_LOG`.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info DOCKER_HOST=unix:///var/run/docker.sock LISTEN_ADDR=0.0.0.0:924 cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = docker_exporter::config::Config::from_env()?;
    docker_exporter::run(config).await
}
