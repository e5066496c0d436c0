// Connectivity probes: TCP connect round-trip and public IP lookup.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Port probed when the host has none; DNS is open on most gateways and resolvers.
const DEFAULT_PROBE_PORT: u16 = 53;

/// Measures TCP connect time to `host` in ms. A refused connection still
/// proves the host answered and counts as a round-trip.
pub async fn tcp_ping(host: &str, limit: Duration) -> Option<f64> {
    let target = if host.parse::<SocketAddr>().is_ok() || host.contains(':') {
        host.to_string()
    } else {
        format!("{}:{}", host, DEFAULT_PROBE_PORT)
    };
    let started = Instant::now();
    match timeout(limit, TcpStream::connect(&target)).await {
        Ok(Ok(_)) => Some(started.elapsed().as_secs_f64() * 1000.0),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            Some(started.elapsed().as_secs_f64() * 1000.0)
        }
        Ok(Err(e)) => {
            tracing::debug!(error = %e, host, "ping probe failed");
            None
        }
        Err(_) => {
            tracing::debug!(host, timeout_ms = limit.as_millis() as u64, "ping probe timed out");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct PublicIpResponse {
    ip: String,
}

/// Looks up the public address via an ipify-style `{"ip": "..."}` endpoint.
pub async fn fetch_public_ip(client: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    let resp: PublicIpResponse = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(resp.ip)
}
