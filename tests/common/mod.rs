//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const MOCK_WEATHER: &str = r#"{"weather":{"summary":"Clear","temperature_c":25,"humidity":40,"wind_kmph":5},"timestamp":"2024-01-01T00:00"}"#;

/// Start a programmable mock HTTP server on an ephemeral port.
///
/// The handler receives the request target (path and query) and returns
/// the status code and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await;
                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_target(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf)
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string()
}

pub fn geocoding_body() -> String {
    json!({
        "results": [
            {"name": "Rajkot", "country": "India", "latitude": 22.3, "longitude": 70.78}
        ]
    })
    .to_string()
}

pub fn forecast_body() -> String {
    json!({
        "current_weather": {
            "time": "2024-01-01T12:00",
            "temperature": 28.4,
            "windspeed": 11.2,
            "weathercode": 1
        },
        "hourly": {"relativehumidity_2m": [55, 57]}
    })
    .to_string()
}

/// Mock Open-Meteo serving `/v1/search` and `/v1/forecast`, delaying the
/// forecast by `forecast_delay`.
pub async fn start_open_meteo(forecast_delay: Duration) -> SocketAddr {
    start_programmable_backend(move |target| async move {
        if target.starts_with("/v1/search") {
            (200, geocoding_body())
        } else if target.starts_with("/v1/forecast") {
            tokio::time::sleep(forecast_delay).await;
            (200, forecast_body())
        } else {
            (404, String::new())
        }
    })
    .await
}

/// Weather section for the live backend pointed at a mock server.
pub fn live_weather(addr: SocketAddr) -> Value {
    json!({
        "geocoding_endpoint": format!("http://{addr}/v1/search"),
        "forecast_endpoint": format!("http://{addr}/v1/forecast"),
        "timeout_seconds": 2,
        "max_retries": 2,
        "backoff_base_ms": 10,
        "backoff_step_ms": 10,
        "backoff_max_ms": 50
    })
}

pub fn write_mock_data(dir: &Path) -> PathBuf {
    let path = dir.join("mock.json");
    fs::write(&path, MOCK_WEATHER).unwrap();
    path
}

/// Write `settings.json` into `dir`, logging to `dir/app.log`.
pub fn write_config(dir: &Path, mode: &str, weather: Value) -> PathBuf {
    write_config_value(
        dir,
        &json!({
            "mode": mode,
            "weather": weather,
            "logging": {"level": "INFO", "path": dir.join("app.log")}
        }),
    )
}

pub fn write_config_value(dir: &Path, document: &Value) -> PathBuf {
    let path = dir.join("settings.json");
    fs::write(&path, serde_json::to_string_pretty(document).unwrap()).unwrap();
    path
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
