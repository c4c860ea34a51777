//! Shared utilities for launcher integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vllm_launcher::config::SupervisionPolicy;
use vllm_launcher::LauncherConfig;

/// Reserve a loopback port that is free right now.
#[allow(dead_code)]
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Start a programmable mock HTTP server standing in for the inference server.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Config whose children are `sh -c` scripts. Generated flags land in the
/// scripts' positional parameters (`$1`, `$2`, ...).
#[allow(dead_code)]
pub fn scripted_config(inference_script: &str, adapter_script: &str) -> LauncherConfig {
    let mut config = LauncherConfig::default();
    config.inference.program = "sh".into();
    config.inference.args = vec!["-c".into(), inference_script.into(), "inference".into()];
    config.adapter.program = "sh".into();
    config.adapter.args = vec!["-c".into(), adapter_script.into(), "adapter".into()];
    config.readiness.startup_delay_secs = 0;
    config.supervision.policy = SupervisionPolicy::None;
    config.supervision.shutdown_grace_secs = 5;
    config
}
