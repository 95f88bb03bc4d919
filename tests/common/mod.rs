//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use security_gateway::config::GatewayConfig;
use security_gateway::http::GatewayServer;
use security_gateway::lifecycle::Shutdown;

/// Programmable stand-in for the backend platform.
///
/// Speaks just enough HTTP/1.1 to satisfy the gateway's identity,
/// log store and storage clients.
#[allow(dead_code)]
pub struct MockBackend {
    pub addr: SocketAddr,
    /// Calls to the identity endpoint.
    pub identity_calls: Arc<AtomicU32>,
    /// Rows appended to the audit log table.
    pub audit_appends: Arc<AtomicU32>,
    /// Raw JSON bodies of appended audit rows, in arrival order.
    pub audit_bodies: Arc<Mutex<Vec<String>>>,
    /// When false, every bearer token is rejected with 401.
    pub accept_tokens: Arc<AtomicBool>,
}

pub async fn start_mock_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let identity_calls = Arc::new(AtomicU32::new(0));
    let audit_appends = Arc::new(AtomicU32::new(0));
    let audit_bodies = Arc::new(Mutex::new(Vec::new()));
    let accept_tokens = Arc::new(AtomicBool::new(true));

    let ic = identity_calls.clone();
    let aa = audit_appends.clone();
    let ab = audit_bodies.clone();
    let at = accept_tokens.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let ic = ic.clone();
                    let aa = aa.clone();
                    let ab = ab.clone();
                    let at = at.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status_line, content_type, body) = if path.starts_with("/auth/v1/user")
                        {
                            ic.fetch_add(1, Ordering::SeqCst);
                            if at.load(Ordering::SeqCst) {
                                ("200 OK", "application/json", r#"{"id":"user-123"}"#.to_string())
                            } else {
                                (
                                    "401 Unauthorized",
                                    "application/json",
                                    r#"{"message":"invalid token"}"#.to_string(),
                                )
                            }
                        } else if path.starts_with("/rest/v1/security_audit_log") {
                            aa.fetch_add(1, Ordering::SeqCst);
                            let row = request
                                .split_once("\r\n\r\n")
                                .map(|(_, body)| body.to_string())
                                .unwrap_or_default();
                            ab.lock().unwrap().push(row);
                            ("201 Created", "application/json", String::new())
                        } else if path.starts_with("/storage/v1/object/reports/") {
                            ("200 OK", "application/pdf", "quarterly report bytes".to_string())
                        } else if path.starts_with("/storage/v1/object/") {
                            (
                                "404 Not Found",
                                "application/json",
                                r#"{"message":"object not found"}"#.to_string(),
                            )
                        } else {
                            ("404 Not Found", "application/json", String::new())
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            content_type,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend {
        addr,
        identity_calls,
        audit_appends,
        audit_bodies,
        accept_tokens,
    }
}

/// Read one HTTP request: headers plus a Content-Length body if present.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                data.extend_from_slice(&buf[..n]);
                if let Some(head_end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&data[..head_end]);
                    let content_length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            if name.eq_ignore_ascii_case("content-length") {
                                value.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    if data.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Gateway wired to a mock backend, listening on an ephemeral port.
pub struct TestGateway {
    pub url: String,
    pub backend: MockBackend,
    pub shutdown: Shutdown,
}

pub async fn spawn_gateway(configure: impl FnOnce(&mut GatewayConfig)) -> TestGateway {
    let backend = start_mock_backend().await;

    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.base_url = format!("http://{}", backend.addr);
    config.backend.service_key = "test-service-key".into();
    config.encryption.key_hex = "2b".repeat(32);
    configure(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let server = GatewayServer::new(config, client);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestGateway {
        url: format!("http://{}", addr),
        backend,
        shutdown,
    }
}
