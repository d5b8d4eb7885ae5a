//! Remote modules against a throwaway HTTP endpoint

use std::sync::{Arc, Mutex};

use overseer_core::{scoped, Invocation, LatencySource, Module, Params, RemoteModule, Stage, SupervisorError};
use overseer_infra_http::{HttpClientConfig, ReqwestHttpClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const PING_END_OFFSET: i64 = 500;

/// Minimal HTTP/1.1 endpoint recording request targets (`/path?query`)
struct TestEndpoint {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestEndpoint {
    /// `/test_connection` answers `probe_status`; with 200 it echoes
    /// `ping_end = ping_start + PING_END_OFFSET`. Any other path answers 200.
    async fn start(probe_status: u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    handle(socket, probe_status, recorded).await;
                });
            }
        });

        Self { port, requests }
    }

    fn module(&self) -> RemoteModule {
        let http = ReqwestHttpClient::new(HttpClientConfig::default()).unwrap();
        RemoteModule::new("http://127.0.0.1", self.port.to_string(), Arc::new(http))
            .with_commands(["ping"])
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(mut socket: TcpStream, probe_status: u16, recorded: Arc<Mutex<Vec<String>>>) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head).to_string();
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    recorded.lock().unwrap().push(target.clone());

    let (status, body) = if target.starts_with("/test_connection") {
        let ping_start: i64 = target
            .split(['?', '&'])
            .find_map(|pair| pair.strip_prefix("ping_start="))
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let body = serde_json::json!({ "ping_end": ping_start + PING_END_OFFSET }).to_string();
        (probe_status, body)
    } else {
        (200, "{}".to_string())
    };

    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

#[tokio::test]
async fn test_permitted_and_unpermitted_commands() {
    let endpoint = TestEndpoint::start(200).await;
    let mut module = endpoint.module();

    let mut params = Params::new();
    params.insert("level".to_string(), "2".to_string());

    assert!(module.run(Invocation::command("ping", params)).await.unwrap());
    assert!(!module
        .run(Invocation::command("shutdown", Params::new()))
        .await
        .unwrap());

    assert_eq!(endpoint.requests(), vec!["/ping?level=2".to_string()]);
}

#[tokio::test]
async fn test_check_connection_uses_server_ping_end() {
    let endpoint = TestEndpoint::start(200).await;
    let module = endpoint.module();

    let latency = module.check_connection(true).await.unwrap();

    assert_eq!(latency.source, LatencySource::Server);
    assert_eq!(latency.nanos, PING_END_OFFSET);

    let requests = endpoint.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/test_connection?"));
    assert!(requests[0].contains("notify=true"));
}

#[tokio::test]
async fn test_scope_probes_then_dispatches() {
    let endpoint = TestEndpoint::start(200).await;
    let mut module = endpoint.module();

    let dispatched = scoped(&mut module, |m| {
        Box::pin(async move {
            assert_eq!(m.stage(), Stage::Started);
            m.run(Invocation::command("ping", Params::new())).await
        })
    })
    .await
    .unwrap();

    assert!(dispatched);
    assert_eq!(module.stage(), Stage::Stopped);

    let requests = endpoint.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("/test_connection?"));
    assert_eq!(requests[1], "/ping");
}

#[tokio::test]
async fn test_failed_probe_aborts_scope_entry() {
    let endpoint = TestEndpoint::start(503).await;
    let mut module = endpoint.module();

    let result = scoped(&mut module, |m| {
        Box::pin(async move { m.run(Invocation::command("ping", Params::new())).await })
    })
    .await;

    assert!(matches!(result, Err(SupervisorError::HttpStatus { status: 503, .. })));
    assert_eq!(endpoint.requests().len(), 1, "body must not run");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let http = ReqwestHttpClient::new(HttpClientConfig::default()).unwrap();
    let module = RemoteModule::new("http://127.0.0.1", port.to_string(), Arc::new(http));

    let err = module.check_connection(true).await.unwrap_err();

    assert!(matches!(err, SupervisorError::Transport(_)));
    assert!(err.is_remote_failure());
}
