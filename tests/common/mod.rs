//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use akinator_client::ReqwestTransport;

/// Start a mock backend that answers every request from `handler`.
///
/// The handler receives the request target (path and query) and returns a
/// status code and body. Returns the bound address.
pub async fn start_programmable_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        serve(socket, handler.as_ref()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend that returns a fixed response to every request.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| (status, body.to_string())).await
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn serve<F>(mut socket: TcpStream, handler: &F)
where
    F: Fn(&str) -> (u16, String),
{
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let (status, body) = handler(&target);
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Status",
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// A reqwest transport that never goes through a system proxy.
pub fn direct_transport() -> ReqwestTransport {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    ReqwestTransport::from_client(client)
}

/// One `INSTANCE` record of a directory document.
pub struct InstanceSpec<'a> {
    pub language: &'a str,
    pub subject: &'a str,
    pub base_id: &'a str,
    pub url: String,
    pub mirrors: Vec<String>,
}

/// Render a directory document.
pub fn directory_xml(instances: &[InstanceSpec<'_>]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><RESULT><COMPLETION>OK</COMPLETION><PARAMETERS>");
    for instance in instances {
        xml.push_str(&format!(
            "<INSTANCE><LANGUAGE><LANG_ID>{}</LANG_ID></LANGUAGE><SUBJECT><SUBJ_ID>{}</SUBJ_ID></SUBJECT><BASE_LOGIQUE_ID>{}</BASE_LOGIQUE_ID><URL_BASE_WS>{}</URL_BASE_WS><CANDIDATS>",
            instance.language, instance.subject, instance.base_id, instance.url
        ));
        for mirror in &instance.mirrors {
            xml.push_str(&format!("<URL>{}</URL>", mirror));
        }
        xml.push_str("</CANDIDATS></INSTANCE>");
    }
    xml.push_str("</PARAMETERS></RESULT>");
    xml
}
