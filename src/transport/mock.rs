//! Scripted transport for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::transport::{HttpResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail,
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

/// Answers requests from a per-URL script and records every call.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
        self.set_response(url, status, body);
        self
    }

    pub fn fail(self, url: &str) -> Self {
        self.set_failure(url);
        self
    }

    /// Delay every reply on `url`; the delay honors cancellation.
    pub fn delay(self, url: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.lock().unwrap().get_mut(url) {
            route.delay = Some(delay);
        }
        self
    }

    pub fn set_response(&self, url: &str, status: u16, body: &str) {
        self.set_reply(url, Reply::Respond(HttpResponse::new(status, body)));
    }

    pub fn set_failure(&self, url: &str) {
        self.set_reply(url, Reply::Fail);
    }

    fn set_reply(&self, url: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap();
        let delay = routes.get(url).and_then(|r| r.delay);
        routes.insert(url.to_string(), Route { reply, delay });
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        self.calls.lock().unwrap().push(url.to_string());

        let route = self.routes.lock().unwrap().get(url).cloned();
        let Some(route) = route else {
            return Err(TransportError::Request {
                url: url.to_string(),
                message: "no scripted reply".to_string(),
            });
        };

        if let Some(delay) = route.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            }
        }

        match route.reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail => Err(TransportError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}
