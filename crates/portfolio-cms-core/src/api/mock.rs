//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::transport::{Method, OutgoingRequest, Transport, TransportResponse};
use super::ApiError;

enum Scripted {
    Respond(TransportResponse),
    Fail(ApiError),
    Hang,
}

struct Route {
    method: Method,
    path: String,
    response: TransportResponse,
}

/// Answers requests from fixed routes first, then from a FIFO script.
/// Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for the next unrouted request
    pub fn respond(&self, status: u16, body: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Respond(TransportResponse::new(status, body)));
    }

    /// Queue a transport-level failure
    pub fn fail(&self, error: ApiError) {
        self.script.lock().unwrap().push_back(Scripted::Fail(error));
    }

    /// Queue a request that never completes
    pub fn hang(&self) {
        self.script.lock().unwrap().push_back(Scripted::Hang);
    }

    /// Always answer `method path` (path relative to the API root) with this response
    pub fn route(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            response: TransportResponse::new(status, body),
        });
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<OutgoingRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.method == request.method && request.url.ends_with(&r.path))
            .map(|r| r.response.clone());
        if let Some(response) = routed {
            return Ok(response);
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Hang) => futures::future::pending().await,
            None => panic!("unexpected request: {} {}", request.method, request.url),
        }
    }
}
