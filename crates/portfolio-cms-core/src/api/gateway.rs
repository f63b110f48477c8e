//! The request gateway: base address, active credential, and the single
//! code path every API call goes through.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::transport::{FormField, Method, OutgoingRequest, RequestBody, Transport, TransportResponse};
use super::{ApiError, Credential};

/// Default per-request timeout.
/// 30s allows for slow API responses (image uploads) while guaranteeing
/// that session restoration always finishes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    base_url: RwLock<String>,
    credential: RwLock<Option<Credential>>,
    timeout: Duration,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: RwLock::new(normalize_base_url(base_url)),
            credential: RwLock::new(None),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the gateway at the API root (e.g. `http://localhost:4001/api`)
    pub fn configure(&self, base_url: &str) {
        let normalized = normalize_base_url(base_url);
        debug!(base_url = %normalized, "Gateway configured");
        *self.base_url.write().unwrap_or_else(PoisonError::into_inner) = normalized;
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attach `token` to every request issued from now on
    pub fn set_credential(&self, token: Credential) {
        *self.credential.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Stop sending an `Authorization` header
    pub fn clear_credential(&self) {
        *self.credential.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_credential(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn url_for(&self, path: &str) -> String {
        let base = self.base_url();
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Build the request with whatever credential is current at this moment
    fn prepare(&self, method: Method, path: &str, body: RequestBody) -> OutgoingRequest {
        let authorization = self
            .credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Credential::bearer);

        OutgoingRequest {
            method,
            url: self.url_for(path),
            authorization,
            body,
        }
    }

    /// Send once. Non-2xx responses become `ApiError`; nothing is retried.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<TransportResponse, ApiError> {
        let request = self.prepare(method, path, body);
        debug!(%method, path, authorized = request.authorization.is_some(), "Sending request");

        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| {
                warn!(%method, path, timeout_secs = self.timeout.as_secs(), "Request timed out");
                ApiError::Timeout(self.timeout.as_secs())
            })??;

        if response.is_success() {
            Ok(response)
        } else {
            let err = ApiError::from_status(response.status, &response.body);
            debug!(%method, path, status = response.status, error = %err, "Request rejected");
            Err(err)
        }
    }

    fn decode<T: DeserializeOwned>(path: &str, response: &TransportResponse) -> Result<T, ApiError> {
        serde_json::from_str(&response.body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "{} from {}: {}",
                e,
                path,
                ApiError::truncate_body(&response.body)
            ))
        })
    }

    fn to_json<B: Serialize>(body: &B) -> Result<RequestBody, ApiError> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::Get, path, RequestBody::Empty).await?;
        Self::decode(path, &response)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.execute(Method::Post, path, Self::to_json(body)?).await?;
        Self::decode(path, &response)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.execute(Method::Put, path, Self::to_json(body)?).await?;
        Self::decode(path, &response)
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.execute(Method::Patch, path, Self::to_json(body)?).await?;
        Self::decode(path, &response)
    }

    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        fields: Vec<FormField>,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, path, RequestBody::Multipart(fields)).await?;
        Self::decode(path, &response)
    }

    /// DELETE, ignoring whatever body the server returns
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::Delete, path, RequestBody::Empty).await?;
        Ok(())
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use serde_json::json;

    fn gateway(transport: &Arc<MockTransport>) -> RequestGateway {
        RequestGateway::new(transport.clone(), "http://localhost:4001/api/")
    }

    #[test]
    fn test_url_joining() {
        let transport = MockTransport::new();
        let gw = gateway(&transport);
        assert_eq!(gw.url_for("/profile"), "http://localhost:4001/api/profile");
        assert_eq!(gw.url_for("skills/list"), "http://localhost:4001/api/skills/list");

        gw.configure("https://cms.example.com/api");
        assert_eq!(gw.url_for("/projects"), "https://cms.example.com/api/projects");
    }

    #[tokio::test]
    async fn test_bearer_header_follows_credential() {
        let transport = MockTransport::new();
        transport.respond(200, "{}");
        transport.respond(200, "{}");
        transport.respond(200, "{}");
        let gw = gateway(&transport);

        let _: serde_json::Value = gw.get("/projects").await.unwrap();
        gw.set_credential(Credential::new("t").unwrap());
        let _: serde_json::Value = gw.get("/projects").await.unwrap();
        gw.clear_credential();
        let _: serde_json::Value = gw.get("/projects").await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].authorization, None);
        assert_eq!(sent[1].authorization.as_deref(), Some("Bearer t"));
        assert_eq!(sent[2].authorization, None);
    }

    #[tokio::test]
    async fn test_non_success_is_propagated_without_retry() {
        let transport = MockTransport::new();
        transport.respond(401, r#"{"message":"jwt expired"}"#);
        let gw = gateway(&transport);
        gw.set_credential(Credential::new("old").unwrap());

        let result: Result<serde_json::Value, _> = gw.get("/profile").await;
        assert_eq!(
            result.unwrap_err(),
            ApiError::Unauthorized {
                message: Some("jwt expired".into())
            }
        );
        assert_eq!(transport.requests().len(), 1);
        // The gateway never clears the credential on its own
        assert!(gw.has_credential());
    }

    #[tokio::test]
    async fn test_network_failure_is_propagated() {
        let transport = MockTransport::new();
        transport.fail(ApiError::Network("connection refused".into()));
        let gw = gateway(&transport);

        let result: Result<serde_json::Value, _> = gw.get("/skills/list").await;
        assert_eq!(result.unwrap_err(), ApiError::Network("connection refused".into()));
    }

    #[tokio::test]
    async fn test_hung_request_times_out() {
        let transport = MockTransport::new();
        transport.hang();
        let gw = gateway(&transport).with_timeout(Duration::from_millis(20));

        let result: Result<serde_json::Value, _> = gw.get("/profile").await;
        assert!(matches!(result, Err(ApiError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_invalid_json_is_invalid_response() {
        let transport = MockTransport::new();
        transport.respond(200, "not json");
        let gw = gateway(&transport);

        let result: Result<serde_json::Value, _> = gw.get("/projects").await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_json_body_and_method() {
        let transport = MockTransport::new();
        transport.respond(200, r#"{"status":"read"}"#);
        let gw = gateway(&transport);

        let _: serde_json::Value = gw
            .patch("/messages/m1/status", &json!({ "status": "read" }))
            .await
            .unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::Patch);
        assert_eq!(sent.url, "http://localhost:4001/api/messages/m1/status");
        assert_eq!(sent.body, RequestBody::Json(json!({ "status": "read" })));
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let transport = MockTransport::new();
        transport.respond(204, "");
        let gw = gateway(&transport);

        gw.delete("/skills/s1").await.unwrap();
        assert_eq!(transport.last_request().unwrap().method, Method::Delete);
    }
}
