//! API client for the portfolio CMS REST API.
//!
//! `ApiClient` wraps the shared [`RequestGateway`] with one typed method per
//! endpoint. It never touches the credential; whatever the session store
//! last set on the gateway is what these calls carry.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use super::transport::{Method, RequestBody};
use super::{ApiError, RequestGateway};
use crate::models::message::StatusEnvelope;
use crate::models::project::ProjectEnvelope;
use crate::models::user::ProfileEnvelope;
use crate::models::{
    DashboardStats, Employment, EmploymentDraft, Message, MessageStatus, NewSkill, ProfileUpdate,
    Project, ProjectDraft, Skill, UserProfile,
};

/// Typed access to the feature endpoints.
/// Clone is cheap - the gateway is shared.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<RequestGateway>,
}

impl ApiClient {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    // ===== Profile =====

    /// Profile of the logged-in user
    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        let envelope: ProfileEnvelope = self.gateway.get("/profile").await?;
        envelope.into_profile()
    }

    /// Public profile of any user (no authentication required)
    pub async fn fetch_public_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let envelope: ProfileEnvelope = self.gateway.get(&format!("/profile/{}", user_id)).await?;
        envelope.into_profile()
    }

    /// `PUT /profile`, as multipart when a picture is attached, JSON otherwise
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
        let envelope: ProfileEnvelope = if update.profile_picture.is_some() {
            let fields = update
                .into_form()
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
            self.gateway.send_multipart(Method::Put, "/profile", fields).await?
        } else {
            self.gateway.put("/profile", &update).await?
        };
        envelope.into_profile()
    }

    // ===== Projects =====

    pub async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        let projects: Vec<Project> = self.gateway.get("/projects").await?;
        debug!(count = projects.len(), "Projects fetched");
        Ok(projects)
    }

    pub async fn create_project(&self, draft: ProjectDraft) -> Result<Project, ApiError> {
        let fields = draft.into_form()?;
        let envelope: ProjectEnvelope = self
            .gateway
            .send_multipart(Method::Post, "/projects/create", fields)
            .await?;
        Ok(envelope.into_project())
    }

    pub async fn update_project(&self, id: &str, draft: ProjectDraft) -> Result<Project, ApiError> {
        let fields = draft.into_form()?;
        let envelope: ProjectEnvelope = self
            .gateway
            .send_multipart(Method::Put, &format!("/projects/{}", id), fields)
            .await?;
        Ok(envelope.into_project())
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&format!("/projects/{}", id)).await
    }

    // ===== Skills =====

    pub async fn fetch_skills(&self) -> Result<Vec<Skill>, ApiError> {
        self.gateway.get("/skills/list").await
    }

    pub async fn create_skill(&self, skill: &NewSkill) -> Result<Skill, ApiError> {
        skill.validate()?;
        self.gateway.post("/skills/add", &skill.trimmed()).await
    }

    pub async fn delete_skill(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&format!("/skills/{}", id)).await
    }

    // ===== Employment =====

    pub async fn fetch_employment(&self) -> Result<Vec<Employment>, ApiError> {
        self.gateway.get("/employment").await
    }

    /// Create an entry. Callers refetch the list afterwards.
    pub async fn create_employment(&self, draft: &EmploymentDraft) -> Result<(), ApiError> {
        let payload = serde_json::to_value(draft.to_payload()?)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.gateway
            .execute(Method::Post, "/employment/create", RequestBody::Json(payload))
            .await?;
        Ok(())
    }

    pub async fn update_employment(&self, id: &str, draft: &EmploymentDraft) -> Result<(), ApiError> {
        let payload = serde_json::to_value(draft.to_payload()?)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.gateway
            .execute(Method::Put, &format!("/employment/update/{}", id), RequestBody::Json(payload))
            .await?;
        Ok(())
    }

    pub async fn delete_employment(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&format!("/employment/delete/{}", id)).await
    }

    // ===== Messages =====

    pub async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
        self.gateway.get("/messages/").await
    }

    /// Set a message's status; returns the status the server reports
    pub async fn update_message_status(&self, id: &str, status: MessageStatus) -> Result<MessageStatus, ApiError> {
        let response = self
            .gateway
            .execute(
                Method::Patch,
                &format!("/messages/{}/status", id),
                RequestBody::Json(json!({ "status": status.as_str() })),
            )
            .await?;
        // An empty or non-JSON success body still means the change was accepted
        let applied = serde_json::from_str::<StatusEnvelope>(&response.body)
            .map(|envelope| envelope.status_or(status))
            .unwrap_or(status);
        Ok(applied)
    }

    pub async fn toggle_message_read(&self, message: &Message) -> Result<MessageStatus, ApiError> {
        self.update_message_status(&message.id, message.status.toggled()).await
    }

    pub async fn archive_message(&self, id: &str) -> Result<MessageStatus, ApiError> {
        self.update_message_status(id, MessageStatus::Archived).await
    }

    pub async fn delete_message(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&format!("/messages/{}", id)).await
    }

    // ===== Dashboard =====

    /// Fetch every collection concurrently and count them
    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let (projects, skills, employment, messages) = futures::try_join!(
            self.fetch_projects(),
            self.fetch_skills(),
            self.fetch_employment(),
            self.fetch_messages(),
        )?;
        Ok(DashboardStats::compute(&projects, &skills, &employment, &messages))
    }
}
