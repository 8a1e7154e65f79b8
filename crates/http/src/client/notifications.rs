//! Notification API client methods

use super::{ApiClient, ClientError, request::ApiRequest};
use crate::types::Notification;

impl ApiClient {
    /// Notifications of the signed-in user
    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.execute(ApiRequest::get("/notifications/")).await
    }

    /// Mark one notification as read
    pub async fn mark_notification_read(&self, id: i64) -> Result<Notification, ClientError> {
        self.execute(ApiRequest::post(format!("/notifications/{id}/read/")))
            .await
    }
}
