use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::Notification;

pub struct NotificationService {
    supabase: SupabaseClient,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Notifications for the current user, newest first.
    pub async fn list_notifications(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<Vec<Notification>> {
        debug!("Fetching notifications for user: {}", user.id);

        let path = format!(
            "/rest/v1/notifications?user_id=eq.{}&order=created_at.desc",
            user.id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let notifications: Vec<Notification> = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Notification>, _>>()?;

        Ok(notifications)
    }

    pub async fn set_read(
        &self,
        user: &User,
        notification_id: Uuid,
        is_read: bool,
        auth_token: &str,
    ) -> Result<Notification> {
        debug!(
            "Marking notification {} as {} for user {}",
            notification_id,
            if is_read { "read" } else { "unread" },
            user.id
        );

        let path = format!(
            "/rest/v1/notifications?id=eq.{}&user_id=eq.{}",
            notification_id, user.id
        );
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_read": is_read })),
                Some(headers),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Notification not found"))?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn mark_all_read(&self, user: &User, auth_token: &str) -> Result<()> {
        debug!("Marking all notifications read for user: {}", user.id);

        let path = format!(
            "/rest/v1/notifications?user_id=eq.{}&is_read=eq.false",
            user.id
        );
        let _: Value = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_read": true })),
            )
            .await?;

        Ok(())
    }

    pub async fn delete_notification(
        &self,
        user: &User,
        notification_id: Uuid,
        auth_token: &str,
    ) -> Result<()> {
        debug!("Deleting notification {} for user {}", notification_id, user.id);

        let path = format!(
            "/rest/v1/notifications?id=eq.{}&user_id=eq.{}",
            notification_id, user.id
        );
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;

        Ok(())
    }
}
