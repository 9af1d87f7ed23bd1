use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trainer_hub_data::repository::Record;

#[cfg(feature = "with-api")]
use utoipa::{IntoParams, ToSchema};

use super::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Schedule,
    Progress,
    Achievement,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default)]
    pub priority: NotificationPriority,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: &str,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            notification_type,
            title: title.into(),
            message: message.into(),
            related_id: None,
            related_type: None,
            action_url: None,
            priority: NotificationPriority::default(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// Point the notification at the record it talks about
    pub fn with_related(mut self, related_type: &str, related_id: &str) -> Self {
        self.related_type = Some(related_type.to_string());
        self.related_id = Some(related_id.to_string());
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Mark as read; a notification read earlier keeps its first timestamp
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(at);
        true
    }
}

impl Record for Notification {
    const NAMESPACE: &'static str = "notifications";

    fn owner(&self) -> &str {
        &self.user_id
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
#[cfg_attr(feature = "with-api", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    /// Page size, default 20, at most 100
    pub limit: Option<usize>,
    /// One-based page number, default 1
    pub page: Option<usize>,
    #[serde(default)]
    pub unread_only: Option<bool>,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl Pagination {
    pub fn new(current_page: usize, items_per_page: usize, total_items: usize) -> Self {
        let total_pages = if items_per_page == 0 {
            0
        } else {
            total_items.div_ceil(items_per_page)
        };
        Self {
            current_page,
            total_pages,
            total_items,
            items_per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResult {
    pub marked_count: usize,
}
