use tracing::{debug, warn};

use crate::entities::{Notification, NotificationPriority, NotificationType, Schedule};
use crate::repositories::Repositories;

/// Store a notification without failing the operation that triggered it
pub(crate) async fn notify(repos: &Repositories, notification: Notification) {
    match repos.notifications.put(&notification).await {
        Ok(()) => debug!(
            "Notification {} stored for user {}",
            notification.id, notification.user_id
        ),
        Err(e) => warn!(
            "Failed to store notification for user {}: {}",
            notification.user_id, e
        ),
    }
}

pub(crate) fn session_scheduled(schedule: &Schedule) -> Notification {
    Notification::new(
        &schedule.trainee_id,
        NotificationType::Schedule,
        "New session scheduled",
        format!(
            "{} on {} at {}",
            schedule.title, schedule.date, schedule.time
        ),
    )
    .with_related("schedule", &schedule.id)
    .with_action_url(format!("/trainee/schedules/{}", schedule.id))
}

pub(crate) fn session_updated(schedule: &Schedule) -> Notification {
    Notification::new(
        &schedule.trainee_id,
        NotificationType::Schedule,
        "Session updated",
        format!(
            "{} is now on {} at {}",
            schedule.title, schedule.date, schedule.time
        ),
    )
    .with_related("schedule", &schedule.id)
    .with_action_url(format!("/trainee/schedules/{}", schedule.id))
}

pub(crate) fn session_cancelled(schedule: &Schedule) -> Notification {
    let message = match &schedule.cancellation_reason {
        Some(reason) => format!("{} on {} was cancelled: {}", schedule.title, schedule.date, reason),
        None => format!("{} on {} was cancelled", schedule.title, schedule.date),
    };

    Notification::new(&schedule.trainee_id, NotificationType::Schedule, "Session cancelled", message)
        .with_related("schedule", &schedule.id)
        .with_priority(NotificationPriority::High)
}
