use chrono::Utc;
use entity::notification;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use uuid::Uuid;

/// Inserts a notification for `user_id`. Callers decide whether a
/// delivery failure should abort the surrounding operation.
pub async fn push<C>(
    conn: &C,
    user_id: Uuid,
    kind: notification::Kind,
    title: &str,
    message: &str,
) -> Result<notification::Model, DbErr>
where
    C: ConnectionTrait,
{
    notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        kind: Set(kind),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}
