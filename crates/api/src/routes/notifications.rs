use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::notification;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::AuthUser,
    response::Envelope,
    state::AppState,
    validate::paging,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications_handler))
        .route("/unread-count", get(unread_count_handler))
        .route("/{id}/read", patch(mark_read_handler))
        .route("/read-all", post(mark_all_read_handler))
}

fn kind_as_str(value: notification::Kind) -> &'static str {
    match value {
        notification::Kind::Info => "info",
        notification::Kind::Application => "application",
        notification::Kind::Interview => "interview",
        notification::Kind::System => "system",
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationNode {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationNode {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            message: model.message,
            kind: kind_as_str(model.kind).to_string(),
            is_read: model.is_read,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub unread_only: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListPayload {
    pub notifications: Vec<NotificationNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

async fn list_notifications_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<NotificationListPayload>>> {
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let mut select = notification::Entity::find()
        .filter(notification::Column::UserId.eq(current.user_id));
    if query.unread_only.unwrap_or(false) {
        select = select.filter(notification::Column::IsRead.eq(false));
    }
    let total = select.clone().count(state.db.as_ref()).await?;
    let rows = select
        .order_by_desc(notification::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        NotificationListPayload {
            notifications: rows.into_iter().map(NotificationNode::from).collect(),
            total,
            page: offset / limit + 1,
            limit,
        },
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountPayload {
    pub unread: u64,
}

async fn unread_count_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> ApiResult<Json<Envelope<UnreadCountPayload>>> {
    let unread = notification::Entity::find()
        .filter(notification::Column::UserId.eq(current.user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(state.db.as_ref())
        .await?;
    Ok(Envelope::ok("ok", UnreadCountPayload { unread }))
}

async fn mark_read_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<NotificationNode>>> {
    // Someone else's notification reads as missing, not forbidden.
    let record = notification::Entity::find_by_id(id)
        .filter(notification::Column::UserId.eq(current.user_id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("notification"))?;
    if record.is_read {
        return Ok(Envelope::ok("notification already read", record.into()));
    }
    let mut active: notification::ActiveModel = record.into();
    active.is_read = Set(true);
    let updated = active.update(state.db.as_ref()).await?;
    Ok(Envelope::ok("notification marked read", updated.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllPayload {
    pub updated: u64,
}

async fn mark_all_read_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> ApiResult<Json<Envelope<MarkAllPayload>>> {
    let result = notification::Entity::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(current.user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "all notifications marked read",
        MarkAllPayload {
            updated: result.rows_affected,
        },
    ))
}
