use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{client_remark, sales_client};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, Func};
use serde::{Deserialize, Serialize};
use tracing::info_span;
use uuid::Uuid;

use crate::{
    auth::{is_admin, is_sales_agent, CurrentUser},
    error::{ApiError, ApiResult},
    extract::AuthUser,
    response::Envelope,
    state::AppState,
    validate::{normalize_email, paging, require_trimmed, sanitize_optional_filter},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients_handler).post(create_client_handler))
        .route(
            "/{id}",
            get(get_client_handler)
                .put(update_client_handler)
                .delete(delete_client_handler),
        )
        .route("/{id}/call-status", patch(update_call_status_handler))
        .route(
            "/{id}/remarks",
            get(list_remarks_handler).post(add_remark_handler),
        )
}

fn require_sales_agent(current: &CurrentUser) -> ApiResult<()> {
    if is_sales_agent(current.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("sales access required"))
    }
}

/// Agents see only their own book; admins see everyone's.
async fn load_client(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<sales_client::Model> {
    let record = sales_client::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;
    if record.owner_id != current.user_id && !is_admin(current.role) {
        return Err(ApiError::not_found("client"));
    }
    Ok(record)
}

fn call_status_as_str(value: sales_client::CallStatus) -> &'static str {
    match value {
        sales_client::CallStatus::NotCalled => "not_called",
        sales_client::CallStatus::Called => "called",
        sales_client::CallStatus::Skipped => "skipped",
        sales_client::CallStatus::Unpicked => "unpicked",
        sales_client::CallStatus::Completed => "completed",
    }
}

fn call_status_from_str(value: &str) -> Option<sales_client::CallStatus> {
    match value.trim().to_lowercase().as_str() {
        "not_called" => Some(sales_client::CallStatus::NotCalled),
        "called" => Some(sales_client::CallStatus::Called),
        "skipped" => Some(sales_client::CallStatus::Skipped),
        "unpicked" => Some(sales_client::CallStatus::Unpicked),
        "completed" => Some(sales_client::CallStatus::Completed),
        _ => None,
    }
}

fn category_as_str(value: client_remark::Category) -> &'static str {
    match value {
        client_remark::Category::General => "general",
        client_remark::Category::FollowUp => "follow_up",
        client_remark::Category::Complaint => "complaint",
        client_remark::Category::Interest => "interest",
    }
}

fn category_from_str(value: &str) -> Option<client_remark::Category> {
    match value.trim().to_lowercase().as_str() {
        "general" => Some(client_remark::Category::General),
        "follow_up" => Some(client_remark::Category::FollowUp),
        "complaint" => Some(client_remark::Category::Complaint),
        "interest" => Some(client_remark::Category::Interest),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientNode {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub call_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<sales_client::Model> for ClientNode {
    fn from(model: sales_client::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            company_name: model.company_name,
            contact_name: model.contact_name,
            email: model.email,
            phone: model.phone,
            address_line1: model.address_line1,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            call_status: call_status_as_str(model.call_status).to_string(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkNode {
    pub id: Uuid,
    pub client_id: Uuid,
    pub author_name: String,
    pub message: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl From<client_remark::Model> for RemarkNode {
    fn from(model: client_remark::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            author_name: model.author_name,
            message: model.message,
            category: category_as_str(model.category).to_string(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

async fn create_client_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(input): Json<ClientInput>,
) -> ApiResult<(StatusCode, Json<Envelope<ClientNode>>)> {
    require_sales_agent(&current)?;
    let company_name = require_trimmed("companyName", &input.company_name, 200)?;
    let email = match input.email.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(normalize_email(raw)?),
        _ => None,
    };
    let now = Utc::now();
    let record = sales_client::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(current.user_id),
        company_name: Set(company_name),
        contact_name: Set(sanitize_optional_filter(input.contact_name)),
        email: Set(email),
        phone: Set(sanitize_optional_filter(input.phone)),
        address_line1: Set(sanitize_optional_filter(input.address_line1)),
        city: Set(sanitize_optional_filter(input.city)),
        state: Set(sanitize_optional_filter(input.state)),
        zip_code: Set(sanitize_optional_filter(input.zip_code)),
        call_status: Set(sales_client::CallStatus::NotCalled),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(state.db.as_ref())
    .await?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok("client created", record.into()),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsQuery {
    pub q: Option<String>,
    pub call_status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientListPayload {
    pub clients: Vec<ClientNode>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

async fn list_clients_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Query(query): Query<ListClientsQuery>,
) -> ApiResult<Json<Envelope<ClientListPayload>>> {
    require_sales_agent(&current)?;
    let (offset, limit) = paging(query.page, query.limit, 100)?;
    let filter = sanitize_optional_filter(query.q);
    let span = info_span!("clients.list", has_q = filter.is_some(), limit);
    let _guard = span.enter();

    let mut select = sales_client::Entity::find();
    if !is_admin(current.role) {
        select = select.filter(sales_client::Column::OwnerId.eq(current.user_id));
    }
    if let Some(q) = filter {
        let pattern = format!("%{}%", q.to_lowercase());
        let name_expr = Expr::expr(Func::lower(Expr::col(sales_client::Column::CompanyName)));
        select = select.filter(name_expr.like(pattern));
    }
    if let Some(status) = query.call_status.as_deref() {
        let parsed = call_status_from_str(status)
            .ok_or_else(|| ApiError::validation(format!("unknown callStatus {status}")))?;
        select = select.filter(sales_client::Column::CallStatus.eq(parsed));
    }

    let total = select.clone().count(state.db.as_ref()).await?;
    let rows = select
        .order_by_desc(sales_client::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        ClientListPayload {
            clients: rows.into_iter().map(ClientNode::from).collect(),
            total,
            page: offset / limit + 1,
            limit,
        },
    ))
}

async fn get_client_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<ClientNode>>> {
    require_sales_agent(&current)?;
    let record = load_client(&state, &current, id).await?;
    Ok(Envelope::ok("ok", record.into()))
}

async fn update_client_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ClientInput>,
) -> ApiResult<Json<Envelope<ClientNode>>> {
    require_sales_agent(&current)?;
    let record = load_client(&state, &current, id).await?;
    let company_name = require_trimmed("companyName", &input.company_name, 200)?;
    let email = match input.email.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(normalize_email(raw)?),
        _ => None,
    };
    let mut active: sales_client::ActiveModel = record.into();
    active.company_name = Set(company_name);
    active.contact_name = Set(sanitize_optional_filter(input.contact_name));
    active.email = Set(email);
    active.phone = Set(sanitize_optional_filter(input.phone));
    active.address_line1 = Set(sanitize_optional_filter(input.address_line1));
    active.city = Set(sanitize_optional_filter(input.city));
    active.state = Set(sanitize_optional_filter(input.state));
    active.zip_code = Set(sanitize_optional_filter(input.zip_code));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(state.db.as_ref()).await?;
    Ok(Envelope::ok("client updated", updated.into()))
}

async fn delete_client_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    require_sales_agent(&current)?;
    load_client(&state, &current, id).await?;
    sales_client::Entity::delete_by_id(id)
        .exec(state.db.as_ref())
        .await?;
    Ok(Envelope::message("client deleted"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusRequest {
    pub call_status: String,
}

async fn update_call_status_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CallStatusRequest>,
) -> ApiResult<Json<Envelope<ClientNode>>> {
    require_sales_agent(&current)?;
    let record = load_client(&state, &current, id).await?;
    let parsed = call_status_from_str(&input.call_status).ok_or_else(|| {
        ApiError::validation(format!("unknown callStatus {}", input.call_status))
    })?;
    let mut active: sales_client::ActiveModel = record.into();
    active.call_status = Set(parsed);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(state.db.as_ref()).await?;
    Ok(Envelope::ok("call status updated", updated.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkInput {
    pub message: String,
    pub category: Option<String>,
}

async fn add_remark_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<RemarkInput>,
) -> ApiResult<(StatusCode, Json<Envelope<RemarkNode>>)> {
    require_sales_agent(&current)?;
    load_client(&state, &current, id).await?;
    let message = require_trimmed("message", &input.message, 2000)?;
    let category = match input.category.as_deref() {
        Some(value) => category_from_str(value)
            .ok_or_else(|| ApiError::validation(format!("unknown category {value}")))?,
        None => client_remark::Category::General,
    };
    let record = client_remark::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(id),
        author_name: Set(current.display_name.clone()),
        message: Set(message),
        category: Set(category),
        created_at: Set(Utc::now().into()),
    }
    .insert(state.db.as_ref())
    .await?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok("remark added", record.into()),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkListPayload {
    pub remarks: Vec<RemarkNode>,
    pub total: u64,
}

async fn list_remarks_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<RemarkListPayload>>> {
    require_sales_agent(&current)?;
    load_client(&state, &current, id).await?;
    // Newest remark first.
    let rows = client_remark::Entity::find()
        .filter(client_remark::Column::ClientId.eq(id))
        .order_by_desc(client_remark::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;
    Ok(Envelope::ok(
        "ok",
        RemarkListPayload {
            total: rows.len() as u64,
            remarks: rows.into_iter().map(RemarkNode::from).collect(),
        },
    ))
}
