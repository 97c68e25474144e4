//! Link submission, viewing, and confirmation handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stashd_core::labels::format_label;
use stashd_core::{ContentItem, ContentState, SummaryBlock, UserContentLink};

use super::{
    map_ingest_error, map_store_error, require_user_id, ApiError, ApiResponse, AppState,
    ResponseMeta,
};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct SubmitBody {
    url: String,
    #[serde(default)]
    memo: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct ConfirmBody {
    #[serde(default)]
    memo: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SubmissionData {
    link_id: Uuid,
    content_item_id: Uuid,
    state: ContentState,
    content_created: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ContentData {
    id: Uuid,
    source_domain: String,
    url: String,
    title: Option<String>,
    thumbnail_url: Option<String>,
    category: Option<String>,
    topic: Option<String>,
    small_summary: Option<String>,
    medium_summary: Option<String>,
    summary_blocks: Vec<SummaryBlock>,
    consumption_time_min: Option<i32>,
    state: ContentState,
    error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LinkData {
    link_id: Uuid,
    memo: Option<String>,
    is_read: bool,
    is_confirmed: bool,
    /// Display label derived from depth and perspective; absent until the
    /// content is classified.
    label: Option<&'static str>,
    last_viewed_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    content: ContentData,
}

impl ContentData {
    fn from_item(item: ContentItem) -> Self {
        Self {
            id: item.id,
            source_domain: item.source_domain,
            url: item.url,
            title: item.title,
            thumbnail_url: item.thumbnail_url,
            category: item.category,
            topic: item.topic,
            small_summary: item.small_summary,
            medium_summary: item.medium_summary,
            summary_blocks: item.summary_blocks,
            consumption_time_min: item.consumption_time_min,
            state: item.state,
            error_message: item.error_message,
        }
    }
}

impl LinkData {
    fn from_parts(link: UserContentLink, content: ContentItem) -> Self {
        Self {
            link_id: link.id,
            memo: link.memo,
            is_read: link.is_read,
            is_confirmed: link.is_confirmed,
            label: format_label(link.depth, link.perspective),
            last_viewed_at: link.last_viewed_at,
            confirmed_at: link.confirmed_at,
            created_at: link.created_at,
            content: ContentData::from_item(content),
        }
    }
}

/// `POST /api/v1/links` — accepts a URL for asynchronous processing.
pub(super) async fn submit_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(body): Json<SubmitBody>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionData>>), ApiError> {
    let user_id = require_user_id(&headers, &req_id.0)?;

    let receipt = state
        .gate
        .submit(user_id, &body.url, body.memo)
        .await
        .map_err(|err| map_ingest_error(req_id.0.clone(), &err))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: SubmissionData {
                link_id: receipt.link_id,
                content_item_id: receipt.content_item_id,
                state: receipt.state,
                content_created: receipt.content_created,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// `GET /api/v1/links/{link_id}` — the user's view of one saved link,
/// marking it read as a side effect.
pub(super) async fn view_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(link_id): Path<Uuid>,
) -> Result<Json<ApiResponse<LinkData>>, ApiError> {
    let user_id = require_user_id(&headers, &req_id.0)?;

    let (link, content) = state
        .store
        .view_link(user_id, link_id)
        .await
        .map_err(|err| map_store_error(req_id.0.clone(), &err))?;

    Ok(Json(ApiResponse {
        data: LinkData::from_parts(link, content),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `PATCH /api/v1/links/{link_id}/confirm` — accepts the classification,
/// optionally replacing the memo.
pub(super) async fn confirm_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(link_id): Path<Uuid>,
    body: Option<Json<ConfirmBody>>,
) -> Result<Json<ApiResponse<SubmissionConfirmed>>, ApiError> {
    let user_id = require_user_id(&headers, &req_id.0)?;
    let memo = body.and_then(|Json(body)| body.memo);

    state
        .store
        .confirm_link(user_id, link_id, memo)
        .await
        .map_err(|err| map_store_error(req_id.0.clone(), &err))?;

    Ok(Json(ApiResponse {
        data: SubmissionConfirmed {
            link_id,
            confirmed: true,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct SubmissionConfirmed {
    link_id: Uuid,
    confirmed: bool,
}
