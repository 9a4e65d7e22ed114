//! HTTP surface of the party lifecycle. Each handler takes the
//! registry lock for the validate-and-mutate span only and performs
//! all chat delivery after the lock is dropped; delivery failures are
//! logged by the gateway and never undo a transition.

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Local;

use crate::AppState;
use crate::error::PartyError;
use crate::gateway::render;
use crate::party::lifecycle::{self, CreateParty};
use crate::utils::success_to_api_response;

use super::model::{CancelPartyResponse, CreatePartyRequest, PartyActionRequest, PartyIdQuery};

#[axum::debug_handler]
pub async fn create_party(
    State(state): State<AppState>,
    Json(req): Json<CreatePartyRequest>,
) -> Response {
    let form = CreateParty {
        organizer_id: req.organizer_id,
        purpose: req.purpose,
        departure_time: req.departure_time,
        capacity: req.capacity,
        requirements: req.requirements,
        notes: req.notes,
    };

    let record = {
        let mut registry = state.registry.lock().await;
        match lifecycle::create(
            &mut registry,
            form,
            &state.config.party_limits(),
            Local::now().naive_local(),
        ) {
            Ok(record) => record,
            Err(e) => return e.into_response(),
        }
    };

    let summary = render::render_summary(&record);
    if let Some(location) = state
        .gateway
        .publish_summary(&req.channel_id, &summary, None)
        .await
    {
        let mut registry = state.registry.lock().await;
        // The party may already be gone if the organizer cancelled
        // while the publish was in flight.
        if let Err(e) = lifecycle::set_location(&mut registry, record.id, location) {
            tracing::debug!(party_id = %record.id, error = %e, "location binding skipped");
        }
    }

    (StatusCode::CREATED, success_to_api_response(summary)).into_response()
}

#[axum::debug_handler]
pub async fn join_party(
    State(state): State<AppState>,
    Json(req): Json<PartyActionRequest>,
) -> Response {
    let record = {
        let mut registry = state.registry.lock().await;
        match lifecycle::join(&mut registry, &req.user_id, req.party_id) {
            Ok(record) => record,
            Err(e) => return e.into_response(),
        }
    };

    let summary = render::render_summary(&record);
    if let Some(location) = &record.location {
        state
            .gateway
            .publish_summary(&location.channel_id, &summary, Some(location))
            .await;
    }
    (StatusCode::OK, success_to_api_response(summary)).into_response()
}

#[axum::debug_handler]
pub async fn leave_party(
    State(state): State<AppState>,
    Json(req): Json<PartyActionRequest>,
) -> Response {
    let record = {
        let mut registry = state.registry.lock().await;
        match lifecycle::leave(&mut registry, &req.user_id, req.party_id) {
            Ok(record) => record,
            Err(e) => return e.into_response(),
        }
    };

    let summary = render::render_summary(&record);
    if let Some(location) = &record.location {
        state
            .gateway
            .publish_summary(&location.channel_id, &summary, Some(location))
            .await;
    }
    (StatusCode::OK, success_to_api_response(summary)).into_response()
}

#[axum::debug_handler]
pub async fn complete_party(
    State(state): State<AppState>,
    Json(req): Json<PartyActionRequest>,
) -> Response {
    let report = {
        let mut registry = state.registry.lock().await;
        match lifecycle::complete(
            &mut registry,
            &req.user_id,
            req.party_id,
            Local::now().naive_local(),
        ) {
            Ok(report) => report,
            Err(e) => return e.into_response(),
        }
    };

    let completion = render::render_completion(&report);
    if let Some(location) = &report.record.location {
        // Freeze the live summary in its completed state, then leave
        // the durable completion record on the home channel.
        let summary = render::render_summary(&report.record);
        state
            .gateway
            .publish_summary(&location.channel_id, &summary, Some(location))
            .await;
        state
            .gateway
            .announce(
                &location.channel_id,
                &render::render_completion_announcement(&completion),
            )
            .await;
    }

    (StatusCode::OK, success_to_api_response(completion)).into_response()
}

#[axum::debug_handler]
pub async fn cancel_party(
    State(state): State<AppState>,
    Json(req): Json<PartyActionRequest>,
) -> Response {
    let report = {
        let mut registry = state.registry.lock().await;
        match lifecycle::cancel(&mut registry, &req.user_id, req.party_id) {
            Ok(report) => report,
            Err(e) => return e.into_response(),
        }
    };

    let notice = render::render_cancellation(&report);
    let notified = state.gateway.notify_users(&report.recipients, &notice).await;
    if let Some(location) = &report.record.location {
        state.gateway.remove_summary(location).await;
    }

    (
        StatusCode::OK,
        success_to_api_response(CancelPartyResponse {
            cancelled: true,
            notified_members: notified,
        }),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn find_by_id(
    State(state): State<AppState>,
    Query(query): Query<PartyIdQuery>,
) -> Response {
    let registry = state.registry.lock().await;
    match registry.get(query.party_id) {
        Some(record) => {
            let summary = render::render_summary(record);
            (StatusCode::OK, success_to_api_response(summary)).into_response()
        }
        None => {
            PartyError::NotFound(format!("no party found for id {}", query.party_id))
                .into_response()
        }
    }
}
