//! Route handlers.
//!
//! Public routes accept registrations and payment confirmations. Admin routes
//! take an [`AdminAuth`] extractor and cover listing, export, deletion,
//! single-registration SIN issuance and the batch backfill.

use super::{
    AppState,
    auth::AdminAuth,
    error::ApiError,
    types::{
        AllocationResponse, BackfillResponse, CreatedResponse, DeletedResponse, HealthResponse,
        ListMetadata, ListParams, ListResponse, PaymentRequest, PaymentResponse,
        parse_payment_time,
    },
};
use admission_sin::{
    Error, NewRegistration, Page, PaymentUpdate, Registration, RegistrationStore, STATUS_PAID,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

const SERVICE_NAME: &str = "GMCP Admission Backend";

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        service: SERVICE_NAME,
        store: state.allocator.store().backend(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn healthz() -> &'static str {
    "OK"
}

/// Saves a submission. One that arrives with a transaction id and a positive
/// amount gets its SIN straight away.
pub async fn create_registration(
    State(state): State<AppState>,
    Json(new): Json<NewRegistration>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let (registration, allocation) = state
        .blocking(move |allocator| allocator.register(new))
        .await?;
    tracing::info!(
        id = %registration.id,
        program = %registration.program,
        outcome = allocation.outcome(),
        "registration saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Registration saved successfully",
            id: registration.id.clone(),
            sin_number: allocation.sin().map(str::to_owned),
            data: registration,
        }),
    ))
}

/// Records a payment and issues a SIN when the registration becomes eligible.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    if body.transaction_id.trim().is_empty() {
        return Err(ApiError::BadRequest("`transactionId` is required".into()));
    }
    let payment_time = match body.payment_time.as_deref() {
        None => None,
        Some(raw) => parse_payment_time(raw).ok_or_else(|| {
            ApiError::BadRequest(format!("`paymentTime` is not a recognised date: {raw}"))
        })?,
    };
    let update = PaymentUpdate {
        transaction_id: body.transaction_id,
        payment_status: body
            .payment_status
            .unwrap_or_else(|| STATUS_PAID.to_owned()),
        payment_time,
    };

    let lookup = id.clone();
    let (registration, allocation) = state
        .blocking(move |allocator| allocator.confirm_payment(&lookup, &update))
        .await?;
    tracing::info!(%id, outcome = allocation.outcome(), "payment recorded");

    Ok(Json(PaymentResponse {
        success: true,
        message: "Payment status updated successfully",
        id,
        transaction_id: registration.transaction_id.unwrap_or_default(),
        sin_number: allocation.sin().map(str::to_owned),
    }))
}

pub async fn list_registrations(
    _: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let page = Page {
        limit: params
            .limit()
            .unwrap_or(Page::default().limit)
            .clamp(1, state.max_page_size),
        offset: params.offset().unwrap_or(0),
    };

    let registrations = state
        .blocking(move |allocator| allocator.store().list(page))
        .await?;

    Ok(Json(ListResponse {
        metadata: ListMetadata {
            count: registrations.len(),
            has_more: registrations.len() == page.limit,
            limit: page.limit,
            offset: page.offset,
        },
        registrations,
    }))
}

/// Every registration as a downloadable JSON array.
pub async fn export_registrations(
    _: AdminAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let registrations = state
        .blocking(|allocator| allocator.store().all())
        .await?;
    let body = serde_json::to_vec_pretty(&registrations)
        .map_err(|err| ApiError::Internal(format!("failed to encode export: {err}")))?;
    let disposition = format!(
        "attachment; filename=\"registrations-{}.json\"",
        Utc::now().format("%Y-%m-%d")
    );
    tracing::info!(count = registrations.len(), "registrations exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn get_registration(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Registration>, ApiError> {
    let registration = state
        .blocking(move |allocator| {
            allocator
                .store()
                .get(&id)?
                .ok_or(Error::NotFound { id })
        })
        .await?;
    Ok(Json(registration))
}

pub async fn delete_registration(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let target = id.clone();
    let removed = state
        .blocking(move |allocator| allocator.store().delete(&target))
        .await?;
    if !removed {
        return Err(Error::NotFound { id }.into());
    }
    tracing::info!(%id, "registration deleted");

    Ok(Json(DeletedResponse {
        success: true,
        message: "Registration deleted successfully",
        id,
    }))
}

/// Issues a SIN for one registration if it is eligible and has none.
pub async fn allocate_sin(
    _: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AllocationResponse>, ApiError> {
    let lookup = id.clone();
    let allocation = state
        .blocking(move |allocator| allocator.allocate(&lookup))
        .await?;

    Ok(Json(AllocationResponse {
        success: true,
        id,
        outcome: allocation.outcome(),
        sin_number: allocation.sin().map(str::to_owned),
    }))
}

pub async fn backfill(
    _: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<BackfillResponse>, ApiError> {
    let report = state.blocking(|allocator| allocator.backfill()).await?;

    Ok(Json(BackfillResponse {
        success: true,
        report,
    }))
}
