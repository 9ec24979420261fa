use crate::availability::{available_slots, cutoff_passed};
use crate::backend::{BookingError, Clock, ReservationBackend};
use crate::configuration::Configuration;
use crate::types::{Barber, NewReservation, Reservation, ReservationStatus, TimeSlot};
use crate::AppState;
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref PHONE_PATTERN: Regex = Regex::new(r"^\+?[0-9][0-9 ()\-]{6,19}$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct BookingRequest {
    barber_id: i32,
    date: NaiveDate,
    time: TimeSlot,
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(regex(path = *PHONE_PATTERN))]
    phone: String,
    #[validate(length(min = 1, max = 120))]
    service: String,
}

#[derive(Debug, Deserialize)]
struct AvailabilityParams {
    barber_id: i32,
    date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReservationRef {
    id: Uuid,
}

pub async fn start_server<B, C, F>(state: AppState<B, C, F>)
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/frontend", get(get_frontend::<B, C, F>))
        .route("/barbers", get(get_barbers::<B, C, F>))
        .route("/availability", get(get_availability::<B, C, F>))
        .route("/book", post(book_reservation::<B, C, F>));

    let admin = Router::new()
        .route("/admin_page", get(get_admin_page))
        .route("/reservations", get(get_reservations::<B, C, F>))
        .route("/confirm", post(confirm_reservation::<B, C, F>))
        .route("/cancel", post(cancel_reservation::<B, C, F>))
        .route("/complete", post(complete_reservation::<B, C, F>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<B, C, F>,
        ));

    let bind_address = state.config.bind_address();
    let app = Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();
    tracing::info!(%bind_address, "listening");
    axum::serve(listener, app).await.unwrap();
}

async fn admin_auth<B, C, F>(
    State(state): State<AppState<B, C, F>>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    match request.headers().get("x-admin-password") {
        Some(header) if header.to_str().unwrap_or("") == state.config.admin_password() => {
            Ok(next.run(request).await)
        }
        Some(_) => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
        None => Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string())),
    }
}

fn error_response(err: BookingError) -> (StatusCode, String) {
    let status = match &err {
        BookingError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BookingError::SlotConflict { .. } | BookingError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        BookingError::UnknownBarber(_) | BookingError::UnknownReservation(_) => {
            StatusCode::NOT_FOUND
        }
        BookingError::InactiveBarber(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, err.to_string())
}

async fn get_barbers<B, C, F>(
    State(state): State<AppState<B, C, F>>,
) -> Result<Json<Vec<Barber>>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    let barbers = state.backend.barbers().map_err(error_response)?;
    Ok(Json(barbers.into_iter().filter(|b| b.active).collect()))
}

/// A 200 with an empty list means "fully booked"; a failed store read is
/// a 503 so clients can offer a retry instead of claiming no slots.
async fn get_availability<B, C, F>(
    State(state): State<AppState<B, C, F>>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<Vec<TimeSlot>>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    let barbers = state.backend.barbers().map_err(error_response)?;
    let barber = barbers
        .iter()
        .find(|b| b.id == params.barber_id)
        .ok_or_else(|| error_response(BookingError::UnknownBarber(params.barber_id)))?;
    if !barber.active {
        return Err(error_response(BookingError::InactiveBarber(barber.id)));
    }

    let occupied = state
        .backend
        .active_reservation_times(params.barber_id, params.date)
        .map_err(error_response)?;
    let slots = available_slots(
        &state.config.slot_catalog(),
        state.config.booking_lead_time(),
        params.date,
        state.clock.now(),
        &occupied,
    );
    Ok(Json(slots))
}

async fn book_reservation<B, C, F>(
    State(state): State<AppState<B, C, F>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Reservation>), (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    if let Err(err) = request.validate() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, err.to_string()));
    }

    let now = state.clock.now();
    let today = now.date_naive();
    if request.date < today {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "appointment date is in the past".to_string(),
        ));
    }
    if !state.config.slot_catalog().contains(request.time) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "time is outside the booking schedule".to_string(),
        ));
    }
    if request.date == today && cutoff_passed(request.time, now, state.config.booking_lead_time()) {
        return Err((
            StatusCode::CONFLICT,
            "slot is no longer available".to_string(),
        ));
    }

    let reservation = state
        .backend
        .create_reservation(NewReservation {
            barber_id: request.barber_id,
            customer_name: request.name,
            customer_email: request.email,
            customer_phone: request.phone,
            service: request.service,
            date: request.date,
            slot: request.time,
        })
        .map_err(|err| {
            tracing::warn!(error = %err, "booking rejected");
            error_response(err)
        })?;
    tracing::info!(
        reservation = %reservation.id,
        barber = reservation.barber_id,
        date = %reservation.date,
        slot = %reservation.slot,
        "reservation created"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_reservations<B, C, F>(
    State(state): State<AppState<B, C, F>>,
) -> Result<Json<Vec<Reservation>>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    let reservations = state.backend.reservations().map_err(error_response)?;
    Ok(Json(reservations))
}

fn transition<B, C, F>(
    state: &AppState<B, C, F>,
    id: Uuid,
    to: ReservationStatus,
) -> Result<Json<Reservation>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    let updated = state.backend.update_status(id, to).map_err(error_response)?;
    tracing::info!(
        reservation = %updated.id,
        status = %updated.status,
        "reservation status updated"
    );
    Ok(Json(updated))
}

async fn confirm_reservation<B, C, F>(
    State(state): State<AppState<B, C, F>>,
    Json(reference): Json<ReservationRef>,
) -> Result<Json<Reservation>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    transition(&state, reference.id, ReservationStatus::Confirmed)
}

async fn cancel_reservation<B, C, F>(
    State(state): State<AppState<B, C, F>>,
    Json(reference): Json<ReservationRef>,
) -> Result<Json<Reservation>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    transition(&state, reference.id, ReservationStatus::Cancelled)
}

async fn complete_reservation<B, C, F>(
    State(state): State<AppState<B, C, F>>,
    Json(reference): Json<ReservationRef>,
) -> Result<Json<Reservation>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    transition(&state, reference.id, ReservationStatus::Completed)
}

async fn get_frontend<B, C, F>(
    State(state): State<AppState<B, C, F>>,
) -> Result<Html<String>, (StatusCode, String)>
where
    B: ReservationBackend,
    C: Clock,
    F: Configuration,
{
    let path = state.config.frontend_path();
    match fs::read_to_string(&path).await {
        Ok(contents) => Ok(Html(contents)),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to read frontend file");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read frontend file: {err}"),
            ))
        }
    }
}

async fn get_admin_page() -> impl IntoResponse {
    StatusCode::OK
}
