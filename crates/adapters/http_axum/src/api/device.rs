//! JSON handler for the registered device.

use axum::Json;
use axum::extract::State;

use airmon_app::ports::Integration;
use airmon_domain::device::Device;
use airmon_domain::error::{AirmonError, NotFoundError};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/device`
pub async fn get<I>(State(state): State<AppState<I>>) -> Result<Json<Device>, ApiError>
where
    I: Integration + 'static,
{
    state.registry.device().map(Json).ok_or_else(|| {
        AirmonError::from(NotFoundError {
            entity: "Device",
            id: state.integration.name().to_string(),
        })
        .into()
    })
}
