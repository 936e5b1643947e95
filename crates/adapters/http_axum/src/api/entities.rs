//! JSON REST handlers for entities.

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use airmon_app::ports::{Integration, IntegrationContext};
use airmon_domain::entity::Entity;
use airmon_domain::event::{Event, EventType};
use airmon_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

fn parse_id(id: &str) -> Result<EntityId, ApiError> {
    EntityId::from_str(id).map_err(|err| ApiError::BadRequest(format!("invalid entity id {id:?}: {err}")))
}

/// `GET /api/entities`
pub async fn list<I>(State(state): State<AppState<I>>) -> Json<Vec<Entity>>
where
    I: Integration + 'static,
{
    Json(state.registry.list_entities())
}

/// `GET /api/entities/{id}`
pub async fn get<I>(
    State(state): State<AppState<I>>,
    Path(id): Path<String>,
) -> Result<Json<Entity>, ApiError>
where
    I: Integration + 'static,
{
    let entity = state.registry.get_entity(parse_id(&id)?)?;
    Ok(Json(entity))
}

/// `POST /api/entities/{id}/services/{service}`
///
/// The body is optional; when present it must be a JSON object (for
/// `set_value`: `{"value": 300}`). The snapshot returned by the integration
/// is recorded before it is sent back, followed by a `service_called`
/// event.
pub async fn call_service<I>(
    State(state): State<AppState<I>>,
    Path((id, service)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Entity>, ApiError>
where
    I: Integration + 'static,
{
    let entity_id = parse_id(&id)?;
    let data = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::BadRequest(format!("invalid JSON body: {err}")))?
    };

    tracing::debug!(%entity_id, service = %service, "service call");
    let entity = state
        .integration
        .handle_service_call(entity_id, &service, data)
        .await?;
    let entity = state.registry.upsert_entity(entity).await?;
    state
        .registry
        .publish(Event::new(
            EventType::ServiceCalled,
            Some(entity_id),
            serde_json::json!({ "entity_id": entity.entity_id, "service": service }),
        ))
        .await?;
    Ok(Json(entity))
}
