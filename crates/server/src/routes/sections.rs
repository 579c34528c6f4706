use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::section::{CreateSection, Section};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{
    line_sections::{LineSectionService, LineServiceError},
    section_store::SqliteSectionStore,
};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveStationQuery {
    station_id: Option<i64>,
}

fn section_service(deployment: &DeploymentImpl) -> LineSectionService<SqliteSectionStore> {
    LineSectionService::new(
        SqliteSectionStore::new(deployment.db().pool.clone()),
        deployment.line_locks().clone(),
    )
}

/// Sections of the line in path order.
pub async fn get_sections(
    State(deployment): State<DeploymentImpl>,
    Path(line_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Section>>>, ApiError> {
    let path = section_service(&deployment).path(line_id).await?;
    Ok(ResponseJson(ApiResponse::success(path.into_sections())))
}

pub async fn create_section(
    State(deployment): State<DeploymentImpl>,
    Path(line_id): Path<i64>,
    Json(payload): Json<CreateSection>,
) -> Result<impl IntoResponse, ApiError> {
    let up = payload
        .up_station_id
        .ok_or(LineServiceError::MissingField("upStationId"))?;
    let down = payload
        .down_station_id
        .ok_or(LineServiceError::MissingField("downStationId"))?;
    let distance = payload
        .distance
        .ok_or(LineServiceError::MissingField("distance"))?;

    let path = section_service(&deployment)
        .insert_section(line_id, up, down, distance)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/lines/{line_id}"))],
        ResponseJson(ApiResponse::success(path.into_sections())),
    ))
}

pub async fn delete_section(
    State(deployment): State<DeploymentImpl>,
    Path(line_id): Path<i64>,
    Query(query): Query<RemoveStationQuery>,
) -> Result<StatusCode, ApiError> {
    let station_id = query
        .station_id
        .ok_or_else(|| ApiError::BadRequest("stationId is required".to_string()))?;

    section_service(&deployment)
        .remove_station(line_id, station_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().route(
        "/lines/{line_id}/sections",
        get(get_sections).post(create_section).delete(delete_section),
    )
}
