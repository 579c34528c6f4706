use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::line::{CreateLine, Line, LineWithStations, UpdateLine};
use deployment::Deployment;
use services::services::lines::LineService;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

pub async fn get_lines(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Line>>>, ApiError> {
    let lines = Line::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(lines)))
}

pub async fn get_line(
    State(deployment): State<DeploymentImpl>,
    Path(line_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<LineWithStations>>, ApiError> {
    let line = LineService::find_with_stations(&deployment.db().pool, line_id).await?;
    Ok(ResponseJson(ApiResponse::success(line)))
}

pub async fn create_line(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateLine>,
) -> Result<impl IntoResponse, ApiError> {
    let line = LineService::create_line(&deployment.db().pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/lines/{}", line.id))],
        ResponseJson(ApiResponse::success(line)),
    ))
}

pub async fn update_line(
    State(deployment): State<DeploymentImpl>,
    Path(line_id): Path<i64>,
    Json(payload): Json<UpdateLine>,
) -> Result<ResponseJson<ApiResponse<Line>>, ApiError> {
    let line = Line::update(&deployment.db().pool, line_id, payload).await?;
    tracing::info!(line_id, name = %line.name, color = %line.color, "Line updated");
    Ok(ResponseJson(ApiResponse::success(line)))
}

pub async fn delete_line(
    State(deployment): State<DeploymentImpl>,
    Path(line_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    LineService::delete_line(&deployment.db().pool, deployment.line_locks(), line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/lines", get(get_lines).post(create_line))
        .route(
            "/lines/{line_id}",
            get(get_line).put(update_line).delete(delete_line),
        )
}
