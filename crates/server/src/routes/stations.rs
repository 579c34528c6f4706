use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::station::{CreateStation, Station, StationError};
use deployment::Deployment;
use services::services::{line_sections::LineCascadeOutcome, stations::StationService};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

pub async fn get_stations(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Station>>>, ApiError> {
    let stations = Station::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(stations)))
}

pub async fn get_station(
    State(deployment): State<DeploymentImpl>,
    Path(station_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Station>>, ApiError> {
    let station = Station::find_by_id(&deployment.db().pool, station_id)
        .await?
        .ok_or(StationError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(station)))
}

pub async fn create_station(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateStation>,
) -> Result<impl IntoResponse, ApiError> {
    let station = Station::create(&deployment.db().pool, &payload).await?;
    tracing::info!(station_id = station.id, name = %station.name, "Station created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/stations/{}", station.id))],
        ResponseJson(ApiResponse::success(station)),
    ))
}

/// Removes the station from every line first; the body lists what happened
/// to each of those lines.
pub async fn delete_station(
    State(deployment): State<DeploymentImpl>,
    Path(station_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<LineCascadeOutcome>>>, ApiError> {
    let outcomes =
        StationService::delete_station(&deployment.db().pool, deployment.line_locks(), station_id)
            .await?;
    Ok(ResponseJson(ApiResponse::success(outcomes)))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/stations", get(get_stations).post(create_station))
        .route("/stations/{station_id}", get(get_station).delete(delete_station))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use serde_json::json;

    use crate::routes::test_support::{
        create_line, create_station, json_body, line_station_ids, send, test_app,
        test_app_with_pool,
    };

    #[tokio::test]
    async fn create_list_and_fetch_stations() {
        let app = test_app().await;

        let response = send(&app, "POST", "/api/stations", Some(json!({ "name": "Gangnam" }))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        let id = json_body(response).await["data"]["id"].as_i64().unwrap();
        assert_eq!(location, format!("/api/stations/{id}"));

        create_station(&app, "Seongsu").await;

        let list = json_body(send(&app, "GET", "/api/stations", None).await).await;
        let names: Vec<&str> = list["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Gangnam", "Seongsu"]);

        let one = json_body(send(&app, "GET", &location, None).await).await;
        assert_eq!(one["data"]["name"], "Gangnam");
    }

    #[tokio::test]
    async fn duplicate_and_missing_stations_are_rejected() {
        let app = test_app().await;
        create_station(&app, "Gangnam").await;

        let duplicate = send(&app, "POST", "/api/stations", Some(json!({ "name": "Gangnam" }))).await;
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(duplicate).await["success"], false);

        let missing = send(&app, "GET", "/api/stations/999", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let delete_missing = send(&app, "DELETE", "/api/stations/999", None).await;
        assert_eq!(delete_missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_a_station_cascades_through_its_lines() {
        let app = test_app().await;
        let s1 = create_station(&app, "Gangnam").await;
        let s2 = create_station(&app, "Seongsu").await;
        let s3 = create_station(&app, "Jamsillaru").await;
        let s4 = create_station(&app, "Madu").await;

        let long = create_line(&app, "Line 2", s1, s2, 5).await;
        let section = send(
            &app,
            "POST",
            &format!("/api/lines/{long}/sections"),
            Some(json!({ "upStationId": s2, "downStationId": s3, "distance": 5 })),
        )
        .await;
        assert_eq!(section.status(), StatusCode::CREATED);
        let short = create_line(&app, "Shuttle", s2, s4, 3).await;

        let response = send(&app, "DELETE", &format!("/api/stations/{s2}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let outcomes = json_body(response).await["data"].clone();
        assert_eq!(outcomes[0]["lineId"], long);
        assert_eq!(outcomes[0]["result"]["kind"], "sectionsMerged");
        assert_eq!(outcomes[1]["lineId"], short);
        assert_eq!(outcomes[1]["result"]["kind"], "lineDeleted");

        assert_eq!(line_station_ids(&app, long).await, vec![s1, s3]);
        let merged = json_body(send(&app, "GET", &format!("/api/lines/{long}"), None).await).await;
        assert_eq!(merged["data"]["totalDistance"], 10);

        let gone_line = send(&app, "GET", &format!("/api/lines/{short}"), None).await;
        assert_eq!(gone_line.status(), StatusCode::NOT_FOUND);
        let gone_station = send(&app, "GET", &format!("/api/stations/{s2}"), None).await;
        assert_eq!(gone_station.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn incomplete_cascade_is_a_conflict_with_outcomes() {
        let (app, pool) = test_app_with_pool().await;
        let s1 = create_station(&app, "Gangnam").await;
        let s2 = create_station(&app, "Seongsu").await;
        let s3 = create_station(&app, "Jamsillaru").await;

        // A second section leaving s1 makes this line branch.
        let broken = create_line(&app, "Broken", s1, s2, 5).await;
        sqlx::query(
            "INSERT INTO sections (line_id, up_station_id, down_station_id, distance) VALUES ($1, $2, $3, $4)",
        )
        .bind(broken)
        .bind(s1)
        .bind(s3)
        .bind(4)
        .execute(&pool)
        .await
        .unwrap();
        let healthy = create_line(&app, "Healthy", s2, s3, 7).await;
        let extend = send(
            &app,
            "POST",
            &format!("/api/lines/{healthy}/sections"),
            Some(json!({ "upStationId": s1, "downStationId": s2, "distance": 3 })),
        )
        .await;
        assert_eq!(extend.status(), StatusCode::CREATED);

        let response = send(&app, "DELETE", &format!("/api/stations/{s2}"), None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains(&broken.to_string()));

        let outcomes = body["data"].as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["lineId"], broken);
        assert_eq!(outcomes[0]["result"]["kind"], "failed");
        assert!(outcomes[0]["result"]["reason"].is_string());
        assert_eq!(outcomes[1]["lineId"], healthy);
        assert_eq!(outcomes[1]["result"]["kind"], "sectionsMerged");

        let kept = send(&app, "GET", &format!("/api/stations/{s2}"), None).await;
        assert_eq!(kept.status(), StatusCode::OK);
        assert_eq!(line_station_ids(&app, healthy).await, vec![s1, s3]);
    }
}
