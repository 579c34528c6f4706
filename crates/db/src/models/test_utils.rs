use sqlx::SqlitePool;

use crate::DBService;

use super::{
    line::Line,
    section::Section,
    station::{CreateStation, Station},
};

pub(crate) async fn setup_test_pool() -> SqlitePool {
    DBService::new_in_memory()
        .await
        .expect("failed to open sqlite memory db")
        .pool
}

pub(crate) async fn create_test_station(pool: &SqlitePool, name: &str) -> Station {
    Station::create(pool, &CreateStation { name: name.into() })
        .await
        .expect("failed to create test station")
}

pub(crate) async fn create_test_line(
    pool: &SqlitePool,
    name: &str,
    up_station_id: i64,
    down_station_id: i64,
    distance: i64,
) -> Line {
    Line::create_with_section(
        pool,
        name,
        "red",
        &Section::new(0, up_station_id, down_station_id, distance),
    )
    .await
    .expect("failed to create test line")
}
