use async_trait::async_trait;
use db::DBService;
use services::services::line_locks::LineLocks;
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
}

/// Shared application context handed to every route.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    /// Connects to `database_url`, or to the default database in the asset
    /// directory when `None`.
    async fn new(database_url: Option<&str>) -> Result<Self, DeploymentError>;

    fn db(&self) -> &DBService;

    fn line_locks(&self) -> &LineLocks;
}

pub fn default_database_url() -> Result<String, DeploymentError> {
    let path = utils::assets::database_path()?;
    Ok(format!("sqlite://{}", path.to_string_lossy()))
}
