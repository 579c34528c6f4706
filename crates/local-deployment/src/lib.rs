use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError, default_database_url};
use services::services::line_locks::LineLocks;

#[derive(Clone)]
pub struct LocalDeployment {
    db: DBService,
    line_locks: LineLocks,
}

impl LocalDeployment {
    /// Wraps an already opened database.
    pub fn from_db(db: DBService) -> Self {
        Self {
            db,
            line_locks: LineLocks::new(),
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new(database_url: Option<&str>) -> Result<Self, DeploymentError> {
        let database_url = match database_url {
            Some(url) => url.to_string(),
            None => default_database_url()?,
        };
        let db = DBService::new(&database_url).await?;
        tracing::info!("Connected to {}", database_url);
        Ok(Self::from_db(db))
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn line_locks(&self) -> &LineLocks {
        &self.line_locks
    }
}
