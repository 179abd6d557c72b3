use std::sync::Arc;

use crate::entities::visitor::VisitorTotal;
use crate::errors::AppError;
use crate::repositories::visitor::VisitorRepository;

#[derive(Clone)]
pub struct VisitorHandler {
    pub repo: Arc<dyn VisitorRepository>,
}

impl VisitorHandler {
    pub fn new(repo: Arc<dyn VisitorRepository>) -> Self {
        VisitorHandler { repo }
    }

    /// Counts each client address once and returns the running total.
    pub async fn record_visit(&self, ip: &str, user_agent: Option<String>) -> Result<VisitorTotal, AppError> {
        if self.repo.record_visit(ip, user_agent).await? {
            tracing::debug!(%ip, "New visitor");
        }
        self.total().await
    }

    pub async fn total(&self) -> Result<VisitorTotal, AppError> {
        Ok(VisitorTotal { total: self.repo.count().await? })
    }
}
