use std::sync::Arc;

use super::SqlJob;
use crate::{config::JobConfig, errors::Error, transport::Transport, Result};

/// Builder for building a [`SqlJob`].
pub struct SqlJobBuilder {
    transport: Arc<dyn Transport>,
    config: JobConfig,
}

#[allow(clippy::return_self_not_must_use)]
impl SqlJobBuilder {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: JobConfig::default(),
        }
    }

    #[inline]
    pub fn config(mut self, config: JobConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn default_rows_to_fetch(mut self, rows: u32) -> Self {
        self.config.default_rows_to_fetch = rows;
        self
    }

    #[inline]
    pub fn track_queries(mut self, enabled: bool) -> Self {
        self.config.track_queries = enabled;
        self
    }

    pub fn build(self) -> Result<Arc<SqlJob>> {
        if self.config.default_rows_to_fetch == 0 {
            return Err(Error::Config(
                "default_rows_to_fetch must be at least 1".to_string(),
            ));
        }

        Ok(Arc::new(SqlJob::new(self.transport, self.config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_build() {
        let job = SqlJobBuilder::new(Arc::new(MockTransport::new()))
            .default_rows_to_fetch(25)
            .track_queries(false)
            .build()
            .unwrap();
        assert_eq!(25, job.config().default_rows_to_fetch);
        assert!(!job.config().track_queries);
    }

    #[test]
    fn test_reject_zero_rows() {
        let res = SqlJobBuilder::new(Arc::new(MockTransport::new()))
            .default_rows_to_fetch(0)
            .build();
        assert!(matches!(res, Err(Error::Config(_))));
    }
}
