//! Store factory
//!
//! Builds the configured [`DistributedStore`] backend.

use super::hdfs::HdfsStore;
use super::local::LocalStore;
use super::traits::DistributedStore;
use crate::config::{StoreConfig, StoreKind};
use crate::domain::{PipelineError, Result};
use std::sync::Arc;

/// Create a store handle based on the configuration
///
/// # Errors
///
/// Returns an error if the backend cannot be initialised (for example an
/// unparseable WebHDFS URL or a missing local root).
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn DistributedStore>> {
    match config.kind {
        StoreKind::Hdfs => {
            tracing::info!(
                rpc_url = %config.hdfs.rpc_url,
                web_url = %config.hdfs.web_url,
                user = %config.hdfs.user,
                "Creating HDFS store"
            );
            let store = HdfsStore::new(&config.hdfs, config.retry.clone())?;
            Ok(Arc::new(store) as Arc<dyn DistributedStore>)
        }
        StoreKind::Local => {
            let root = config.local_root.as_deref().ok_or_else(|| {
                PipelineError::Configuration(
                    "store.local_root is required when store.kind = 'local'".to_string(),
                )
            })?;

            tracing::info!(root = %root, "Creating local store");
            Ok(Arc::new(LocalStore::new(root)) as Arc<dyn DistributedStore>)
        }
    }
}
