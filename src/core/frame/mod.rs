//! Dataframe engine abstraction
//!
//! The export engine never looks inside a dataset's execution strategy; it
//! only needs three capabilities: a row count, a full in-memory collect, and a
//! write of the whole dataset as a single fragment into a store directory.

use crate::adapters::store::DistributedStore;
use crate::core::transform::encode_table;
use crate::domain::{PipelineError, Result, StorePath, Table};
use async_trait::async_trait;
use uuid::Uuid;

/// Marker object written next to the fragment once the write completes
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Opaque dataset handle consumed by the export engine
#[async_trait]
pub trait FrameEngine: Send + Sync {
    /// Number of rows in the dataset
    async fn count(&self) -> Result<u64>;

    /// Materialize the whole dataset in memory
    async fn collect(&self) -> Result<Table>;

    /// Write the dataset as one CSV fragment (with header) into `dir`
    ///
    /// The fragment is named `part-<n>-<id>-c000.csv`; the directory may also
    /// receive sidecar objects such as [`SUCCESS_MARKER`].
    async fn write_single_fragment(&self, store: &dyn DistributedStore, dir: &StorePath)
        -> Result<()>;
}

/// [`FrameEngine`] over an in-process [`Table`]
#[derive(Debug, Clone)]
pub struct InMemoryFrame {
    table: Table,
}

impl InMemoryFrame {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

#[async_trait]
impl FrameEngine for InMemoryFrame {
    async fn count(&self) -> Result<u64> {
        Ok(self.table.row_count() as u64)
    }

    async fn collect(&self) -> Result<Table> {
        Ok(self.table.clone())
    }

    async fn write_single_fragment(
        &self,
        store: &dyn DistributedStore,
        dir: &StorePath,
    ) -> Result<()> {
        let content = encode_table(&self.table)?;
        let fragment = dir
            .join(&format!("part-00000-{}-c000.csv", Uuid::new_v4()))
            .map_err(PipelineError::Other)?;
        let marker = dir.join(SUCCESS_MARKER).map_err(PipelineError::Other)?;

        store.write_text(&fragment, &content).await?;
        store.write_text(&marker, "").await?;

        tracing::debug!(
            fragment = %fragment,
            rows = self.table.row_count(),
            "Wrote single fragment"
        );
        Ok(())
    }
}
