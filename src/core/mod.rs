//! Core business logic for Statlake.
//!
//! # Modules
//!
//! - [`export`] - Tiered single-file export engine and run coordination
//! - [`frame`] - Distributed-frame seam used by the partitioned write
//! - [`reports`] - Report datasets derived from the raw NBA tables
//! - [`transform`] - CSV codec and performance variation
//!
//! # Export Workflow
//!
//! For each configured job:
//!
//! 1. **Stage**: Download the source CSV from the store
//! 2. **Derive**: Build the report dataset
//! 3. **Count**: Pick the direct or partitioned write
//! 4. **Write**: Publish exactly one file at the target path
//! 5. **Snapshot** (partitioned only): Upload a DuckDB copy next to the target
//! 6. **Report**: Record the outcome in the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use statlake::adapters::store::create_store;
//! use statlake::config::load_config;
//! use statlake::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("statlake.toml")?;
//! let store = create_store(&config.store)?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, store, shutdown_rx);
//!
//! let summary = coordinator.execute_export(&[]).await?;
//! println!("Succeeded: {}", summary.succeeded);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod frame;
pub mod reports;
pub mod transform;
