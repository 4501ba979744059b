// Statlake - Single-file NBA statistics exports for HDFS
// Copyright (c) 2025 Statlake Contributors
// Licensed under the MIT License

//! # Statlake - single-file exports to a distributed store
//!
//! Statlake derives report datasets from raw NBA statistics and publishes each
//! one as exactly one CSV file at a fixed path in HDFS (or a local directory
//! standing in for it).
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Deriving** report datasets (career variation, spectacular games)
//! - **Writing** small datasets directly and large ones through a partitioned
//!   write promoted to the target by move, or by copy when the move fails
//! - **Snapshotting** partitioned exports into DuckDB files
//! - **Reporting** every job's state transitions and outcome
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export engine, reports, transforms)
//! - [`adapters`] - Store backends (HDFS, local filesystem)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statlake::adapters::store::create_store;
//! use statlake::config::load_config;
//! use statlake::core::export::ExportCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("statlake.toml")?;
//!     let store = create_store(&config.store)?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = ExportCoordinator::new(config, store, shutdown_rx);
//!
//!     let summary = coordinator.execute_export(&[]).await?;
//!     println!("Exported {} of {} jobs", summary.succeeded, summary.total_jobs);
//!     Ok(())
//! }
//! ```
//!
//! ## Running a single job
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use statlake::adapters::store::LocalStore;
//! use statlake::core::export::{EngineSettings, ExportJob, TieredExportEngine};
//! use statlake::core::frame::InMemoryFrame;
//! use statlake::domain::{JobName, StorePath, Table};
//!
//! # async fn example(table: Table) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(LocalStore::new("/srv/statlake"));
//! let engine = TieredExportEngine::new(store, EngineSettings::default());
//!
//! let job = ExportJob::new(
//!     JobName::new("career_stats")?,
//!     StorePath::new("/data_processed/career_stats_clean.csv")?,
//!     StorePath::new("/data_processed/_tmp_career_stats")?,
//!     50_000,
//! );
//! let report = engine.run(&job, &InMemoryFrame::new(table)).await;
//! println!("{:?}", report.transitions);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`], carrying a [`domain::PipelineError`].
//! Engine failures are typed as [`domain::ExportError`] and recorded on the
//! job's report instead of aborting the run.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
