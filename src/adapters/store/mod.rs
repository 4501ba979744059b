//! Distributed store adapters
//!
//! - [`traits`] - the [`DistributedStore`] capability trait
//! - [`hdfs`] - HDFS via `hdfs dfs` and WebHDFS
//! - [`local`] - local directory backend
//! - [`factory`] - backend selection from configuration

pub mod command;
pub mod factory;
pub mod hdfs;
pub mod local;
mod retry;
pub mod traits;
pub mod webhdfs;

pub use factory::create_store;
pub use hdfs::HdfsStore;
pub use local::LocalStore;
pub use traits::{DistributedStore, Listing, MoveResult, StoreEntry};
