//! External system integrations for Statlake.
//!
//! - [`store`] - distributed store abstraction with HDFS and local backends
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-process implementations. The export engine only ever
//! sees an `Arc<dyn DistributedStore>`:
//!
//! ```rust,no_run
//! use statlake::adapters::store::{DistributedStore, LocalStore};
//! use statlake::domain::StorePath;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn DistributedStore> = Arc::new(LocalStore::new("/srv/lake"));
//! let listing = store.list(&StorePath::new("/data_processed")?).await?;
//! for entry in listing.entries {
//!     println!("{}", entry.path);
//! }
//! # Ok(())
//! # }
//! ```

pub mod store;
