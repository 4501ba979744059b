//! Part-file discovery in a partitioned-write directory

use crate::adapters::store::{DistributedStore, Listing, StoreEntry};
use crate::domain::{Result, StorePath};

/// Result of searching a temporary directory for the output fragment
#[derive(Debug, Clone)]
pub enum PartLocation {
    /// Path of the first data fragment
    Found(StorePath),
    /// No fragment; the listing is kept for diagnostics
    NotFound { listing: Listing },
}

/// Whether `entry` is a data fragment rather than a sidecar
///
/// Fragments are files named `part-*`; checksum files (`*.crc`), markers
/// such as `_SUCCESS` and commit-protocol files are not.
pub fn is_part_file(entry: &StoreEntry) -> bool {
    let name = entry.name();
    !entry.is_dir && name.starts_with("part-") && !name.ends_with(".crc")
}

/// First fragment in listing order
pub fn find_part(entries: &[StoreEntry]) -> Option<&StoreEntry> {
    entries.iter().find(|entry| is_part_file(entry))
}

/// List `tmp_dir` and pick the data fragment
///
/// # Errors
///
/// Propagates `StoreError::ListFailed` when the directory cannot be listed.
pub async fn locate_part(store: &dyn DistributedStore, tmp_dir: &StorePath) -> Result<PartLocation> {
    let listing = store.list(tmp_dir).await?;
    tracing::debug!(tmp_path = %tmp_dir, listing = %listing.raw, "Listed temporary directory");

    Ok(match find_part(&listing.entries) {
        Some(entry) => PartLocation::Found(entry.path.clone()),
        None => PartLocation::NotFound { listing },
    })
}
