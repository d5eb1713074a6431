//! File-backed cache store shared by all lookup providers
//!
//! This module provides a keyed store that persists fetched JSON documents
//! to a single backing file with per-read TTL evaluation. The file is
//! re-read on every operation, so independent callers sharing one backing
//! path always see the latest table.

mod file_store;

pub use file_store::{FileStore, StoreError};
