//! External mirror store boundary.
//!
//! # Responsibility
//! - Define the narrow insert/fetch/wipe contract of the external store.
//! - Resolve mirrors by provider-style address instead of direct handles.
//!
//! # Invariants
//! - An unresolvable address is `MirrorError::NotAvailable`, never a panic.
//! - Pulled words keep their mirror id, so pushes replace rows in place.

mod registry;
mod sqlite;
mod types;

pub use registry::{MirrorRegistry, MirrorRegistryError};
pub use sqlite::SqliteMirrorStore;
pub use types::{
    snapshot_to_words, MirrorAddress, MirrorAddressError, MirrorError, MirrorRecord, MirrorResult,
    MirrorStore, MIRROR_SCHEME,
};
