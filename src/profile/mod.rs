//! Per-printer profiles: what OIDs a device exposes and how to read them.
//!
//! A profile is built once by the strategic-walk discoverer, cached in
//! memory, persisted as one JSON file per printer, and refreshed when its
//! freshness invariants expire. Subsequent polls use it to skip
//! re-discovery entirely.

pub mod consistency;
pub mod discover;
pub mod names;
pub mod store;
pub mod types;

pub use consistency::ConsistencyChecker;
pub use discover::{Discoverer, classify_oid};
pub use names::FriendlyNameResolver;
pub use store::{ProfileError, ProfileStore};
pub use types::{Capabilities, OidCategory, OidMetadata, Profile};
