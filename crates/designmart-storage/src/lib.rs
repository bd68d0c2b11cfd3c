//! Designmart storage library
//!
//! Filesystem persistence for design asset bundles and the security-sensitive
//! delivery resolver.
//!
//! # On-disk layout
//!
//! ```text
//! <asset-root>/designs/<design_id>/preview/<generated>.<ext>
//! <asset-root>/designs/<design_id>/preview/watermarked/<generated>.<ext>   (optional)
//! <asset-root>/designs/<design_id>/raw/<generated>.<ext>
//! ```
//!
//! Every file of a design lives under that design's id, so deleting all files
//! for a design is a single subtree removal. Generated filenames are opaque
//! UUIDs; the client-supplied name never participates in path construction.

pub mod delivery;
pub mod error;
pub mod vault;

pub use delivery::{DeliveryResolver, ResolvedFile};
pub use error::{StorageError, StorageResult};
pub use vault::DesignVault;
