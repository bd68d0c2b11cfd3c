//! Domain models for the design pipeline.

mod design;

pub use design::{
    Design, DesignFilter, DesignSort, DesignSummary, FileRole, NewDesign, OwnerStats, Page,
    PageInfo, PendingDesign, RawFormat, ReviewState, StoredFile, MAX_TAGS,
};
