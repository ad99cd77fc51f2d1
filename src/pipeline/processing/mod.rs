// Pipeline processing: key normalization, scoring, aggregation, merge and composite indices

pub mod aggregate;
pub mod categories;
pub mod compose;
pub mod fields;
pub mod merge;
pub mod normalize;
pub mod ranking;
pub mod scoring;

pub use categories::{AlertLevel, Channel};
pub use compose::{ComposedFacility, CompositeIndices, IndexComposer};
pub use merge::MergedFacilityRow;
