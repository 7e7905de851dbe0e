//! Facet extraction, the ordinal registry, and the counting engine

mod counting;
mod extractor;
mod map;

pub use counting::{FacetCount, FacetCounts};
pub use extractor::{FacetConfiguration, FacetExtractor, FacetKey, TermFacetExtractor};
pub use map::FacetMap;

pub(crate) use counting::FacetTally;
