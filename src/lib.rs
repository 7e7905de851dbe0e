//! Faceted full-text indexing and query aggregation powered by Tantivy
//!
//! This crate maintains a searchable, faceted index over externally supplied
//! item records and answers queries with ranked results plus aggregate facet
//! counts:
//!
//! - **Ingestion**: normalized [`ValueSet`] records, full-rebuild and
//!   incremental add/update/delete paths under single-writer exclusion
//! - **Facet Extraction**: pluggable [`FacetExtractor`]s derive (field,
//!   value) keys at index time
//! - **Facet Counting**: one sweep over the full match set, counters indexed
//!   by [`FacetMap`] ordinals
//! - **Criteria**: compiled, immutable queries via [`CriteriaBuilder`]
//! - **Notifications**: [`IndexingObserver`] lifecycle callbacks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              FacetedIndex API                    │
//! ├─────────────────────────────────────────────────┤
//! │  - rebuild_all()     - add_or_update()          │
//! │  - delete()          - find()                   │
//! │  - create_criteria() - stats()                  │
//! └─────────────────────────────────────────────────┘
//!            │                        │
//!            ▼                        ▼
//! ┌─────────────────────┐  ┌─────────────────────────┐
//! │  Facet Extraction    │  │  Query Execution        │
//! ├─────────────────────┤  ├─────────────────────────┤
//! │  - FacetExtractors   │  │  - full match set       │
//! │  - FacetMap ordinals │  │  - FacetTally sweep     │
//! └─────────────────────┘  └─────────────────────────┘
//!            │                        │
//!            ▼                        ▼
//! ┌─────────────────────────────────────────────────┐
//! │              Tantivy Index                       │
//! ├─────────────────────────────────────────────────┤
//! │  - Inverted Index      - Doc Store              │
//! │  - Directory Lock      - Reader Snapshots       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use facet_search::{
//!     FacetConfiguration, FacetedIndex, IndexConfigBuilder, ValueSet,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IndexConfigBuilder::new()
//!         .index_path("./data/cameras")
//!         .field("description")
//!         .field("manufacturer")
//!         .build();
//!     let facets = FacetConfiguration::new().with_term_facet("manufacturer");
//!
//!     let index = FacetedIndex::open(config, facets).await?;
//!     index
//!         .add_or_update(
//!             ValueSet::new(1, "content")
//!                 .with_value("description", "hello world")
//!                 .with_value("manufacturer", "Canon"),
//!         )
//!         .await?;
//!
//!     let criteria = index
//!         .create_criteria()
//!         .field("description", "hello")
//!         .compile();
//!     let results = index.find(&criteria).await?;
//!     println!("{} matches", results.total_hits);
//!
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod error;
mod facet;
mod index;
mod search;
mod value_set;

pub use config::{IndexConfig, IndexConfigBuilder};
pub use error::{IndexError, IndexResult};
pub use facet::{
    FacetConfiguration, FacetCount, FacetCounts, FacetExtractor, FacetKey, FacetMap,
    TermFacetExtractor,
};
pub use index::{CountingObserver, FacetedIndex, IndexStats, IndexingObserver};
pub use search::{
    CancelToken, CriteriaBuilder, FieldPredicate, SearchCriteria, SearchResult, SearchResults,
};
pub use value_set::ValueSet;
