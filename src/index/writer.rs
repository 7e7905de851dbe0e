//! Index ownership and mutation

use crate::config::IndexConfig;
use crate::document::{
    self, build_schema, doc_key, stored_facet_keys, CATEGORY_FIELD, DOC_KEY_FIELD,
};
use crate::error::{IndexError, IndexResult};
use crate::facet::{FacetConfiguration, FacetMap};
use crate::index::observer::IndexingObserver;
use crate::search::{
    CancelToken, CriteriaBuilder, MatchSetCollector, QueryExecutor, SearchCriteria, SearchResults,
};
use crate::value_set::ValueSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tantivy::query::AllQuery;
use tantivy::schema::Schema;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Index size in bytes
    pub index_size_bytes: u64,

    /// Number of segments
    pub num_segments: usize,

    /// Last commit timestamp
    pub last_commit: Option<DateTime<Utc>>,
}

/// A faceted index over one storage location.
///
/// Owns exclusive write access: the engine's directory lock is acquired at
/// open and held for the instance lifetime, so a second instance on the same
/// location fails with [`IndexError::IndexLocked`]. Within an instance,
/// mutations serialize on the writer guard with a bounded wait.
///
/// Queries run against reader snapshots and never observe a partially
/// committed mutation.
pub struct FacetedIndex {
    index: Index,
    schema: Schema,
    writer: Arc<RwLock<IndexWriter>>,
    reader: IndexReader,
    facet_map: Arc<FacetMap>,
    facets: FacetConfiguration,
    observers: parking_lot::RwLock<Vec<Arc<dyn IndexingObserver>>>,
    last_commit: parking_lot::Mutex<Option<DateTime<Utc>>>,
    healthy: AtomicBool,
    config: IndexConfig,
}

impl FacetedIndex {
    /// Open or create the index at the configured location.
    ///
    /// The facet configuration is fixed for the lifetime of the index: a
    /// field without an extractor here cannot be counted later without a
    /// rebuild. Opening an existing index warms the facet map from the
    /// stored facet payloads so counting works across restarts.
    pub async fn open(config: IndexConfig, facets: FacetConfiguration) -> IndexResult<Self> {
        std::fs::create_dir_all(&config.index_path).map_err(|e| {
            IndexError::InitFailed(format!("failed to create index directory: {}", e))
        })?;

        let existing = Self::index_exists(&config.index_path);
        let index = if existing {
            Index::open_in_dir(&config.index_path)
                .map_err(|e| IndexError::CorruptOrMissing(e.to_string()))?
        } else {
            Index::create_in_dir(&config.index_path, build_schema(&config))
                .map_err(|e| IndexError::InitFailed(e.to_string()))?
        };
        let schema = index.schema();

        // Takes the engine's directory lock for the instance lifetime.
        let writer = index.writer(config.writer_heap_size)?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e: tantivy::TantivyError| IndexError::InitFailed(e.to_string()))?;

        let faceted = Self {
            index,
            schema,
            writer: Arc::new(RwLock::new(writer)),
            reader,
            facet_map: Arc::new(FacetMap::new()),
            facets,
            observers: parking_lot::RwLock::new(Vec::new()),
            last_commit: parking_lot::Mutex::new(None),
            healthy: AtomicBool::new(true),
            config,
        };

        if existing {
            faceted.warm_facet_map()?;
        }

        info!(
            path = %faceted.config.index_path.display(),
            existing,
            facet_keys = faceted.facet_map.len(),
            "faceted index opened"
        );

        Ok(faceted)
    }

    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    /// Re-register the facet keys stored on existing documents so ordinal
    /// lookups resolve in this process.
    fn warm_facet_map(&self) -> IndexResult<()> {
        let searcher = self.reader.searcher();
        let matches = searcher
            .search(&AllQuery, &MatchSetCollector)
            .map_err(|e| IndexError::InitFailed(e.to_string()))?;

        for (_score, address) in matches {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| IndexError::InitFailed(e.to_string()))?;
            if let Some(keys) = stored_facet_keys(&doc, &self.schema) {
                for key in &keys {
                    self.facet_map.register(key);
                }
            }
        }

        debug!(facet_keys = self.facet_map.len(), "facet map warmed");
        Ok(())
    }

    /// Register a lifecycle observer
    pub fn register_observer(&self, observer: Arc<dyn IndexingObserver>) {
        self.observers.write().push(observer);
    }

    fn notify(&self, f: impl Fn(&dyn IndexingObserver)) {
        for observer in self.observers.read().iter() {
            f(observer.as_ref());
        }
    }

    /// The facet key registry for the current index generation
    pub fn facet_map(&self) -> &FacetMap {
        &self.facet_map
    }

    /// Whether the last whole-operation mutation left the index intact.
    /// A failed rebuild flags the index until the next successful rebuild.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn writer_guard(&self) -> IndexResult<tokio::sync::RwLockWriteGuard<'_, IndexWriter>> {
        tokio::time::timeout(self.config.lock_timeout, self.writer.write())
            .await
            .map_err(|_| IndexError::IndexLocked)
    }

    fn mark_commit(&self) {
        *self.last_commit.lock() = Some(Utc::now());
        // Keeps queries immediately consistent with the commit; the reload
        // policy covers external readers.
        if let Err(e) = self.reader.reload() {
            warn!(error = %e, "reader reload after commit failed");
        }
    }

    /// Extract facets, register their ordinals, and hand the document to the
    /// engine as a delete-then-add keyed on `(category, id)`.
    fn add_item(&self, writer: &mut IndexWriter, item: &ValueSet) -> IndexResult<()> {
        let keys = self.facets.extract(item);
        for key in &keys {
            self.facet_map.register(key);
        }

        let doc = document::to_document(item, &keys, &self.schema)?;

        let key_field = self
            .schema
            .get_field(DOC_KEY_FIELD)
            .map_err(|e| IndexError::Engine(e.to_string()))?;
        writer.delete_term(Term::from_field_text(
            key_field,
            &doc_key(&item.category, item.id),
        ));

        writer
            .add_document(doc)
            .map_err(|e| IndexError::IndexingFailed(e.to_string()))?;
        Ok(())
    }

    /// Add one item, replacing any existing document with the same id in the
    /// same category. The engine has no in-place update primitive.
    pub async fn add_or_update(&self, item: ValueSet) -> IndexResult<()> {
        if !self.config.accepts_category(&item.category) {
            debug!(id = item.id, category = %item.category, "ignoring item excluded by category rules");
            self.notify(|o| o.item_ignored(item.id, &item.category));
            return Ok(());
        }

        let mut writer = self.writer_guard().await?;
        match self.add_item(&mut writer, &item) {
            Ok(()) => {}
            Err(e) => {
                let _ = writer.rollback();
                self.notify(|o| o.indexing_error(Some(item.id), &e.to_string()));
                return Err(e);
            }
        }

        if let Err(e) = writer.commit() {
            let _ = writer.rollback();
            let err = IndexError::IndexingFailed(e.to_string());
            self.notify(|o| o.indexing_error(Some(item.id), &err.to_string()));
            return Err(err);
        }
        drop(writer);

        self.mark_commit();
        self.notify(|o| o.item_indexed(item.id, &item.category));
        debug!(id = item.id, category = %item.category, "item indexed");
        Ok(())
    }

    /// Delete the document for an id within a category
    pub async fn delete(&self, id: i64, category: &str) -> IndexResult<()> {
        let mut writer = self.writer_guard().await?;

        let key_field = self
            .schema
            .get_field(DOC_KEY_FIELD)
            .map_err(|e| IndexError::Engine(e.to_string()))?;
        writer.delete_term(Term::from_field_text(key_field, &doc_key(category, id)));

        if let Err(e) = writer.commit() {
            let _ = writer.rollback();
            let err = IndexError::DeletionFailed(e.to_string());
            self.notify(|o| o.indexing_error(Some(id), &err.to_string()));
            return Err(err);
        }
        drop(writer);

        self.mark_commit();
        self.notify(|o| o.item_deleted(id));
        debug!(id, category, "item deleted from index");
        Ok(())
    }

    /// Rebuild the entire index from scratch.
    ///
    /// Deletes all content, re-extracts and re-adds every item, then commits
    /// once. Per-item failures are reported through observers and the batch
    /// continues; a whole-operation failure rolls back to the prior committed
    /// state and flags the index unhealthy. Returns the number of items
    /// indexed.
    pub async fn rebuild_all(&self, items: Vec<ValueSet>) -> IndexResult<usize> {
        let mut writer = self.writer_guard().await?;

        info!(items = items.len(), "rebuilding index");
        self.notify(|o| o.batch_started(items.len()));

        if let Err(e) = writer.delete_all_documents() {
            return self.fail_operation(&mut writer, e.into());
        }
        // New generation: ordinals may renumber.
        self.facet_map.reset();

        let indexed = self.add_batch(&mut writer, &items);

        if let Err(e) = writer.commit() {
            return self.fail_operation(&mut writer, e.into());
        }
        drop(writer);

        self.healthy.store(true, Ordering::SeqCst);
        self.mark_commit();
        self.notify(|o| o.batch_completed(indexed));
        info!(indexed, "index rebuild complete");
        Ok(indexed)
    }

    /// Rebuild the content of one category, leaving other categories intact
    pub async fn rebuild_category(
        &self,
        category: &str,
        items: Vec<ValueSet>,
    ) -> IndexResult<usize> {
        let mut writer = self.writer_guard().await?;

        info!(category, items = items.len(), "rebuilding category");
        self.notify(|o| o.batch_started(items.len()));

        let category_field = self
            .schema
            .get_field(CATEGORY_FIELD)
            .map_err(|e| IndexError::Engine(e.to_string()))?;
        writer.delete_term(Term::from_field_text(category_field, category));

        let mut scoped: Vec<&ValueSet> = Vec::new();
        for item in &items {
            if item.category == category {
                scoped.push(item);
            } else {
                self.notify(|o| o.item_ignored(item.id, &item.category));
            }
        }
        let indexed = self.add_batch_refs(&mut writer, &scoped);

        if let Err(e) = writer.commit() {
            return self.fail_operation(&mut writer, e.into());
        }
        drop(writer);

        self.healthy.store(true, Ordering::SeqCst);
        self.mark_commit();
        self.notify(|o| o.batch_completed(indexed));
        info!(category, indexed, "category rebuild complete");
        Ok(indexed)
    }

    fn add_batch(&self, writer: &mut IndexWriter, items: &[ValueSet]) -> usize {
        let refs: Vec<&ValueSet> = items.iter().collect();
        self.add_batch_refs(writer, &refs)
    }

    fn add_batch_refs(&self, writer: &mut IndexWriter, items: &[&ValueSet]) -> usize {
        let mut indexed = 0usize;
        for item in items {
            if !self.config.accepts_category(&item.category) {
                self.notify(|o| o.item_ignored(item.id, &item.category));
                continue;
            }
            match self.add_item(writer, item) {
                Ok(()) => {
                    indexed += 1;
                    self.notify(|o| o.item_indexed(item.id, &item.category));
                }
                Err(e) => {
                    warn!(id = item.id, error = %e, "failed to index item");
                    self.notify(|o| o.indexing_error(Some(item.id), &e.to_string()));
                }
            }
        }
        indexed
    }

    fn fail_operation<T>(
        &self,
        writer: &mut IndexWriter,
        err: IndexError,
    ) -> IndexResult<T> {
        self.healthy.store(false, Ordering::SeqCst);
        let _ = writer.rollback();
        error!(error = %err, "index operation failed");
        self.notify(|o| o.indexing_error(None, &err.to_string()));
        Err(err)
    }

    /// Commit pending changes
    pub async fn commit(&self) -> IndexResult<()> {
        let mut writer = self.writer_guard().await?;
        writer
            .commit()
            .map_err(|e| IndexError::IndexingFailed(e.to_string()))?;
        drop(writer);
        self.mark_commit();
        Ok(())
    }

    /// Trigger segment merging via the engine's merge policy
    pub async fn optimize(&self) -> IndexResult<()> {
        self.commit().await
    }

    /// Current index statistics
    pub async fn stats(&self) -> IndexResult<IndexStats> {
        let searcher = self.reader.searcher();
        let total_documents = searcher.num_docs();
        let num_segments = searcher.segment_readers().len();

        let index_size_bytes = std::fs::read_dir(&self.config.index_path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        Ok(IndexStats {
            total_documents,
            index_size_bytes,
            num_segments,
            last_commit: *self.last_commit.lock(),
        })
    }

    /// Start building criteria across all categories
    pub fn create_criteria(&self) -> CriteriaBuilder {
        CriteriaBuilder::new()
    }

    /// Start building criteria scoped to one category
    pub fn create_criteria_for(&self, category: impl Into<String>) -> CriteriaBuilder {
        CriteriaBuilder::for_category(category)
    }

    /// Execute compiled criteria
    pub async fn find(&self, criteria: &SearchCriteria) -> IndexResult<SearchResults> {
        self.executor().execute(criteria, None)
    }

    /// Execute compiled criteria under a cancellation token
    pub async fn find_cancellable(
        &self,
        criteria: &SearchCriteria,
        token: &CancelToken,
    ) -> IndexResult<SearchResults> {
        self.executor().execute(criteria, Some(token))
    }

    fn executor(&self) -> QueryExecutor<'_> {
        QueryExecutor {
            index: &self.index,
            schema: &self.schema,
            reader: &self.reader,
            facet_map: &self.facet_map,
            config: &self.config,
        }
    }
}
