//! Engine schema and ValueSet to document conversion

use crate::config::IndexConfig;
use crate::error::{IndexError, IndexResult};
use crate::facet::FacetKey;
use crate::value_set::ValueSet;
use std::collections::HashMap;
use tantivy::schema::*;
use tantivy::TantivyDocument;

/// Stored item id, used for deterministic ordering and id lookups
pub const ITEM_ID_FIELD: &str = "__item_id";

/// Raw category term, used for category filters and scoped rebuilds
pub const CATEGORY_FIELD: &str = "__category";

/// Unique `category:id` term, the delete target for updates and deletes
pub const DOC_KEY_FIELD: &str = "__doc_key";

/// Searchable facet terms attached at index time
pub const FACET_FIELD: &str = "__facet";

/// Stored JSON payload of the document's facet keys
pub const FACET_KEYS_FIELD: &str = "__facets";

/// Build the engine schema: one text field per configured item field plus
/// the reserved control fields.
pub fn build_schema(config: &IndexConfig) -> Schema {
    let mut schema_builder = Schema::builder();

    for field in &config.fields {
        schema_builder.add_text_field(field, TEXT | STORED);
    }

    schema_builder.add_i64_field(ITEM_ID_FIELD, INDEXED | STORED);
    schema_builder.add_text_field(CATEGORY_FIELD, STRING | STORED);
    schema_builder.add_text_field(DOC_KEY_FIELD, STRING);
    schema_builder.add_facet_field(FACET_FIELD, INDEXED);
    schema_builder.add_text_field(FACET_KEYS_FIELD, STORED);

    schema_builder.build()
}

/// The unique delete-term value for an item within its category
pub fn doc_key(category: &str, id: i64) -> String {
    format!("{}:{}", category, id)
}

/// Convert a ValueSet and its extracted facet keys into an engine document
pub fn to_document(
    item: &ValueSet,
    facet_keys: &[FacetKey],
    schema: &Schema,
) -> IndexResult<TantivyDocument> {
    let mut doc = TantivyDocument::new();

    for (field_name, values) in &item.values {
        if let Ok(field) = schema.get_field(field_name) {
            for value in values {
                doc.add_text(field, value);
            }
        }
    }

    if let Ok(field) = schema.get_field(ITEM_ID_FIELD) {
        doc.add_i64(field, item.id);
    }
    if let Ok(field) = schema.get_field(CATEGORY_FIELD) {
        doc.add_text(field, &item.category);
    }
    if let Ok(field) = schema.get_field(DOC_KEY_FIELD) {
        doc.add_text(field, &doc_key(&item.category, item.id));
    }

    if let Ok(field) = schema.get_field(FACET_FIELD) {
        for key in facet_keys {
            doc.add_facet(
                field,
                Facet::from(&format!("/{}/{}", key.field_name, key.value)),
            );
        }
    }
    if let Ok(field) = schema.get_field(FACET_KEYS_FIELD) {
        let payload = serde_json::to_string(facet_keys)
            .map_err(|e| IndexError::IndexingFailed(format!("facet payload: {}", e)))?;
        doc.add_text(field, &payload);
    }

    Ok(doc)
}

/// Stored item id of a retrieved document
pub fn stored_item_id(doc: &TantivyDocument, schema: &Schema) -> Option<i64> {
    schema
        .get_field(ITEM_ID_FIELD)
        .ok()
        .and_then(|field| doc.get_first(field))
        .and_then(|v| v.as_i64())
}

/// Stored category of a retrieved document
pub fn stored_category(doc: &TantivyDocument, schema: &Schema) -> Option<String> {
    schema
        .get_field(CATEGORY_FIELD)
        .ok()
        .and_then(|field| doc.get_first(field))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Facet keys attached to a retrieved document.
///
/// Returns `None` when the payload is missing or unreadable; the document
/// then contributes zero facets rather than failing the query.
pub fn stored_facet_keys(doc: &TantivyDocument, schema: &Schema) -> Option<Vec<FacetKey>> {
    let payload = schema
        .get_field(FACET_KEYS_FIELD)
        .ok()
        .and_then(|field| doc.get_first(field))
        .and_then(|v| v.as_str())?;
    serde_json::from_str(payload).ok()
}

/// First stored value of each configured field present on the document
pub fn stored_fields(
    doc: &TantivyDocument,
    schema: &Schema,
    field_names: &[String],
) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for name in field_names {
        if let Ok(field) = schema.get_field(name) {
            if let Some(value) = doc.get_first(field).and_then(|v| v.as_str()) {
                fields.insert(name.clone(), value.to_string());
            }
        }
    }
    fields
}
