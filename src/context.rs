use indexmap::{IndexMap, IndexSet};

use crate::{
    ast::SortDirection,
    filter,
    path::FieldPath,
    pipeline::{self, Stage},
    value::{Document, Value},
};

/// The accumulator one traversal writes into.
///
/// A context belongs to exactly one translation: the translator borrows it
/// mutably while visiting, and it is consumed or finalized afterwards.
#[derive(Debug, Clone, Default)]
pub struct TranslationContext {
    collection: Option<String>,
    filter: Document,
    filter_paths: IndexSet<FieldPath>,
    projection: IndexSet<FieldPath>,
    sort: IndexMap<FieldPath, SortDirection>,
    skip: Option<u64>,
    limit: Option<u64>,
    path_prefix: Option<FieldPath>,
    expanded: Vec<FieldPath>,
    stages: Vec<Stage>,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context for the nested options of an expanded association.
    pub(crate) fn nested(prefix: FieldPath) -> Self {
        TranslationContext {
            path_prefix: Some(prefix),
            ..Self::default()
        }
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    /// Every field path the filter reads, in first-seen order.
    pub fn filter_paths(&self) -> &IndexSet<FieldPath> {
        &self.filter_paths
    }

    pub fn projection(&self) -> &IndexSet<FieldPath> {
        &self.projection
    }

    pub fn sort(&self) -> &IndexMap<FieldPath, SortDirection> {
        &self.sort
    }

    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn path_prefix(&self) -> Option<&FieldPath> {
        self.path_prefix.as_ref()
    }

    /// Association paths expanded at this level, in `$expand` order.
    pub fn expanded(&self) -> &[FieldPath] {
        &self.expanded
    }

    /// Stages produced by `$expand`, in `$expand` order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Sets the collection unless one is already set. Returns whether it was
    /// set by this call.
    pub(crate) fn set_collection(&mut self, name: &str) -> bool {
        if self.collection.is_some() {
            return false;
        }
        self.collection = Some(name.to_string());
        true
    }

    /// ANDs a condition into the filter.
    pub(crate) fn and_filter(&mut self, condition: Document) {
        let current = std::mem::take(&mut self.filter);
        self.filter = filter::conjoin(current, condition);
    }

    pub(crate) fn add_filter_paths(&mut self, paths: impl IntoIterator<Item = FieldPath>) {
        self.filter_paths.extend(paths);
    }

    /// Adds a path to the projection. See [`insert_covering`].
    pub(crate) fn add_projection(&mut self, path: FieldPath) {
        insert_covering(&mut self.projection, path);
    }

    /// Sets the direction for a sort key. A repeated path keeps its original
    /// position and takes the new direction.
    pub(crate) fn set_sort(&mut self, path: FieldPath, direction: SortDirection) {
        self.sort.insert(path, direction);
    }

    pub(crate) fn set_skip(&mut self, skip: u64) {
        self.skip = Some(skip);
    }

    pub(crate) fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub(crate) fn mark_expanded(&mut self, path: FieldPath) {
        self.expanded.push(path);
    }

    pub(crate) fn push_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub(crate) fn into_stages(self) -> Vec<Stage> {
        self.stages
    }

    /// `{path: 1, ...}` for the selected paths.
    pub fn projection_document(&self) -> Document {
        self.projection
            .iter()
            .map(|path| (path.to_dotted(), Value::Integer(1)))
            .collect()
    }

    /// `{path: 1 | -1, ...}` in `$orderby` order.
    pub fn sort_document(&self) -> Document {
        self.sort
            .iter()
            .map(|(path, direction)| (path.to_dotted(), Value::Integer(direction.as_mongo())))
            .collect()
    }

    /// Linearizes the context into an aggregation pipeline.
    ///
    /// Borrows the context, so finalizing twice gives the same stages.
    pub fn pipeline(&self) -> Vec<Stage> {
        pipeline::finalize(self)
    }

    pub fn into_filter(self) -> Document {
        self.filter
    }

    /// The artifacts of a plain `find`. Expand-derived stages are dropped.
    pub fn into_query(self) -> MongoQuery {
        MongoQuery {
            projection: self.projection_document(),
            sort: self.sort_document(),
            collection: self.collection,
            query: self.filter,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Adds `path` to a set of projected paths.
///
/// A path already covered by a selected ancestor is dropped, and a new
/// ancestor replaces the descendants it covers; MongoDB rejects a projection
/// naming both `a` and `a.b`.
pub(crate) fn insert_covering(paths: &mut IndexSet<FieldPath>, path: FieldPath) {
    if paths.iter().any(|existing| covers(existing, &path)) {
        return;
    }
    paths.retain(|existing| !covers(&path, existing));
    paths.insert(path);
}

/// True when selecting `ancestor` already selects `path`.
fn covers(ancestor: &FieldPath, path: &FieldPath) -> bool {
    path.segments().starts_with(ancestor.segments())
}

/// The artifacts of a non-aggregation query.
///
/// ```text
/// db[collection].find(query).project(projection).sort(sort).skip(skip).limit(limit)
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MongoQuery {
    pub collection: Option<String>,
    pub query: Document,
    pub projection: Document,
    pub sort: Document,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl MongoQuery {
    /// All six artifacts as one document; unset ones are `null`.
    pub fn to_document(&self) -> Document {
        crate::doc! {
            "collection" => self.collection.clone(),
            "query" => self.query.clone(),
            "projection" => self.projection.clone(),
            "sort" => self.sort.clone(),
            "skip" => self.skip,
            "limit" => self.limit,
        }
    }
}
