//! Aggregation pipeline stages, `$expand` lowering and finalization.

use std::fmt;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::{
    ast::{ExpandItem, Node},
    context::{insert_covering, TranslationContext},
    output::JsonPrinter,
    path,
    translator::{TranslateError, Translator},
    value::{Document, Value},
};

/// One stage of a MongoDB aggregation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// `{"$match": filter}`
    Match(Document),
    /// `{"$lookup": {...}}`
    Lookup(Lookup),
    /// `{"$unwind": {...}}`
    Unwind(Unwind),
    /// `{"$project": projection}`
    Project(Document),
    /// `{"$sort": keys}`
    Sort(Document),
    /// `{"$skip": n}`
    Skip(u64),
    /// `{"$limit": n}`
    Limit(u64),
}

/// A `$lookup` join of an association.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
    /// Stages run on the joined documents, before they are embedded
    pub pipeline: Vec<Stage>,
}

/// An `$unwind` of a joined association.
#[derive(Debug, Clone, PartialEq)]
pub struct Unwind {
    /// `$`-prefixed field reference
    pub path: String,
    pub preserve_null_and_empty_arrays: bool,
}

impl Stage {
    /// The stage operator, `$match`, `$lookup`, ...
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "$match",
            Stage::Lookup(_) => "$lookup",
            Stage::Unwind(_) => "$unwind",
            Stage::Project(_) => "$project",
            Stage::Sort(_) => "$sort",
            Stage::Skip(_) => "$skip",
            Stage::Limit(_) => "$limit",
        }
    }

    /// The stage as the single-key document MongoDB expects.
    pub fn to_document(&self) -> Document {
        let body = match self {
            Stage::Match(filter) => Value::from(filter.clone()),
            Stage::Lookup(lookup) => {
                let mut join = crate::doc! {
                    "from" => lookup.from.as_str(),
                    "localField" => lookup.local_field.as_str(),
                    "foreignField" => lookup.foreign_field.as_str(),
                    "as" => lookup.as_field.as_str(),
                };
                if !lookup.pipeline.is_empty() {
                    join.insert("pipeline".to_string(), to_value(&lookup.pipeline));
                }
                Value::from(join)
            }
            Stage::Unwind(unwind) => Value::from(crate::doc! {
                "path" => unwind.path.as_str(),
                "preserveNullAndEmptyArrays" => unwind.preserve_null_and_empty_arrays,
            }),
            Stage::Project(projection) => Value::from(projection.clone()),
            Stage::Sort(keys) => Value::from(keys.clone()),
            Stage::Skip(n) | Stage::Limit(n) => Value::from(*n),
        };
        crate::doc! { self.name() => body }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&JsonPrinter::new(false).print_document(&self.to_document()))
    }
}

/// A pipeline as an array of stage documents.
pub fn to_value(stages: &[Stage]) -> Value {
    Value::Array(
        stages
            .iter()
            .map(|stage| Value::from(stage.to_document()))
            .collect(),
    )
}

/// Lowers one `$expand` item into `context`.
///
/// Appends the join (`$lookup`, then `$unwind` when enabled), then the nested
/// `$match`, `$sort`, `$skip` and `$limit`, then the stages of any deeper
/// `$expand`.
pub(crate) fn lower_expand_item(
    translator: &Translator,
    item: &ExpandItem,
    context: &mut TranslationContext,
) -> Result<(), TranslateError> {
    let association = path::resolve(&item.path, context.path_prefix())?;
    debug!(association = %association, "expanding association");

    let mut nested = TranslationContext::nested(association.clone());
    match item.options.as_deref() {
        None => {}
        Some(options @ Node::QueryOptions(_)) => translator.visit(Some(options), &mut nested)?,
        Some(other) => {
            return Err(TranslateError::UnsupportedNodeKind {
                kind: other.kind().to_string(),
                context: "$expand options".to_string(),
            });
        }
    }

    let options = translator.options();
    let local_field = association.to_dotted();
    let mut lookup = Lookup {
        from: association.last().to_string(),
        local_field: local_field.clone(),
        foreign_field: options.foreign_field.clone(),
        as_field: local_field,
        pipeline: Vec::new(),
    };

    // A nested $select narrows the joined documents themselves. The nested
    // $match and $sort run after the join and deeper lookups read their key
    // from it, so the fields they use are kept as well.
    if !nested.projection().is_empty() {
        let mut kept = IndexSet::new();
        for path in nested
            .projection()
            .iter()
            .chain(nested.filter_paths())
            .chain(nested.sort().keys())
            .chain(nested.expanded())
        {
            if let Some(relative) = path.strip_prefix(&association) {
                insert_covering(&mut kept, relative);
            }
        }
        if !kept.is_empty() {
            let projection = kept
                .iter()
                .map(|relative| (relative.to_dotted(), Value::Integer(1)))
                .collect();
            lookup.pipeline.push(Stage::Project(projection));
        }
    }

    let mut stages = vec![Stage::Lookup(lookup)];
    if options.unwind_expanded {
        stages.push(Stage::Unwind(Unwind {
            path: association.to_reference(),
            preserve_null_and_empty_arrays: true,
        }));
    }
    if !nested.filter().is_empty() {
        stages.push(Stage::Match(nested.filter().clone()));
    }
    if !nested.sort().is_empty() {
        stages.push(Stage::Sort(nested.sort_document()));
    }
    if let Some(skip) = nested.skip() {
        stages.push(Stage::Skip(skip));
    }
    if let Some(limit) = nested.limit() {
        stages.push(Stage::Limit(limit));
    }
    stages.extend(nested.into_stages());

    for stage in stages {
        trace!(stage = stage.name(), "appending expand stage");
        context.push_stage(stage);
    }
    context.mark_expanded(association);
    Ok(())
}

/// Linearizes a completed context into the full pipeline:
/// `$match`, expand-derived stages, `$project`, `$sort`, `$skip`, `$limit`.
/// Stages whose source is empty or unset are left out.
pub(crate) fn finalize(context: &TranslationContext) -> Vec<Stage> {
    let mut stages = Vec::new();

    if !context.filter().is_empty() {
        stages.push(Stage::Match(context.filter().clone()));
    }

    stages.extend(context.stages().iter().cloned());

    if !context.projection().is_empty() {
        let mut projection = context.projection_document();
        for association in context.expanded() {
            let overlaps = context.projection().iter().any(|selected| {
                selected.segments().starts_with(association.segments())
                    || association.segments().starts_with(selected.segments())
            });
            if !overlaps {
                projection.insert(association.to_dotted(), Value::Integer(1));
            }
        }
        stages.push(Stage::Project(projection));
    }

    if !context.sort().is_empty() {
        stages.push(Stage::Sort(context.sort_document()));
    }
    if let Some(skip) = context.skip() {
        stages.push(Stage::Skip(skip));
    }
    if let Some(limit) = context.limit() {
        stages.push(Stage::Limit(limit));
    }

    debug!(stages = stages.len(), "finalized pipeline");
    stages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_document_omits_empty_pipeline() {
        let stage = Stage::Lookup(Lookup {
            from: "Seller".to_string(),
            local_field: "ListAgent.Seller".to_string(),
            foreign_field: "_id".to_string(),
            as_field: "ListAgent.Seller".to_string(),
            pipeline: Vec::new(),
        });
        assert_eq!(
            stage.to_string(),
            r#"{"$lookup":{"from":"Seller","localField":"ListAgent.Seller","foreignField":"_id","as":"ListAgent.Seller"}}"#
        );
    }

    #[test]
    fn test_unwind_document() {
        let stage = Stage::Unwind(Unwind {
            path: "$ListAgent".to_string(),
            preserve_null_and_empty_arrays: true,
        });
        assert_eq!(
            stage.to_string(),
            r#"{"$unwind":{"path":"$ListAgent","preserveNullAndEmptyArrays":true}}"#
        );
    }

    #[test]
    fn test_paging_stages() {
        assert_eq!(Stage::Skip(10).to_string(), r#"{"$skip":10}"#);
        assert_eq!(Stage::Limit(5).to_string(), r#"{"$limit":5}"#);
        assert_eq!(
            to_value(&[Stage::Skip(1), Stage::Limit(2)]).to_string(),
            r#"[{"$skip":1},{"$limit":2}]"#
        );
    }
}
