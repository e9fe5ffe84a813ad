//! Map catalog ids to backend concepts.

use crate::backend::ConceptResolver;
use crate::error::ResolveError;
use crate::ids::shorten;
use crate::model::Catalog;

/// Outcome of resolving a whole catalog.
///
/// `resolved` is in catalog order; every catalog id lands in exactly one of
/// the two lists.
#[derive(Debug)]
pub struct Resolution<C> {
    pub resolved: Vec<(String, C)>,
    pub failures: Vec<(String, ResolveError)>,
}

impl<C> Resolution<C> {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn count_matching(&self, pred: impl Fn(&ResolveError) -> bool) -> usize {
        self.failures.iter().filter(|(_, e)| pred(e)).count()
    }
}

/// Resolve one original id.
pub fn resolve_id<R: ConceptResolver>(
    resolver: &R,
    id: &str,
) -> Result<R::Concept, ResolveError> {
    let short = shorten(id).ok_or_else(|| ResolveError::Unnormalizable(id.to_string()))?;
    let concept = resolver.resolve(&short)?;
    let resolved = resolver.concept_id(&concept);
    if resolved != short {
        return Err(ResolveError::Mismatch {
            requested: short,
            resolved,
        });
    }
    Ok(concept)
}

/// Resolve every id in `catalog`. Failures are collected, never raised.
pub fn resolve_catalog<R: ConceptResolver>(
    resolver: &R,
    catalog: &Catalog,
) -> Resolution<R::Concept> {
    let mut resolved = Vec::with_capacity(catalog.len());
    let mut failures = Vec::new();

    for id in catalog.keys() {
        match resolve_id(resolver, id) {
            Ok(concept) => resolved.push((id.clone(), concept)),
            Err(err) => {
                tracing::debug!(id = %id, error = %err, "concept resolution failed");
                failures.push((id.clone(), err));
            }
        }
    }

    tracing::info!(
        resolved = resolved.len(),
        failed = failures.len(),
        "resolved catalog concepts"
    );

    Resolution { resolved, failures }
}
