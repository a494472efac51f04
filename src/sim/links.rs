use crate::error::{SimulationError, SimulationResult};
use crate::flights::Route;

use super::particle::ParticleStore;

/// A route bound to the two particle indices it connects.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub flights: f64,
    /// Spring stiffness, `1 / min(degree(source), degree(target))`.
    pub strength: f32,
    /// Share of the correction applied to the target, by relative degree.
    pub bias: f32,
}

/// Resolves routes into index pairs once, at construction.
///
/// Every endpoint must already be in the store; routes are never dropped here.
pub(crate) fn bind_links(routes: &[Route], store: &ParticleStore) -> SimulationResult<Vec<Link>> {
    let mut pairs = Vec::with_capacity(routes.len());
    for route in routes {
        let resolve = |id: &str| {
            store.index_of(id).ok_or_else(|| SimulationError::MissingNode {
                source_id: route.source.clone(),
                destination_id: route.destination.clone(),
                missing: id.to_owned(),
            })
        };
        let source = resolve(&route.source)?;
        let target = resolve(&route.destination)?;
        pairs.push((source, target, route.flights));
    }

    let mut degree = vec![0usize; store.len()];
    for &(source, target, _) in &pairs {
        degree[source] += 1;
        degree[target] += 1;
    }

    Ok(pairs
        .into_iter()
        .map(|(source, target, flights)| {
            let source_degree = degree[source] as f32;
            let target_degree = degree[target] as f32;
            Link {
                source,
                target,
                flights,
                strength: 1.0 / source_degree.min(target_degree),
                bias: source_degree / (source_degree + target_degree),
            }
        })
        .collect())
}
