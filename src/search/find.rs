//! Query engine: whole-event scans and directed relative walks.
//!
//! Every query yields a flat, ordered sequence of particle borrows; the
//! event must outlive the result, which the borrow checker enforces.

use std::collections::VecDeque;

use crate::event::Event;
use crate::model::{Particle, ParticleId, VertexId};

use super::FilterList;

/// Result policy for a whole-event scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Keep every passing particle.
    All,
    /// Stop at the first pass.
    First,
    /// Every pass restarts the result; at most the last passer survives.
    Last,
}

/// Direction of a relative walk from a seed particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relatives {
    /// Walk production vertices backward.
    Ancestors,
    /// Walk end vertices forward.
    Descendants,
}

/// Scan the whole event: ledger entries in chronological order, particle
/// barcodes ascending within each, testing each against the conjunction.
pub fn find_in_event<'e>(
    event: &'e Event,
    policy: ScanPolicy,
    filters: &FilterList,
) -> Vec<&'e Particle> {
    let mut results: Vec<&Particle> = Vec::new();

    for version in event.versions() {
        for &id in version.particles() {
            let Some(particle) = event.particle(id) else { continue };
            if !filters.passed_all(particle) {
                continue;
            }
            tracing::debug!(barcode = particle.id.0, "filter passed");
            if policy == ScanPolicy::Last && !results.is_empty() {
                results.clear();
            }
            results.push(particle);
            if policy == ScanPolicy::First {
                return results;
            }
        }
    }

    results
}

/// Walk ancestors or descendants of a seed particle.
///
/// An explicit FIFO work-list of vertex barcodes replaces call recursion:
/// each vertex's candidate particles are tested and appended before any
/// deeper vertex is processed. There is deliberately no visited-set — the
/// graph is acyclic by construction, and a vertex reached over several
/// paths contributes its neighbors once per reaching path.
pub fn find_relatives<'e>(
    event: &'e Event,
    seed: ParticleId,
    relatives: Relatives,
    filters: &FilterList,
) -> Vec<&'e Particle> {
    let mut results: Vec<&Particle> = Vec::new();
    let Some(seed) = event.particle(seed) else {
        tracing::warn!(barcode = seed.0, "relative walk from unknown particle");
        return results;
    };

    let mut work: VecDeque<VertexId> = VecDeque::new();
    if let Some(start) = walk_vertex(seed, relatives) {
        work.push_back(start);
    }

    while let Some(vertex_id) = work.pop_front() {
        let Some(vertex) = event.vertex(vertex_id) else { continue };
        let candidates = match relatives {
            Relatives::Ancestors => &vertex.particles_in,
            Relatives::Descendants => &vertex.particles_out,
        };
        for &id in candidates {
            let Some(particle) = event.particle(id) else { continue };
            if filters.passed_all(particle) {
                tracing::debug!(barcode = particle.id.0, "filter passed");
                results.push(particle);
            }
            if let Some(next) = walk_vertex(particle, relatives) {
                work.push_back(next);
            }
        }
    }

    results
}

/// The vertex a walk continues through from this particle, if any.
fn walk_vertex(particle: &Particle, relatives: Relatives) -> Option<VertexId> {
    match relatives {
        Relatives::Ancestors => particle.production_vertex,
        Relatives::Descendants => particle.end_vertex,
    }
}

/// Stable in-place compaction: keep exactly the sub-sequence of `results`
/// that satisfies the conjunction. Single pass, graph untouched,
/// idempotent under the same filter list.
pub fn narrow_down(results: &mut Vec<&Particle>, filters: &FilterList) {
    results.retain(|particle| filters.passed_all(particle));
}
