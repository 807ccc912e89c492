//! Particle node in the event graph.

use serde::{Deserialize, Serialize};

use super::{FourVector, VertexId};

/// Particle barcode: a positive integer unique within one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub i32);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical particle instance.
///
/// Owned exclusively by the [`crate::Event`] arena; the vertex fields are
/// non-owning barcodes into the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    /// Particle-type code (generator convention, e.g. 22 = photon).
    pub pdg_id: i32,
    pub momentum: FourVector,
    pub generated_mass: f64,
    /// Generator-defined status code (e.g. 1 = stable final state).
    pub status: i32,
    /// Vertex this particle emerges from, if any.
    pub production_vertex: Option<VertexId>,
    /// Vertex this particle terminates in, if any.
    pub end_vertex: Option<VertexId>,
    /// Index of the processing stage that created this particle.
    pub version_created: usize,
    /// Index of the processing stage that invalidated it, if any.
    pub version_deleted: Option<usize>,
}

impl Particle {
    pub fn new(
        id: ParticleId,
        pdg_id: i32,
        momentum: FourVector,
        generated_mass: f64,
        status: i32,
        version_created: usize,
    ) -> Self {
        Self {
            id,
            pdg_id,
            momentum,
            generated_mass,
            status,
            production_vertex: None,
            end_vertex: None,
            version_created,
            version_deleted: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.version_deleted.is_some()
    }
}
