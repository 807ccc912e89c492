//! Vertex (interaction point) in the event graph.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{FourVector, ParticleId};

/// Vertex barcode: a negative integer unique within one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub i32);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An interaction point connecting incoming and outgoing particles.
///
/// The particle lists keep insertion order; decay chains rarely fan out
/// wider than a handful of particles, hence the inline small-vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    /// Spacetime position. All-zero means "unset".
    pub position: FourVector,
    /// Particles that terminate in this vertex, in attachment order.
    pub particles_in: SmallVec<[ParticleId; 4]>,
    /// Particles produced by this vertex, in attachment order.
    pub particles_out: SmallVec<[ParticleId; 4]>,
}

impl Vertex {
    pub fn new(id: VertexId, position: FourVector) -> Self {
        Self {
            id,
            position,
            particles_in: SmallVec::new(),
            particles_out: SmallVec::new(),
        }
    }

    /// True when the vertex carries a real (non-zero) position.
    pub fn has_position(&self) -> bool {
        !self.position.is_zero()
    }
}
