//! In-memory event graph.
//!
//! The `Event` is the arena that owns every particle and vertex ever
//! created for one collision. Nodes are stored in creation order and never
//! relocated or destroyed; all cross-references (vertex endpoints, ledger
//! entries, query results) are barcodes or borrows into the arena, so a
//! dangling reference is structurally impossible.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: one `Event` is exclusively owned by its
//!   mutator. Parallelism must operate on distinct events.
//! - **No node removal**: invalidating a particle stamps its deletion
//!   stage; the node itself stays owned for the life of the event.

pub mod version;

use hashbrown::HashMap;

use crate::model::{FourVector, Particle, ParticleId, Units, Vertex, VertexId};
use crate::{Error, Result};

pub use version::Version;

/// One simulated collision: the node arena plus its version ledger.
#[derive(Debug, Clone)]
pub struct Event {
    event_number: i32,
    units: Units,
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
    /// barcode → slot in `particles` / `vertices`
    particle_slots: HashMap<ParticleId, usize>,
    vertex_slots: HashMap<VertexId, usize>,
    versions: Vec<Version>,
    next_particle: i32,
    next_vertex: i32,
}

impl Event {
    /// Create an empty event with default units and an open first stage.
    pub fn new(event_number: i32) -> Self {
        Self {
            event_number,
            units: Units::default(),
            particles: Vec::new(),
            vertices: Vec::new(),
            particle_slots: HashMap::new(),
            vertex_slots: HashMap::new(),
            versions: vec![Version::new("Version")],
            next_particle: 1,
            next_vertex: -1,
        }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    // ========================================================================
    // Node creation
    // ========================================================================

    /// Create a particle with the next ascending barcode and record it in
    /// the open stage.
    pub fn add_particle(
        &mut self,
        pdg_id: i32,
        momentum: FourVector,
        generated_mass: f64,
        status: i32,
    ) -> ParticleId {
        let id = ParticleId(self.next_particle);
        self.next_particle += 1;
        self.store_particle(Particle::new(
            id,
            pdg_id,
            momentum,
            generated_mass,
            status,
            self.open_stage(),
        ));
        id
    }

    /// Create a vertex with the next descending barcode and record it in
    /// the open stage.
    pub fn add_vertex(&mut self, position: FourVector) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex -= 1;
        self.store_vertex(Vertex::new(id, position));
        id
    }

    /// Create a particle under an explicit barcode (deserialization path).
    /// The barcode must be positive and unused.
    pub fn insert_particle(
        &mut self,
        barcode: i32,
        pdg_id: i32,
        momentum: FourVector,
        generated_mass: f64,
        status: i32,
    ) -> Result<ParticleId> {
        if barcode <= 0 {
            return Err(Error::BarcodeRange(barcode));
        }
        let id = ParticleId(barcode);
        if self.particle_slots.contains_key(&id) {
            return Err(Error::DuplicateBarcode(barcode));
        }
        self.next_particle = self.next_particle.max(barcode + 1);
        self.store_particle(Particle::new(
            id,
            pdg_id,
            momentum,
            generated_mass,
            status,
            self.open_stage(),
        ));
        Ok(id)
    }

    /// Create a vertex under an explicit barcode (deserialization path).
    /// The barcode must be negative and unused.
    pub fn insert_vertex(&mut self, barcode: i32, position: FourVector) -> Result<VertexId> {
        if barcode >= 0 {
            return Err(Error::BarcodeRange(barcode));
        }
        let id = VertexId(barcode);
        if self.vertex_slots.contains_key(&id) {
            return Err(Error::DuplicateBarcode(barcode));
        }
        self.next_vertex = self.next_vertex.min(barcode - 1);
        self.store_vertex(Vertex::new(id, position));
        Ok(id)
    }

    fn store_particle(&mut self, particle: Particle) {
        let id = particle.id;
        self.particle_slots.insert(id, self.particles.len());
        self.particles.push(particle);
        self.open_version_mut().record_particle(id);
    }

    fn store_vertex(&mut self, vertex: Vertex) {
        let id = vertex.id;
        self.vertex_slots.insert(id, self.vertices.len());
        self.vertices.push(vertex);
        self.open_version_mut().record_vertex(id);
    }

    // ========================================================================
    // Linking
    // ========================================================================

    /// Attach `particle` as an incoming particle of `vertex`: the particle
    /// terminates there. Both ids are recorded in the open stage.
    pub fn add_incoming(&mut self, vertex: VertexId, particle: ParticleId) -> Result<()> {
        let vslot = self.vertex_slot(vertex)?;
        let pslot = self.particle_slot(particle)?;
        self.vertices[vslot].particles_in.push(particle);
        self.particles[pslot].end_vertex = Some(vertex);
        let open = self.open_version_mut();
        open.record_particle(particle);
        open.record_vertex(vertex);
        Ok(())
    }

    /// Attach `particle` as an outgoing particle of `vertex`: the particle
    /// is produced there. Both ids are recorded in the open stage.
    pub fn add_outgoing(&mut self, vertex: VertexId, particle: ParticleId) -> Result<()> {
        let vslot = self.vertex_slot(vertex)?;
        let pslot = self.particle_slot(particle)?;
        self.vertices[vslot].particles_out.push(particle);
        self.particles[pslot].production_vertex = Some(vertex);
        let open = self.open_version_mut();
        open.record_particle(particle);
        open.record_vertex(vertex);
        Ok(())
    }

    /// Stamp a particle as invalidated by the open stage. The node stays
    /// owned by the event; only its deletion stage changes.
    pub fn invalidate_particle(&mut self, particle: ParticleId) -> Result<()> {
        let stage = self.open_stage();
        let pslot = self.particle_slot(particle)?;
        self.particles[pslot].version_deleted = Some(stage);
        self.open_version_mut().record_particle(particle);
        Ok(())
    }

    // ========================================================================
    // Version ledger
    // ========================================================================

    /// Close the open stage and begin a new one. Returns its index.
    pub fn new_version(&mut self, name: impl Into<String>) -> usize {
        self.versions.push(Version::new(name));
        self.versions.len() - 1
    }

    /// Record a particle barcode in the open stage. Duplicates are silent
    /// no-ops; unknown barcodes are ignored with a diagnostic.
    pub fn record_particle(&mut self, particle: ParticleId) {
        if !self.particle_slots.contains_key(&particle) {
            tracing::warn!(barcode = particle.0, "record of unknown particle ignored");
            return;
        }
        self.open_version_mut().record_particle(particle);
    }

    /// Record a vertex barcode in the open stage. Duplicates are silent
    /// no-ops; unknown barcodes are ignored with a diagnostic.
    pub fn record_vertex(&mut self, vertex: VertexId) {
        if !self.vertex_slots.contains_key(&vertex) {
            tracing::warn!(barcode = vertex.0, "record of unknown vertex ignored");
            return;
        }
        self.open_version_mut().record_vertex(vertex);
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn version(&self, index: usize) -> Option<&Version> {
        self.versions.get(index)
    }

    /// Index of the currently open stage.
    pub fn open_stage(&self) -> usize {
        self.versions.len() - 1
    }

    fn open_version_mut(&mut self) -> &mut Version {
        // versions is never empty: new() seeds stage 0.
        self.versions.last_mut().expect("event always has an open version")
    }

    pub(crate) fn set_version_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(version) = self.versions.get_mut(index) {
            version.set_name(name);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn event_number(&self) -> i32 {
        self.event_number
    }

    pub fn set_event_number(&mut self, event_number: i32) {
        self.event_number = event_number;
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particle_slots.get(&id).map(|&slot| &self.particles[slot])
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertex_slots.get(&id).map(|&slot| &self.vertices[slot])
    }

    /// All particles in creation order.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// All vertices in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn particles_count(&self) -> usize {
        self.particles.len()
    }

    pub fn vertices_count(&self) -> usize {
        self.vertices.len()
    }

    fn particle_slot(&self, id: ParticleId) -> Result<usize> {
        self.particle_slots
            .get(&id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("Particle {id}")))
    }

    fn vertex_slot(&self, id: VertexId) -> Result<usize> {
        self.vertex_slots
            .get(&id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("Vertex {id}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
