//! # evgraph-rs — Versioned Collision-Event Graph
//!
//! A clean Rust event record for simulated particle-physics collisions:
//! a mutable, versioned directed graph of interaction vertices and
//! particles, with filtered search and a line-oriented exchange format.
//!
//! ## Design Principles
//!
//! 1. **Arena-first**: the [`Event`] is the sole owner of every particle
//!    and vertex; everything else holds barcodes, never nodes
//! 2. **Clean DTOs**: `Particle`, `Vertex`, `FourVector` cross all boundaries
//! 3. **Versions are append-only**: one ledger entry per processing stage,
//!    and only the open entry ever mutates
//! 4. **Format-agnostic I/O**: `EventIo` is the contract between the event
//!    record and any concrete wire format
//!
//! ## Quick Start
//!
//! ```rust
//! use evgraph_rs::{Attribute, Event, FilterList, FourVector, ScanPolicy};
//!
//! let mut event = Event::new(1);
//! let v = event.add_vertex(FourVector::zero());
//! let photon = event.add_particle(22, FourVector::new(0.0, 0.0, 7.0, 7.0), 0.0, 1);
//! event.add_outgoing(v, photon)?;
//!
//! // Find every stable final-state particle.
//! let stable = FilterList::from(Attribute::Status.eq(1));
//! let found = evgraph_rs::search::find_in_event(&event, ScanPolicy::All, &stable);
//! assert_eq!(found.len(), 1);
//! # Ok::<(), evgraph_rs::Error>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod event;
pub mod search;
pub mod io;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    FourVector, Particle, ParticleId, Vertex, VertexId,
    Units, MomentumUnit, LengthUnit,
};

// ============================================================================
// Re-exports: Event graph
// ============================================================================

pub use event::{Event, Version};

// ============================================================================
// Re-exports: Search
// ============================================================================

pub use search::{
    Attribute, Filter, FilterList, Op,
    Relatives, ScanPolicy,
    find_in_event, find_relatives, narrow_down,
};

// ============================================================================
// Re-exports: I/O
// ============================================================================

pub use io::{EventIo, IoMode, TextIo};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Duplicate barcode: {0}")]
    DuplicateBarcode(i32),

    #[error("Barcode out of range: {0}")]
    BarcodeRange(i32),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
