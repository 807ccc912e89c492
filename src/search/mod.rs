//! # Filtered Search
//!
//! Predicate filtering plus directed graph traversal over one event.
//!
//! A [`Filter`] compares one particle attribute against a literal; a
//! [`FilterList`] is their ordered conjunction. Queries come in two
//! shapes: a whole-event scan under a [`ScanPolicy`], and a directed
//! [`Relatives`] walk from a seed particle. Results can be re-filtered
//! in place with [`narrow_down`].

pub mod filter;
pub mod find;

pub use filter::{Attribute, Filter, FilterList, Op};
pub use find::{find_in_event, find_relatives, narrow_down, Relatives, ScanPolicy};
