//! Attribute predicates over a single particle.

use serde::{Deserialize, Serialize};

use crate::model::Particle;

/// Which particle attribute a filter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    /// Generator status code.
    Status,
    /// Particle-type code.
    PdgId,
    /// Index of the stage that created the particle.
    VersionCreated,
    /// Index of the stage that invalidated it. A live particle has no
    /// value here and fails every comparison.
    VersionDeleted,
}

/// Comparison operator applied between the attribute and the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Op {
    fn compare(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Op::Eq => lhs == rhs,
            Op::Neq => lhs != rhs,
            Op::Lt => lhs < rhs,
            Op::Lte => lhs <= rhs,
            Op::Gt => lhs > rhs,
            Op::Gte => lhs >= rhs,
        }
    }
}

impl Attribute {
    fn extract(self, particle: &Particle) -> Option<i64> {
        match self {
            Attribute::Status => Some(particle.status as i64),
            Attribute::PdgId => Some(particle.pdg_id as i64),
            Attribute::VersionCreated => Some(particle.version_created as i64),
            Attribute::VersionDeleted => particle.version_deleted.map(|v| v as i64),
        }
    }

    pub fn eq(self, value: i64) -> Filter { Filter::new(self, Op::Eq, value) }
    pub fn neq(self, value: i64) -> Filter { Filter::new(self, Op::Neq, value) }
    pub fn lt(self, value: i64) -> Filter { Filter::new(self, Op::Lt, value) }
    pub fn lte(self, value: i64) -> Filter { Filter::new(self, Op::Lte, value) }
    pub fn gt(self, value: i64) -> Filter { Filter::new(self, Op::Gt, value) }
    pub fn gte(self, value: i64) -> Filter { Filter::new(self, Op::Gte, value) }
}

/// One predicate: attribute ⟨op⟩ literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub attribute: Attribute,
    pub op: Op,
    pub value: i64,
}

impl Filter {
    pub fn new(attribute: Attribute, op: Op, value: i64) -> Self {
        Self { attribute, op, value }
    }

    /// Does the particle satisfy this predicate?
    pub fn passed(&self, particle: &Particle) -> bool {
        match self.attribute.extract(particle) {
            Some(actual) => self.op.compare(actual, self.value),
            None => false,
        }
    }
}

/// An ordered conjunction of filters, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterList {
    filters: Vec<Filter>,
}

impl FilterList {
    /// The empty conjunction; passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one more filter to the conjunction.
    pub fn and(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// True when every filter passes, in order, short-circuiting on the
    /// first failure. The empty list always passes.
    pub fn passed_all(&self, particle: &Particle) -> bool {
        self.filters.iter().all(|f| f.passed(particle))
    }
}

impl From<Filter> for FilterList {
    fn from(filter: Filter) -> Self {
        Self { filters: vec![filter] }
    }
}

impl From<Vec<Filter>> for FilterList {
    fn from(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

impl FromIterator<Filter> for FilterList {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self { filters: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FourVector, ParticleId};

    fn particle(status: i32, pdg_id: i32) -> Particle {
        Particle::new(ParticleId(1), pdg_id, FourVector::zero(), 0.0, status, 0)
    }

    #[test]
    fn test_operators() {
        let p = particle(2, 22);
        assert!(Attribute::Status.eq(2).passed(&p));
        assert!(Attribute::Status.neq(1).passed(&p));
        assert!(Attribute::Status.lt(3).passed(&p));
        assert!(Attribute::Status.lte(2).passed(&p));
        assert!(Attribute::Status.gt(1).passed(&p));
        assert!(Attribute::Status.gte(2).passed(&p));
        assert!(!Attribute::Status.gt(2).passed(&p));
    }

    #[test]
    fn test_empty_list_passes() {
        assert!(FilterList::new().passed_all(&particle(1, 22)));
    }

    #[test]
    fn test_conjunction_short_circuits_on_failure() {
        let list = FilterList::new()
            .and(Attribute::Status.eq(1))
            .and(Attribute::PdgId.eq(22));
        assert!(list.passed_all(&particle(1, 22)));
        assert!(!list.passed_all(&particle(2, 22)));
        assert!(!list.passed_all(&particle(1, 11)));
    }

    #[test]
    fn test_version_deleted_absent_fails_all_ops() {
        let live = particle(1, 22);
        assert!(!Attribute::VersionDeleted.eq(0).passed(&live));
        assert!(!Attribute::VersionDeleted.neq(0).passed(&live));
        assert!(!Attribute::VersionDeleted.gte(0).passed(&live));

        let mut dead = particle(1, 22);
        dead.version_deleted = Some(2);
        assert!(Attribute::VersionDeleted.eq(2).passed(&dead));
        assert!(Attribute::VersionDeleted.gt(1).passed(&dead));
    }
}
