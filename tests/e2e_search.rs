//! End-to-end tests for filtered search: whole-event scan policies,
//! ancestor/descendant walks, and in-place result narrowing.

use pretty_assertions::assert_eq;

use evgraph_rs::{
    find_in_event, find_relatives, narrow_down,
    Attribute, Event, FilterList, FourVector, Particle, ParticleId, Relatives, ScanPolicy,
};

fn barcodes(results: &[&Particle]) -> Vec<i32> {
    results.iter().map(|p| p.id.0).collect()
}

// ============================================================================
// Helper: two-level decay chain.
//
//   p1, p2 --> V0 --> p3 --> V1 --> p4, p5
//
// Returns (event, seed) where seed is p4, a stable final-state particle.
// ============================================================================

fn decay_chain() -> (Event, ParticleId) {
    let mut event = Event::new(1);

    let p1 = event.add_particle(2212, FourVector::new(0.0, 0.0, 7000.0, 7000.0), 0.938, 3);
    let p2 = event.add_particle(2212, FourVector::new(0.0, 0.0, -7000.0, 7000.0), 0.938, 3);
    let v0 = event.add_vertex(FourVector::zero());
    event.add_incoming(v0, p1).unwrap();
    event.add_incoming(v0, p2).unwrap();

    let p3 = event.add_particle(23, FourVector::new(0.0, 0.0, 0.0, 91.0), 91.188, 2);
    event.add_outgoing(v0, p3).unwrap();

    let v1 = event.add_vertex(FourVector::new(0.1, 0.2, 0.3, 0.4));
    event.add_incoming(v1, p3).unwrap();

    let p4 = event.add_particle(11, FourVector::new(0.0, 30.0, 0.0, 45.0), 0.000511, 1);
    let p5 = event.add_particle(-11, FourVector::new(0.0, -30.0, 0.0, 46.0), 0.000511, 1);
    event.add_outgoing(v1, p4).unwrap();
    event.add_outgoing(v1, p5).unwrap();

    (event, p4)
}

// ============================================================================
// 1. Scan policies
// ============================================================================

#[test]
fn test_scan_all_keeps_every_pass_in_order() {
    let (event, _) = decay_chain();
    let stable = FilterList::from(Attribute::Status.eq(1));
    let results = find_in_event(&event, ScanPolicy::All, &stable);
    assert_eq!(barcodes(&results), vec![4, 5]);
}

#[test]
fn test_scan_first_stops_at_first_pass() {
    let (event, _) = decay_chain();
    let stable = FilterList::from(Attribute::Status.eq(1));
    let results = find_in_event(&event, ScanPolicy::First, &stable);
    assert_eq!(barcodes(&results), vec![4], "FIRST must return the earliest match only");
}

#[test]
fn test_scan_last_keeps_only_final_pass() {
    let (event, _) = decay_chain();
    let stable = FilterList::from(Attribute::Status.eq(1));
    let results = find_in_event(&event, ScanPolicy::Last, &stable);
    assert_eq!(barcodes(&results), vec![5], "LAST must return the latest match only");
}

#[test]
fn test_scan_with_no_match_is_empty() {
    let (event, _) = decay_chain();
    let none = FilterList::from(Attribute::Status.eq(99));
    assert!(find_in_event(&event, ScanPolicy::All, &none).is_empty());
    assert!(find_in_event(&event, ScanPolicy::First, &none).is_empty());
    assert!(find_in_event(&event, ScanPolicy::Last, &none).is_empty());
}

#[test]
fn test_empty_filter_list_matches_everything() {
    let (event, _) = decay_chain();
    let results = find_in_event(&event, ScanPolicy::All, &FilterList::new());
    assert_eq!(barcodes(&results), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_one_failing_filter_sinks_the_conjunction() {
    let (event, _) = decay_chain();
    // The failing filter sinks the list no matter where it sits.
    let front = FilterList::new()
        .and(Attribute::Status.eq(99))
        .and(Attribute::PdgId.neq(0));
    let back = FilterList::new()
        .and(Attribute::PdgId.neq(0))
        .and(Attribute::Status.eq(99));
    assert!(find_in_event(&event, ScanPolicy::All, &front).is_empty());
    assert!(find_in_event(&event, ScanPolicy::All, &back).is_empty());
}

// ============================================================================
// 2. Scan order across stages
// ============================================================================

#[test]
fn test_scan_walks_stages_chronologically() {
    let mut event = Event::new(1);
    event.insert_particle(5, 22, FourVector::zero(), 0.0, 1).unwrap();
    event.new_version("decay");
    event.insert_particle(2, 22, FourVector::zero(), 0.0, 1).unwrap();

    // Barcode 5 precedes barcode 2 because its stage comes first.
    let results = find_in_event(&event, ScanPolicy::All, &FilterList::new());
    assert_eq!(barcodes(&results), vec![5, 2]);
}

// ============================================================================
// 3. Relative walks
// ============================================================================

#[test]
fn test_ancestors_yields_near_level_before_deep_level() {
    let (event, seed) = decay_chain();
    let results = find_relatives(&event, seed, Relatives::Ancestors, &FilterList::new());
    // V1's incoming first, then V0's incoming.
    assert_eq!(barcodes(&results), vec![3, 1, 2]);
}

#[test]
fn test_ancestors_respects_filters() {
    let (event, seed) = decay_chain();
    let beams = FilterList::from(Attribute::PdgId.eq(2212));
    let results = find_relatives(&event, seed, Relatives::Ancestors, &beams);
    assert_eq!(barcodes(&results), vec![1, 2]);
}

#[test]
fn test_descendants_walk_forward() {
    let (event, _) = decay_chain();
    let results = find_relatives(&event, ParticleId(1), Relatives::Descendants, &FilterList::new());
    assert_eq!(barcodes(&results), vec![3, 4, 5]);
}

#[test]
fn test_descendants_of_final_state_particle_are_empty() {
    let (event, seed) = decay_chain();
    let results = find_relatives(&event, seed, Relatives::Descendants, &FilterList::new());
    assert!(results.is_empty(), "a particle with no end vertex has no descendants");
}

#[test]
fn test_walk_from_unknown_seed_is_empty() {
    let (event, _) = decay_chain();
    let results = find_relatives(&event, ParticleId(77), Relatives::Ancestors, &FilterList::new());
    assert!(results.is_empty());
}

#[test]
fn test_diamond_yields_shared_ancestor_once_per_path() {
    // px --> V0 --> pa, pb; both pa and pb terminate in V1; V1 --> seed.
    let mut event = Event::new(1);
    let px = event.add_particle(21, FourVector::zero(), 0.0, 3);
    let v0 = event.add_vertex(FourVector::zero());
    event.add_incoming(v0, px).unwrap();
    let pa = event.add_particle(1, FourVector::zero(), 0.0, 2);
    let pb = event.add_particle(2, FourVector::zero(), 0.0, 2);
    event.add_outgoing(v0, pa).unwrap();
    event.add_outgoing(v0, pb).unwrap();
    let v1 = event.add_vertex(FourVector::zero());
    event.add_incoming(v1, pa).unwrap();
    event.add_incoming(v1, pb).unwrap();
    let seed = event.add_particle(22, FourVector::zero(), 0.0, 1);
    event.add_outgoing(v1, seed).unwrap();

    let results = find_relatives(&event, seed, Relatives::Ancestors, &FilterList::new());
    // V0 is reached through pa and again through pb; no deduplication.
    assert_eq!(barcodes(&results), vec![pa.0, pb.0, px.0, px.0]);
}

// ============================================================================
// 4. narrow_down
// ============================================================================

#[test]
fn test_narrow_down_is_stable_and_idempotent() {
    let (event, _) = decay_chain();
    let mut results = find_in_event(&event, ScanPolicy::All, &FilterList::new());

    let unstable = FilterList::from(Attribute::Status.neq(1));
    narrow_down(&mut results, &unstable);
    assert_eq!(barcodes(&results), vec![1, 2, 3], "order of survivors must be preserved");

    narrow_down(&mut results, &unstable);
    assert_eq!(barcodes(&results), vec![1, 2, 3], "a second pass must change nothing");
}

#[test]
fn test_narrow_down_with_empty_list_keeps_all() {
    let (event, _) = decay_chain();
    let mut results = find_in_event(&event, ScanPolicy::All, &FilterList::new());
    let len = results.len();
    narrow_down(&mut results, &FilterList::new());
    assert_eq!(results.len(), len);
}

// ============================================================================
// 5. Stage-membership filters
// ============================================================================

#[test]
fn test_version_filters_select_by_stage() {
    let mut event = Event::new(1);
    let p1 = event.add_particle(22, FourVector::zero(), 0.0, 1);
    event.new_version("decay");
    let p2 = event.add_particle(11, FourVector::zero(), 0.0, 1);
    event.invalidate_particle(p1).unwrap();

    let born_late = FilterList::from(Attribute::VersionCreated.gte(1));
    let results = find_in_event(&event, ScanPolicy::All, &born_late);
    assert_eq!(barcodes(&results), vec![p2.0]);

    // Only invalidated particles carry a deletion stage at all. p1 was
    // recorded in both stages, so an ALL scan sights it once per ledger.
    let removed = FilterList::from(Attribute::VersionDeleted.eq(1));
    let results = find_in_event(&event, ScanPolicy::All, &removed);
    assert_eq!(barcodes(&results), vec![p1.0, p1.0]);

    let removed_last = find_in_event(&event, ScanPolicy::Last, &removed);
    assert_eq!(barcodes(&removed_last), vec![p1.0]);

    let never_removed = FilterList::from(Attribute::VersionDeleted.gte(0));
    let results = find_in_event(&event, ScanPolicy::All, &never_removed);
    assert_eq!(
        barcodes(&results),
        vec![p1.0, p1.0],
        "live particles fail every deletion-stage comparison"
    );
}
