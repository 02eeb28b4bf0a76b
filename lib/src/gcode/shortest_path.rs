//! Shortest-path selection for extrusion entities.
//!
//! # Overview
//!
//! Greedy nearest-neighbor ordering of the entities inside one island or
//! collection: repeatedly pick the candidate whose entry point is closest to
//! the travel cursor, then move the cursor to that candidate's exit point.
//! Closed loops use their whole vertex set as seam candidates; open paths
//! may be entered from either end (`reversed`). This is a heuristic, not
//! exact TSP - loop counts per island are small enough that greedy selection
//! stays near-linear and close to optimal.
//!
//! Greedy can lose to the stored order on adversarial clusters (a near
//! candidate pointing away from the rest), so every selector also walks the
//! candidates in upstream order under the same entry policy and keeps
//! whichever sequence travels less. The chosen order never travels farther
//! than the upstream order.
//!
//! Ties in distance are broken by original candidate order, then by
//! lexicographic point comparison (x, then y), so identical input always
//! produces identical output.
//!
//! # Reference
//!
//! - `src/libslic3r/ShortestPath.hpp` - chain_extrusion_references

use crate::extrusion::{ExtrusionEntity, ExtrusionEntityReference};
use crate::geometry::Point;

/// One selected closed loop (or path) with its seam and travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedLoop {
    /// Index into the candidate list.
    pub index: usize,

    /// Chosen seam vertex for closed loops; 0 for open paths.
    pub seam_index: usize,

    /// Whether to traverse opposite to the stored orientation.
    pub reversed: bool,
}

/// The visiting order produced by [`order_loops`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopOrder {
    /// Selected candidates in print order.
    pub loops: Vec<OrderedLoop>,
}

impl LoopOrder {
    /// Number of ordered candidates.
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Iterate the ordered candidates.
    pub fn iter(&self) -> std::slice::Iter<'_, OrderedLoop> {
        self.loops.iter()
    }
}

impl<'a> IntoIterator for &'a LoopOrder {
    type Item = &'a OrderedLoop;
    type IntoIter = std::slice::Iter<'a, OrderedLoop>;

    fn into_iter(self) -> Self::IntoIter {
        self.loops.iter()
    }
}

/// One selected open path with its travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedPath {
    /// Index into the candidate list.
    pub index: usize,

    /// Whether to enter at the stored end point instead of the start.
    pub reversed: bool,
}

/// Lexicographic point comparison used for deterministic tie-breaking.
fn point_less_than(a: Point, b: Point) -> bool {
    a.x < b.x || (a.x == b.x && a.y < b.y)
}

/// The cursor seeding selection: the given start, else the first non-empty
/// candidate's first point.
fn seed_cursor(entities: &[ExtrusionEntity], start: Option<Point>) -> Option<Point> {
    start.or_else(|| entities.iter().find_map(|e| e.first_point()))
}

/// Order the loops of one island for minimal travel.
///
/// Closed loops are entered at the vertex nearest the cursor (the seam);
/// open candidates may be entered from either end. Empty entities are
/// skipped. Zero candidates yield an empty order.
pub fn order_loops(entities: &[ExtrusionEntity], start: Option<Point>) -> LoopOrder {
    let Some(cursor) = seed_cursor(entities, start) else {
        return LoopOrder::default();
    };
    let candidates: Vec<usize> = (0..entities.len())
        .filter(|&i| !entities[i].is_empty())
        .collect();

    let (greedy, greedy_travel) = greedy_loop_order(entities, &candidates, cursor);
    let (stored, stored_travel) = walk_loops_in_order(entities, &candidates, cursor);
    if stored_travel < greedy_travel {
        LoopOrder { loops: stored }
    } else {
        greedy
    }
}

fn greedy_loop_order(
    entities: &[ExtrusionEntity],
    candidates: &[usize],
    mut cursor: Point,
) -> (LoopOrder, f64) {
    let mut order = LoopOrder::default();
    let mut travel = 0.0;
    let mut remaining: Vec<usize> = candidates.to_vec();

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_distance = i128::MAX;
        let mut best_index = usize::MAX;
        let mut best_entry = Point::new(i64::MAX, i64::MAX);
        let mut best_seam = 0;
        let mut best_reversed = false;

        for (slot, &index) in remaining.iter().enumerate() {
            match &entities[index] {
                ExtrusionEntity::Loop(l) => {
                    let Some(seam) = l.polygon.nearest_point_index(&cursor) else {
                        continue;
                    };
                    let entry = l.polygon[seam];
                    let distance = cursor.distance_squared(&entry);
                    if is_better(
                        distance, index, entry, best_distance, best_index, best_entry,
                    ) {
                        best_slot = slot;
                        best_distance = distance;
                        best_index = index;
                        best_entry = entry;
                        best_seam = seam;
                        best_reversed = false;
                    }
                }
                entity => {
                    // Open paths and collections: consider both traversal ends.
                    if let Some(entry) = entity.first_point() {
                        let distance = cursor.distance_squared(&entry);
                        if is_better(
                            distance, index, entry, best_distance, best_index, best_entry,
                        ) {
                            best_slot = slot;
                            best_distance = distance;
                            best_index = index;
                            best_entry = entry;
                            best_seam = 0;
                            best_reversed = false;
                        }
                    }
                    if let Some(entry) = entity.last_point() {
                        let distance = cursor.distance_squared(&entry);
                        if is_better(
                            distance, index, entry, best_distance, best_index, best_entry,
                        ) {
                            best_slot = slot;
                            best_distance = distance;
                            best_index = index;
                            best_entry = entry;
                            best_seam = 0;
                            best_reversed = true;
                        }
                    }
                }
            }
        }

        if best_index == usize::MAX {
            break;
        }
        remaining.remove(best_slot);
        travel += cursor.distance(&best_entry);

        // A closed walk exits at its seam; an open path exits at the far end.
        cursor = match &entities[best_index] {
            ExtrusionEntity::Loop(_) => best_entry,
            entity => {
                let exit = if best_reversed {
                    entity.first_point()
                } else {
                    entity.last_point()
                };
                exit.unwrap_or(best_entry)
            }
        };

        order.loops.push(OrderedLoop {
            index: best_index,
            seam_index: best_seam,
            reversed: best_reversed,
        });
    }

    (order, travel)
}

/// Walk the candidates in upstream order under the greedy entry policy:
/// loops enter at the vertex nearest the cursor, open candidates at their
/// nearer end.
fn walk_loops_in_order(
    entities: &[ExtrusionEntity],
    candidates: &[usize],
    mut cursor: Point,
) -> (Vec<OrderedLoop>, f64) {
    let mut order = Vec::with_capacity(candidates.len());
    let mut travel = 0.0;
    for &index in candidates {
        match &entities[index] {
            ExtrusionEntity::Loop(l) => {
                let Some(seam) = l.polygon.nearest_point_index(&cursor) else {
                    continue;
                };
                let entry = l.polygon[seam];
                travel += cursor.distance(&entry);
                cursor = entry;
                order.push(OrderedLoop {
                    index,
                    seam_index: seam,
                    reversed: false,
                });
            }
            entity => {
                let (Some(first), Some(last)) = (entity.first_point(), entity.last_point())
                else {
                    continue;
                };
                let reversed = cursor.distance_squared(&last) < cursor.distance_squared(&first);
                let (entry, exit) = if reversed { (last, first) } else { (first, last) };
                travel += cursor.distance(&entry);
                cursor = exit;
                order.push(OrderedLoop {
                    index,
                    seam_index: 0,
                    reversed,
                });
            }
        }
    }
    (order, travel)
}

/// Chain open paths (infill and similar) for minimal travel.
///
/// Every candidate may be entered from either end; closed loops mixed into
/// the list enter at their stored start. No seam optimization is applied.
/// Zero candidates yield an empty chain.
pub fn chain_open_paths(entities: &[ExtrusionEntity], start: Option<Point>) -> Vec<ChainedPath> {
    let Some(cursor) = seed_cursor(entities, start) else {
        return Vec::new();
    };
    let candidates: Vec<usize> = (0..entities.len())
        .filter(|&i| !entities[i].is_empty())
        .collect();

    let (greedy, greedy_travel) = greedy_chain(entities, &candidates, cursor);
    let (stored, stored_travel) = walk_paths_in_order(entities, &candidates, cursor);
    if stored_travel < greedy_travel {
        stored
    } else {
        greedy
    }
}

fn greedy_chain(
    entities: &[ExtrusionEntity],
    candidates: &[usize],
    mut cursor: Point,
) -> (Vec<ChainedPath>, f64) {
    let mut chain = Vec::new();
    let mut travel = 0.0;
    let mut remaining: Vec<usize> = candidates.to_vec();

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_distance = i128::MAX;
        let mut best_index = usize::MAX;
        let mut best_entry = Point::new(i64::MAX, i64::MAX);
        let mut best_reversed = false;

        for (slot, &index) in remaining.iter().enumerate() {
            let entity = &entities[index];
            if let Some(entry) = entity.first_point() {
                let distance = cursor.distance_squared(&entry);
                if is_better(
                    distance, index, entry, best_distance, best_index, best_entry,
                ) {
                    best_slot = slot;
                    best_distance = distance;
                    best_index = index;
                    best_entry = entry;
                    best_reversed = false;
                }
            }
            if let Some(entry) = entity.last_point() {
                let distance = cursor.distance_squared(&entry);
                if is_better(
                    distance, index, entry, best_distance, best_index, best_entry,
                ) {
                    best_slot = slot;
                    best_distance = distance;
                    best_index = index;
                    best_entry = entry;
                    best_reversed = true;
                }
            }
        }

        if best_index == usize::MAX {
            break;
        }
        remaining.remove(best_slot);
        travel += cursor.distance(&best_entry);

        let exit = if best_reversed {
            entities[best_index].first_point()
        } else {
            entities[best_index].last_point()
        };
        cursor = exit.unwrap_or(best_entry);

        chain.push(ChainedPath {
            index: best_index,
            reversed: best_reversed,
        });
    }

    (chain, travel)
}

/// Walk the candidates in upstream order, entering each at its nearer end.
fn walk_paths_in_order(
    entities: &[ExtrusionEntity],
    candidates: &[usize],
    mut cursor: Point,
) -> (Vec<ChainedPath>, f64) {
    let mut chain = Vec::with_capacity(candidates.len());
    let mut travel = 0.0;
    for &index in candidates {
        let entity = &entities[index];
        let (Some(first), Some(last)) = (entity.first_point(), entity.last_point()) else {
            continue;
        };
        let reversed = cursor.distance_squared(&last) < cursor.distance_squared(&first);
        let (entry, exit) = if reversed { (last, first) } else { (first, last) };
        travel += cursor.distance(&entry);
        cursor = exit;
        chain.push(ChainedPath { index, reversed });
    }
    (chain, travel)
}

/// Chain pre-filtered entity references by nearest endpoint.
///
/// Like [`chain_open_paths`], but over a borrowed subset such as the support
/// entities selected for one extruder. Entering at the far end toggles the
/// reference's flipped flag. Empty references are dropped.
pub fn chain_entity_references<'a>(
    references: Vec<ExtrusionEntityReference<'a>>,
    start: Option<Point>,
) -> Vec<ExtrusionEntityReference<'a>> {
    let mut remaining: Vec<ExtrusionEntityReference<'a>> = references
        .into_iter()
        .filter(|reference| !reference.entity().is_empty())
        .collect();
    let seed = start.or_else(|| remaining.first().and_then(|r| r.first_point()));
    let Some(mut cursor) = seed else {
        return Vec::new();
    };

    let stored = walk_references_in_order(&remaining, cursor);

    let mut greedy_travel = 0.0;
    let mut chained = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let mut best_slot = usize::MAX;
        let mut best_distance = i128::MAX;
        let mut best_entry = Point::new(i64::MAX, i64::MAX);
        let mut best_toggle = false;

        for (slot, reference) in remaining.iter().enumerate() {
            if let Some(entry) = reference.first_point() {
                let distance = cursor.distance_squared(&entry);
                if is_better(distance, slot, entry, best_distance, best_slot, best_entry) {
                    best_slot = slot;
                    best_distance = distance;
                    best_entry = entry;
                    best_toggle = false;
                }
            }
            if let Some(entry) = reference.last_point() {
                let distance = cursor.distance_squared(&entry);
                if is_better(distance, slot, entry, best_distance, best_slot, best_entry) {
                    best_slot = slot;
                    best_distance = distance;
                    best_entry = entry;
                    best_toggle = true;
                }
            }
        }

        if best_slot == usize::MAX {
            break;
        }
        let reference = remaining.remove(best_slot);
        let chosen = if best_toggle {
            ExtrusionEntityReference::new(reference.entity(), !reference.flipped())
        } else {
            reference
        };
        greedy_travel += cursor.distance(&best_entry);
        cursor = chosen.last_point().unwrap_or(best_entry);
        chained.push(chosen);
    }

    let (stored_chain, stored_travel) = stored;
    if stored_travel < greedy_travel {
        stored_chain
    } else {
        chained
    }
}

/// Walk the references in their given order, entering each at its nearer
/// end (toggling the flip flag when the far end is entered).
fn walk_references_in_order<'a>(
    references: &[ExtrusionEntityReference<'a>],
    mut cursor: Point,
) -> (Vec<ExtrusionEntityReference<'a>>, f64) {
    let mut chained = Vec::with_capacity(references.len());
    let mut travel = 0.0;
    for reference in references {
        let (Some(first), Some(last)) = (reference.first_point(), reference.last_point()) else {
            continue;
        };
        let toggle = cursor.distance_squared(&last) < cursor.distance_squared(&first);
        let chosen = if toggle {
            ExtrusionEntityReference::new(reference.entity(), !reference.flipped())
        } else {
            *reference
        };
        let entry = if toggle { last } else { first };
        let exit = if toggle { first } else { last };
        travel += cursor.distance(&entry);
        cursor = exit;
        chained.push(chosen);
    }
    (chained, travel)
}

fn is_better(
    distance: i128,
    index: usize,
    entry: Point,
    best_distance: i128,
    best_index: usize,
    best_entry: Point,
) -> bool {
    distance < best_distance
        || (distance == best_distance
            && (index < best_index
                || (index == best_index && point_less_than(entry, best_entry))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::{
        ExtrusionAttributes, ExtrusionLoop, ExtrusionPath, ExtrusionRole,
    };
    use crate::geometry::{Polygon, Polyline};

    fn make_loop(center: Point, half_size: i64) -> ExtrusionEntity {
        ExtrusionEntity::Loop(ExtrusionLoop::new(
            Polygon::square(center, half_size),
            ExtrusionAttributes::new(ExtrusionRole::Perimeter),
        ))
    }

    fn make_path(points: Vec<Point>) -> ExtrusionEntity {
        ExtrusionEntity::Path(ExtrusionPath::new(
            Polyline::from_points(points),
            ExtrusionAttributes::new(ExtrusionRole::InternalInfill),
        ))
    }

    #[test]
    fn test_order_loops_empty() {
        let order = order_loops(&[], Some(Point::zero()));
        assert!(order.is_empty());
        let order = order_loops(&[], None);
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_order_loops_nearest_first() {
        // Outer loop near the origin, inner loop farther away.
        let outer = make_loop(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let inner = make_loop(Point::new_scale(12.0, 12.0), crate::scale(2.0));
        let entities = vec![inner, outer];

        let order = order_loops(&entities, Some(Point::zero()));
        assert_eq!(order.len(), 2);
        // The outer loop has the vertex nearest (0, 0).
        assert_eq!(order.loops[0].index, 1);
        assert_eq!(order.loops[1].index, 0);
    }

    #[test]
    fn test_order_loops_seam_nearest_cursor() {
        let square = make_loop(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let entities = vec![square];

        let order = order_loops(&entities, Some(Point::new_scale(10.5, 10.5)));
        assert_eq!(order.len(), 1);
        let selected = order.loops[0];
        // The seam vertex is the corner nearest the cursor.
        match &entities[selected.index] {
            ExtrusionEntity::Loop(l) => {
                assert_eq!(l.polygon[selected.seam_index], Point::new_scale(10.0, 10.0));
            }
            _ => panic!("expected loop"),
        }
        assert!(!selected.reversed);
    }

    #[test]
    fn test_order_loops_skips_empty() {
        let empty = ExtrusionEntity::Loop(ExtrusionLoop::new(
            Polygon::new(),
            ExtrusionAttributes::new(ExtrusionRole::Perimeter),
        ));
        let square = make_loop(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let entities = vec![empty, square];

        let order = order_loops(&entities, Some(Point::zero()));
        assert_eq!(order.len(), 1);
        assert_eq!(order.loops[0].index, 1);
    }

    #[test]
    fn test_order_loops_without_start_keeps_first() {
        let a = make_loop(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let b = make_loop(Point::new_scale(50.0, 50.0), crate::scale(5.0));
        let entities = vec![a, b];

        let order = order_loops(&entities, None);
        assert_eq!(order.loops[0].index, 0);
    }

    #[test]
    fn test_order_loops_deterministic() {
        let entities: Vec<ExtrusionEntity> = (0..6)
            .map(|i| make_loop(Point::new_scale(10.0 * i as f64, 0.0), crate::scale(3.0)))
            .collect();
        let first = order_loops(&entities, Some(Point::zero()));
        let second = order_loops(&entities, Some(Point::zero()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_loops_tie_breaks_by_index() {
        // Two identical loops; the lower original index wins.
        let a = make_loop(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let b = make_loop(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let entities = vec![a, b];

        let order = order_loops(&entities, Some(Point::zero()));
        assert_eq!(order.loops[0].index, 0);
        assert_eq!(order.loops[1].index, 1);
    }

    #[test]
    fn test_order_loops_never_beats_upstream_order() {
        // A near loop pointing away from the rest baits greedy into a long
        // backtrack; the stored order [B, A, C] travels less and must win.
        let b = make_loop(Point::new_scale(-11.0, 0.0), crate::scale(0.5));
        let a = make_loop(Point::new_scale(10.0, 0.0), crate::scale(0.5));
        let c = make_loop(Point::new_scale(20.0, 0.0), crate::scale(0.5));
        let entities = vec![b, a, c];
        let start = Point::zero();

        let order = order_loops(&entities, Some(start));
        assert_eq!(order.len(), 3);

        let travel = |sequence: &[OrderedLoop]| -> f64 {
            let mut cursor = start;
            let mut total = 0.0;
            for selected in sequence {
                let ExtrusionEntity::Loop(l) = &entities[selected.index] else {
                    panic!("expected loop");
                };
                let entry = l.polygon[selected.seam_index];
                total += cursor.distance(&entry);
                cursor = entry;
            }
            total
        };

        let (stored, stored_travel) =
            walk_loops_in_order(&entities, &[0, 1, 2], start);
        assert!(travel(&order.loops) <= stored_travel + 1e-9);
        // Here the stored order is strictly cheaper than greedy [A, C, B].
        assert_eq!(order.loops, stored);
        assert_eq!(
            order.loops.iter().map(|l| l.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_chain_open_paths_empty() {
        assert!(chain_open_paths(&[], Some(Point::zero())).is_empty());
        assert!(chain_open_paths(&[], None).is_empty());
    }

    #[test]
    fn test_chain_open_paths_reverses_for_nearer_end() {
        // A path stored pointing away from the cursor.
        let path = make_path(vec![Point::new_scale(10.0, 0.0), Point::new_scale(0.0, 0.0)]);
        let chain = chain_open_paths(&[path], Some(Point::zero()));
        assert_eq!(chain.len(), 1);
        assert!(chain[0].reversed);
    }

    #[test]
    fn test_chain_open_paths_zigzag() {
        // Parallel infill lines; the chain should alternate directions.
        let entities: Vec<ExtrusionEntity> = (0..4)
            .map(|i| {
                let y = i as f64;
                make_path(vec![Point::new_scale(0.0, y), Point::new_scale(10.0, y)])
            })
            .collect();

        let chain = chain_open_paths(&entities, Some(Point::zero()));
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].index, 0);
        assert!(!chain[0].reversed);
        assert_eq!(chain[1].index, 1);
        assert!(chain[1].reversed);
        assert_eq!(chain[2].index, 2);
        assert!(!chain[2].reversed);
        assert_eq!(chain[3].index, 3);
        assert!(chain[3].reversed);
    }

    #[test]
    fn test_chain_open_paths_never_beats_upstream_order() {
        // Same bait for open paths: greedy grabs the near positive pair and
        // pays a long return to B; the stored order wins.
        let entities = vec![
            make_path(vec![Point::new_scale(-11.0, 0.0), Point::new_scale(-21.0, 0.0)]),
            make_path(vec![Point::new_scale(10.0, 0.0), Point::new_scale(20.0, 0.0)]),
            make_path(vec![Point::new_scale(25.0, 0.0), Point::new_scale(35.0, 0.0)]),
        ];
        let start = Point::zero();

        let chain = chain_open_paths(&entities, Some(start));
        assert_eq!(chain.len(), 3);
        assert_eq!(
            chain.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(chain.iter().all(|c| !c.reversed));
    }

    #[test]
    fn test_chain_entity_references_orders_and_flips() {
        let far = make_path(vec![Point::new_scale(20.0, 0.0), Point::new_scale(30.0, 0.0)]);
        let near = make_path(vec![Point::new_scale(10.0, 0.0), Point::new_scale(0.0, 0.0)]);
        let references = vec![
            ExtrusionEntityReference::new(&far, false),
            ExtrusionEntityReference::new(&near, false),
        ];

        let chained = chain_entity_references(references, Some(Point::zero()));
        assert_eq!(chained.len(), 2);
        // The near path is entered at its stored end point, so it is flipped.
        assert!(chained[0].flipped());
        assert_eq!(chained[0].first_point(), Some(Point::zero()));
        assert!(!chained[1].flipped());
        assert_eq!(chained[1].first_point(), Some(Point::new_scale(20.0, 0.0)));
    }

    #[test]
    fn test_chain_entity_references_drops_empty() {
        let empty = make_path(vec![]);
        let solo = make_path(vec![Point::new_scale(1.0, 0.0), Point::new_scale(2.0, 0.0)]);
        let references = vec![
            ExtrusionEntityReference::new(&empty, false),
            ExtrusionEntityReference::new(&solo, false),
        ];

        let chained = chain_entity_references(references, None);
        assert_eq!(chained.len(), 1);
        assert!(chain_entity_references(vec![], Some(Point::zero())).is_empty());
    }

    #[test]
    fn test_chain_improves_travel() {
        // Scrambled input order; the chain's travel must not exceed the
        // upstream order's travel.
        let entities = vec![
            make_path(vec![Point::new_scale(30.0, 0.0), Point::new_scale(40.0, 0.0)]),
            make_path(vec![Point::new_scale(0.0, 0.0), Point::new_scale(10.0, 0.0)]),
            make_path(vec![Point::new_scale(15.0, 0.0), Point::new_scale(25.0, 0.0)]),
        ];
        let start = Point::zero();

        let chain = chain_open_paths(&entities, Some(start));

        let travel = |sequence: &[(usize, bool)]| -> f64 {
            let mut cursor = start;
            let mut total = 0.0;
            for &(index, reversed) in sequence {
                let ends = (entities[index].first_point(), entities[index].last_point());
                let (entry, exit) = match ends {
                    (Some(first), Some(last)) => {
                        if reversed {
                            (last, first)
                        } else {
                            (first, last)
                        }
                    }
                    _ => continue,
                };
                total += cursor.distance(&entry);
                cursor = exit;
            }
            total
        };

        let chained: Vec<(usize, bool)> = chain.iter().map(|c| (c.index, c.reversed)).collect();
        let upstream: Vec<(usize, bool)> = (0..entities.len()).map(|i| (i, false)).collect();
        assert!(travel(&chained) <= travel(&upstream));
    }
}
