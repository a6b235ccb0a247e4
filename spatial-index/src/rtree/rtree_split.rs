//! Guttman's quadratic split, shared by leaf and inner nodes.

use crate::extent::Extent;
use crate::index_types::RTreeData;

/// Splits a full node's `entries` plus the `incoming` entry into two groups.
///
/// Seeds are the pair that would waste the most area if grouped together.
/// The remaining entries are assigned one at a time, always taking the entry
/// with the strongest preference for one group, to the group it enlarges
/// least (ties go to the second group). The incoming entry is placed last by
/// the same rule. No minimum fill is enforced.
pub(crate) fn quadratic_split<T: RTreeData>(entries: Vec<T>, incoming: T) -> (Vec<T>, Vec<T>) {
    if entries.len() < 2 {
        return (entries, vec![incoming]);
    }

    let (seed_a, seed_b) = pick_seeds(&entries);
    let mut remaining: Vec<Option<T>> = entries.into_iter().map(Some).collect();

    let mut group_a = Vec::with_capacity(remaining.len());
    let mut group_b = Vec::with_capacity(remaining.len());
    let mut extent_a = Extent::NULL_EXTENT;
    let mut extent_b = Extent::NULL_EXTENT;

    if let Some(seed) = remaining[seed_a].take() {
        extent_a.union_in_place(seed.extent());
        group_a.push(seed);
    }
    if let Some(seed) = remaining[seed_b].take() {
        extent_b.union_in_place(seed.extent());
        group_b.push(seed);
    }

    while let Some(next) = pick_next(&remaining, &extent_a, &extent_b) {
        if let Some(entry) = remaining[next].take() {
            assign(entry, &mut group_a, &mut extent_a, &mut group_b, &mut extent_b);
        }
    }

    assign(incoming, &mut group_a, &mut extent_a, &mut group_b, &mut extent_b);
    (group_a, group_b)
}

/// Index pair maximizing `area(a ∪ b) - area(a) - area(b)`.
fn pick_seeds<T: RTreeData>(entries: &[T]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_waste = f64::NEG_INFINITY;
    for (i, a) in entries.iter().enumerate() {
        for (j, b) in entries.iter().enumerate().skip(i + 1) {
            let waste = a.extent().union(b.extent()).area() - a.extent().area() - b.extent().area();
            if waste > best_waste {
                best_waste = waste;
                best = (i, j);
            }
        }
    }
    best
}

/// Unassigned entry with the largest difference between its two enlargements.
fn pick_next<T: RTreeData>(
    remaining: &[Option<T>],
    extent_a: &Extent,
    extent_b: &Extent,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, entry) in remaining.iter().enumerate() {
        if let Some(entry) = entry {
            let d1 = extent_a.enlargement(entry.extent());
            let d2 = extent_b.enlargement(entry.extent());
            let preference = (d1 - d2).abs();
            if best.map_or(true, |(_, p)| p < preference) {
                best = Some((i, preference));
            }
        }
    }
    best.map(|(i, _)| i)
}

fn assign<T: RTreeData>(
    entry: T,
    group_a: &mut Vec<T>,
    extent_a: &mut Extent,
    group_b: &mut Vec<T>,
    extent_b: &mut Extent,
) {
    let d1 = extent_a.enlargement(entry.extent());
    let d2 = extent_b.enlargement(entry.extent());
    if d1 < d2 {
        extent_a.union_in_place(entry.extent());
        group_a.push(entry);
    } else {
        extent_b.union_in_place(entry.extent());
        group_b.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_types::MBRHandle;
    use std::collections::HashSet;

    fn mbr(xmin: f64, ymin: f64, xmax: f64, ymax: f64, handle: i64) -> MBRHandle {
        MBRHandle::new(Extent::new(xmin, ymin, xmax, ymax), handle)
    }

    #[test]
    fn test_seeds_are_farthest_apart() {
        let entries = vec![
            mbr(0.0, 0.0, 1.0, 1.0, 1),
            mbr(1.0, 1.0, 2.0, 2.0, 2),
            mbr(50.0, 50.0, 51.0, 51.0, 3),
        ];
        assert_eq!(pick_seeds(&entries), (0, 2));
    }

    #[test]
    fn test_split_separates_clusters() {
        let entries = vec![
            mbr(0.0, 0.0, 1.0, 1.0, 1),
            mbr(100.0, 100.0, 101.0, 101.0, 2),
            mbr(1.0, 0.0, 2.0, 1.0, 3),
            mbr(101.0, 100.0, 102.0, 101.0, 4),
        ];
        let (a, b) = quadratic_split(entries, mbr(0.0, 1.0, 1.0, 2.0, 5));

        let a: HashSet<i64> = a.iter().map(|e| e.handle).collect();
        let b: HashSet<i64> = b.iter().map(|e| e.handle).collect();
        let low: HashSet<i64> = [1, 3, 5].into_iter().collect();
        let high: HashSet<i64> = [2, 4].into_iter().collect();
        assert!((a == low && b == high) || (a == high && b == low));
    }

    #[test]
    fn test_split_keeps_every_entry() {
        let entries: Vec<MBRHandle> = (0..20)
            .map(|i| {
                let x = (i * 7 % 13) as f64;
                let y = (i * 5 % 11) as f64;
                mbr(x, y, x + 0.5, y + 0.5, i)
            })
            .collect();
        let (a, b) = quadratic_split(entries, mbr(3.0, 3.0, 4.0, 4.0, 99));

        assert_eq!(a.len() + b.len(), 21);
        assert!(!a.is_empty());
        assert!(!b.is_empty());
        let all: HashSet<i64> = a.iter().chain(b.iter()).map(|e| e.handle).collect();
        assert_eq!(all.len(), 21);
        assert!(all.contains(&99));
    }

    #[test]
    fn test_identical_entries_still_split() {
        let entries: Vec<MBRHandle> = (0..4).map(|i| mbr(0.0, 0.0, 1.0, 1.0, i)).collect();
        let (a, b) = quadratic_split(entries, mbr(0.0, 0.0, 1.0, 1.0, 4));
        assert_eq!(a.len() + b.len(), 5);
        assert!(!a.is_empty());
        assert!(!b.is_empty());
    }
}
