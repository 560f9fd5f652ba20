use std::cmp::Ordering;

use crate::{SortDir, Sortable};

/// Sort `items` by `field` in direction `dir`.
///
/// Every element is decorated with its input position and equal keys fall
/// back to that position ascending, so elements that compare equal keep their
/// relative order in both directions.
pub fn stable_sort<T: Sortable>(items: Vec<T>, field: &str, dir: SortDir) -> Vec<T> {
    let mut decorated: Vec<(usize, T)> = items.into_iter().enumerate().collect();

    decorated.sort_by(|(ia, a), (ib, b)| {
        let by_key = a.sort_key(field).cmp(&b.sort_key(field));
        let by_key = match dir {
            SortDir::Asc => by_key,
            SortDir::Desc => by_key.reverse(),
        };
        match by_key {
            Ordering::Equal => ia.cmp(ib),
            other => other,
        }
    });

    decorated.into_iter().map(|(_, item)| item).collect()
}
