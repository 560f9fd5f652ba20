use crate::Searchable;

/// Keep records where any searchable field contains `needle`, ignoring case.
/// A blank needle keeps everything.
pub fn filter_text<T: Searchable>(items: Vec<T>, needle: &str) -> Vec<T> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
        })
        .collect()
}
