/// Keep the `page_number`-th page (1-based) of `page_size` elements.
///
/// Pages past the end yield an empty vector. Page `0` is treated as page `1`.
pub fn page_slice<T>(items: Vec<T>, page_number: u32, page_size: u32) -> Vec<T> {
    let index = page_number.saturating_sub(1) as usize;
    let size = page_size as usize;

    let Some(start) = index.checked_mul(size) else {
        return Vec::new();
    };
    if start >= items.len() {
        return Vec::new();
    }

    items.into_iter().skip(start).take(size).collect()
}
