//! Pure list primitives used by the store.
//!
//! Both functions leave their inputs untouched and return new vectors.
//! Out-of-range indices are programming errors and panic; the store checks
//! indices before calling in here.

/// Remove the element at `from` and reinsert it at `to`, shifting the
/// elements in between.
///
/// # Panics
///
/// Panics if `from` or `to` is not a valid index of `list`.
pub fn move_within_list<T: Clone>(list: &[T], from: usize, to: usize) -> Vec<T> {
    assert!(
        from < list.len() && to < list.len(),
        "move_within_list: indices {from} -> {to} out of range for length {}",
        list.len()
    );

    let mut out = list.to_vec();
    if from != to {
        let item = out.remove(from);
        out.insert(to, item);
    }
    out
}

/// Remove the element at `from` in `source` and insert it into `dest` at
/// `to`, clamped to `dest.len()`.
///
/// # Panics
///
/// Panics if `from` is not a valid index of `source`.
pub fn transfer_between_lists<T: Clone>(
    source: &[T],
    dest: &[T],
    from: usize,
    to: usize,
) -> (Vec<T>, Vec<T>) {
    assert!(
        from < source.len(),
        "transfer_between_lists: index {from} out of range for length {}",
        source.len()
    );

    let mut new_source = source.to_vec();
    let item = new_source.remove(from);

    let mut new_dest = Vec::with_capacity(dest.len() + 1);
    new_dest.extend_from_slice(dest);
    new_dest.insert(to.min(dest.len()), item);

    (new_source, new_dest)
}
