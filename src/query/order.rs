/// Reorders `items` so the entries named in `reference` come first, in
/// reference order, followed by the rest in their original relative order.
///
/// Reference entries absent from `items` are ignored, as are repeats.
#[must_use]
pub fn sort_by_reference<T: Copy + PartialEq>(items: &[T], reference: &[T]) -> Vec<T> {
    let mut head: Vec<T> = Vec::with_capacity(items.len());
    for r in reference {
        if items.contains(r) && !head.contains(r) {
            head.push(*r);
        }
    }
    let tail: Vec<T> = items.iter().copied().filter(|i| !head.contains(i)).collect();
    head.extend(tail);
    head
}
