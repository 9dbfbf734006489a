//! Purpose: Join an ordered sequence of text fragments with a fixed separator.
//! Exports: `SEPARATOR`, `join_strings`.
//! Role: Pure string utility backing the `joinery` CLI greeting.
//! Invariants: Separators appear strictly between adjacent fragments, never leading or trailing.
//! Invariants: Empty input yields an empty string; input is never mutated.

/// Text inserted between each adjacent pair of fragments.
pub const SEPARATOR: &str = ", ";

/// Concatenates `fragments` in order with [`SEPARATOR`] between each adjacent pair.
///
/// Returns a freshly allocated `String`; `n` fragments produce `n - 1` separators.
pub fn join_strings<S>(fragments: &[S]) -> String
where
    S: AsRef<str>,
{
    let Some((first, rest)) = fragments.split_first() else {
        return String::new();
    };

    let capacity = fragments
        .iter()
        .map(|fragment| fragment.as_ref().len())
        .sum::<usize>()
        + SEPARATOR.len() * rest.len();

    let mut joined = String::with_capacity(capacity);
    joined.push_str(first.as_ref());
    for fragment in rest {
        joined.push_str(SEPARATOR);
        joined.push_str(fragment.as_ref());
    }
    joined
}
