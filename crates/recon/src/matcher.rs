//! Predicate-driven match-and-diff over two lists.
//!
//! Greedy and order-dependent: each left element claims every still-free
//! right element its predicate accepts. Deterministic for a given input
//! order; not a maximum matching.

/// Output of [`match_and_diff`].
///
/// `matched` behaves like an insertion-ordered map: keys are distinct by
/// `PartialEq` and never carry an empty value list.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutput<A, B> {
    pub matched: Vec<(A, Vec<B>)>,
    pub unmatched_left: Vec<A>,
    pub unmatched_right: Vec<B>,
}

impl<A: PartialEq, B> MatchOutput<A, B> {
    /// Right elements claimed by `key`, if it was matched.
    pub fn get(&self, key: &A) -> Option<&[B]> {
        self.matched.iter().find(|(a, _)| a == key).map(|(_, bs)| bs.as_slice())
    }

    pub fn matched_right_count(&self) -> usize {
        self.matched.iter().map(|(_, bs)| bs.len()).sum()
    }
}

/// Pair every left element with all free right elements `pred` accepts.
///
/// A left value that is already a key (by structural equality) is not
/// matched again; the repeat goes to `unmatched_left`. Each right element is
/// consumed at most once, and claimed elements keep their input order.
pub fn match_and_diff<A, B, F>(
    left: impl IntoIterator<Item = A>,
    right: impl IntoIterator<Item = B>,
    mut pred: F,
) -> MatchOutput<A, B>
where
    A: PartialEq,
    F: FnMut(&A, &B) -> bool,
{
    let mut pool: Vec<B> = right.into_iter().collect();
    let mut matched: Vec<(A, Vec<B>)> = Vec::new();
    let mut unmatched_left = Vec::new();

    for a in left {
        if matched.iter().any(|(key, _)| *key == a) {
            unmatched_left.push(a);
            continue;
        }

        let (hits, rest): (Vec<B>, Vec<B>) = pool.into_iter().partition(|b| pred(&a, b));
        pool = rest;

        if hits.is_empty() {
            unmatched_left.push(a);
        } else {
            matched.push((a, hits));
        }
    }

    MatchOutput {
        matched,
        unmatched_left,
        unmatched_right: pool,
    }
}
