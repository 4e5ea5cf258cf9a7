//! Property-based tests using proptest.
//!
//! Every operation sequence is replayed against `Vec` as a model, and the
//! storage mode is checked against the capacity after each step.

use hybrid_vec::{grown_capacity, HybridString, HybridVec};
use proptest::prelude::*;

const INLINE: usize = 4;

// ============================================================================
// STRATEGIES
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    Insert(usize, i32),
    InsertMany(usize, Vec<i32>),
    Erase(usize),
    EraseRange(usize, usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(at, v)| Op::Insert(at, v)),
        1 => (any::<usize>(), prop::collection::vec(any::<i32>(), 0..8))
            .prop_map(|(at, vs)| Op::InsertMany(at, vs)),
        2 => any::<usize>().prop_map(Op::Erase),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::EraseRange(a, b)),
        1 => Just(Op::Clear),
    ]
}

fn ascii_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-c]{0,12}").unwrap()
}

/// Reference for the single-counter scan: restart on mismatch, never retry.
fn single_counter_scan(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    let mut matched = 0;
    for &byte in haystack {
        if matched == needle.len() {
            return true;
        }
        matched = if byte == needle[matched] { matched + 1 } else { 0 };
    }
    matched == needle.len()
}

fn assert_storage_invariant(v: &HybridVec<i32, INLINE>) {
    assert!(v.len() <= v.capacity());
    assert_eq!(v.is_inline(), v.capacity() == INLINE);
    if v.len() <= INLINE {
        assert_eq!(v.capacity(), INLINE, "len {} should be inline", v.len());
    }
}

// ============================================================================
// SEQUENCE PROPERTIES
// ============================================================================

proptest! {
    /// Property: pushes are observed in order.
    #[test]
    fn prop_push_preserves_order(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let mut v = HybridVec::<i32, INLINE>::new();
        for &x in &values {
            v.push(x);
        }
        prop_assert_eq!(v.len(), values.len());
        prop_assert!(v.iter().eq(values.iter()));
    }

    /// Property: any operation sequence matches `Vec` and keeps the storage
    /// mode in step with the capacity.
    #[test]
    fn prop_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut v = HybridVec::<i32, INLINE>::new();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Push(x) => {
                    v.push(x);
                    model.push(x);
                }
                Op::Pop => {
                    prop_assert_eq!(v.pop(), model.pop());
                }
                Op::Insert(at, x) => {
                    let at = at % (model.len() + 1);
                    prop_assert_eq!(v.insert(at, x), at);
                    model.insert(at, x);
                }
                Op::InsertMany(at, xs) => {
                    let at = at % (model.len() + 1);
                    prop_assert_eq!(v.insert_from_slice(at, &xs), at);
                    model.splice(at..at, xs);
                }
                Op::Erase(at) if !model.is_empty() => {
                    let at = at % model.len();
                    prop_assert_eq!(v.erase(at), at);
                    model.remove(at);
                }
                Op::Erase(_) => {}
                Op::EraseRange(a, b) => {
                    let a = a % (model.len() + 1);
                    let b = a + b % (model.len() - a + 1);
                    prop_assert_eq!(v.erase_range(a..b), a);
                    model.drain(a..b);
                }
                Op::Clear => {
                    v.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(v.as_slice(), model.as_slice());
            assert_storage_invariant(&v);
        }
    }

    /// Property: erasing a freshly inserted range restores the original.
    #[test]
    fn prop_insert_then_erase_round_trips(
        base in prop::collection::vec(any::<i32>(), 0..20),
        extra in prop::collection::vec(any::<i32>(), 0..20),
        at in any::<usize>(),
    ) {
        let mut v = HybridVec::<i32, INLINE>::from_slice(&base);
        let at = at % (base.len() + 1);

        let start = v.insert_from_slice(at, &extra);
        v.erase_range(start..start + extra.len());

        prop_assert_eq!(v.as_slice(), base.as_slice());
        assert_storage_invariant(&v);
    }

    /// Property: capacity never shrinks while only inserting.
    #[test]
    fn prop_growth_is_monotonic(batches in prop::collection::vec(0usize..10, 1..30)) {
        let mut v = HybridVec::<i32, INLINE>::new();
        let mut previous = v.capacity();

        for batch in batches {
            let len = v.len();
            let before = v.capacity();
            v.insert_iter(0, (0..batch).map(|x| x as i32));

            if len + batch > before {
                prop_assert_eq!(v.capacity(), grown_capacity(len, batch, INLINE));
            } else {
                prop_assert_eq!(v.capacity(), before);
            }
            prop_assert!(v.capacity() >= previous);
            previous = v.capacity();
        }
    }

    /// Property: clones are equal, keep capacity, and own their buffer.
    #[test]
    fn prop_clone_is_deep(values in prop::collection::vec(any::<i32>(), 0..40)) {
        let v: HybridVec<i32, INLINE> = values.iter().copied().collect();
        let c = v.clone();
        prop_assert_eq!(&c, &v);
        prop_assert_eq!(c.capacity(), v.capacity());
        if !v.is_empty() {
            prop_assert_ne!(c.data(), v.data());
        }
    }
}

// ============================================================================
// STRING PROPERTIES
// ============================================================================

proptest! {
    /// Property: the string tracks `String` and stays terminated.
    #[test]
    fn prop_string_matches_model(
        start in ascii_strategy(),
        pushes in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c']), 0..12),
        pops in 0usize..16,
    ) {
        let mut s = HybridString::<INLINE>::from(start.as_str());
        let mut model = start.clone().into_bytes();

        for &byte in &pushes {
            s.push(byte);
            model.push(byte);
        }
        for _ in 0..pops {
            prop_assert_eq!(s.pop(), model.pop());
        }

        prop_assert_eq!(s.as_bytes(), model.as_slice());
        prop_assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
        prop_assert_eq!(s.len() + 1, s.as_bytes_with_nul().len());
    }

    /// Property: `a + b` is the byte concatenation.
    #[test]
    fn prop_concatenation(a in ascii_strategy(), b in ascii_strategy()) {
        let joined = HybridString::<INLINE>::from(a.as_str()) + b.as_str();
        let expected = format!("{a}{b}");
        prop_assert_eq!(joined.as_bytes(), expected.as_bytes());
    }

    /// Property: `contains` follows the single-counter scan exactly, and is
    /// always right when it reports a match.
    #[test]
    fn prop_contains_follows_single_counter_scan(
        haystack in ascii_strategy(),
        needle in ascii_strategy(),
    ) {
        let s = HybridString::<INLINE>::from(haystack.as_str());
        let found = s.contains(needle.as_str());

        let expected = needle.len() <= haystack.len()
            && single_counter_scan(haystack.as_bytes(), needle.as_bytes());
        prop_assert_eq!(found, expected);
        if found {
            prop_assert!(haystack.contains(needle.as_str()));
        }
    }
}
