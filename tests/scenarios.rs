//! End-to-end scenarios for the storage transitions and the string layer.

use hybrid_vec::{Error, HybridString, HybridVec};

#[test]
fn inserting_at_front_spills_once_past_inline_capacity() {
    let mut v = HybridVec::<i32, 5>::new();
    let inline = v.data();

    let mut pos = 0;
    for i in (0..=5).rev() {
        assert_eq!(v.data(), inline, "Elements stay inline until the sixth insert");
        pos = v.insert(pos, i * 2);
        assert_eq!(pos, 0);
    }

    assert_ne!(v.data(), inline);
    assert_eq!(v.len(), 6);
    assert_eq!(v.capacity(), 9);
    assert_eq!(v, [0, 2, 4, 6, 8, 10]);
}

#[test]
fn popping_to_inline_capacity_moves_back_inline() {
    let mut v: HybridVec<u32, 4> = (0..5).collect();
    assert!(!v.is_inline());
    let heap = v.data();

    assert_eq!(v.pop(), Some(4));
    assert_eq!(v.len(), 4);
    assert_eq!(v.capacity(), 4);
    assert!(v.is_inline());
    assert_ne!(v.data(), heap);
    assert_eq!(v, [0, 1, 2, 3]);
}

#[test]
fn checked_access_at_the_boundary() {
    let v = HybridVec::<char, 2>::from(['a', 'b', 'c']);
    assert_eq!(v.at(v.len() - 1), Ok(&'c'));
    assert_eq!(v.at(v.len()), Err(Error::OutOfRange { index: 3, len: 3 }));

    let empty = HybridVec::<char, 2>::new();
    assert!(matches!(empty.at(0), Err(Error::OutOfRange { index: 0, len: 0 })));
}

#[test]
fn out_of_range_error_message() {
    let err = HybridVec::<u8, 1>::new().at(4).unwrap_err();
    assert_eq!(err.to_string(), "index 4 is out of range for length 0");
    assert_eq!(
        Error::InvalidArgument.to_string(),
        "invalid argument: null string pointer"
    );
}

#[test]
fn equality_ignores_capacity() {
    let mut grown = HybridVec::<i32, 2>::from([1, 2, 3, 4, 5]);
    grown.erase_range(3..5);
    let fresh = HybridVec::<i32, 2>::from([1, 2, 3]);

    assert_ne!(grown.capacity(), fresh.capacity());
    assert_eq!(grown, fresh);
}

#[test]
fn empty_string() {
    let s = HybridString::<16>::from("");
    assert_eq!(s.len(), 0);
    assert!(s.contains(""));
}

#[test]
fn string_concatenation() {
    let joined = HybridString::<4>::from("ab") + HybridString::<4>::from("cd");
    assert_eq!(joined, HybridString::<4>::from("abcd"));
}

#[test]
fn string_substring_search() {
    let s = HybridString::<16>::from("abcab");
    assert!(s.contains("cab"));
    assert!(!s.contains("xyz"));
}

#[test]
fn string_feeds_c_consumers() {
    let s = HybridString::<4>::from("spilled to the heap");
    let copy = unsafe { HybridString::<4>::from_ptr(s.as_ptr()) }.unwrap();
    assert_eq!(copy, s);
}
