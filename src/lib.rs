#![no_std]

//! Growable containers with a **small-buffer optimization**, `no_std` compatible.
//!
//! [`HybridVec<T, N>`] keeps up to `N` elements inline, inside the value
//! itself, and moves them to a single heap buffer once an insertion no longer
//! fits. When removals bring the length back to `N` or less, the elements move
//! back inline and the heap buffer is freed. Growth follows one fixed rule,
//! see [`grown_capacity`].
//!
//! [`HybridString<N>`] is a byte string built on `HybridVec<u8, N>` that
//! always keeps a NUL terminator after its content, so it can be handed to
//! C-style consumers through [`HybridString::as_ptr`].
//!
//! ```rust
//! use hybrid_vec::{HybridString, HybridVec};
//!
//! let mut v = HybridVec::<i32, 4>::new();
//! v.push(10);
//! v.push(20);
//! v.push(30);
//! assert_eq!(v.len(), 3);
//! assert!(v.is_inline());
//!
//! v.insert_from_slice(0, &[1, 2]);
//! assert_eq!(v, [1, 2, 10, 20, 30]);
//! assert_eq!(v.capacity(), 7);
//!
//! assert_eq!(v.at(4), Ok(&30));
//! assert!(v.at(5).is_err());
//!
//! let s = HybridString::<8>::from("ab") + "cd";
//! assert_eq!(s, "abcd");
//! assert!(s.contains("bc"));
//! ```
//!
//! Storage transitions are reported as `tracing` events at `TRACE` level.

extern crate alloc;

mod error;
mod string;
mod vec;

pub use error::{Error, Result};
pub use string::HybridString;
pub use vec::{grown_capacity, HybridVec, IntoIter};

/// Inline capacity used when the `N` parameter is left out.
pub const DEFAULT_INLINE_CAPACITY: usize = 16;
