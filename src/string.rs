//! A NUL-terminated byte string layered over [`HybridVec`].

use core::ffi::{c_char, CStr};
use core::fmt;
use core::ops::{Add, AddAssign, Deref};

use crate::error::{Error, Result};
use crate::vec::HybridVec;
use crate::DEFAULT_INLINE_CAPACITY;

const TERMINATOR: u8 = 0;

/// Cuts `bytes` at the first terminator, like `strlen` would.
fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&byte| byte == TERMINATOR) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// A byte string stored in a [`HybridVec<u8, N>`] that always ends with a
/// single NUL terminator.
///
/// The terminator is not counted by [`len`](Self::len) but does take one
/// slot of the underlying storage, so up to `N - 1` bytes fit inline.
/// Text given as `&str`, `&[u8]` or a raw pointer is read up to its first
/// NUL byte.
///
/// ```
/// use hybrid_vec::HybridString;
///
/// let mut s = HybridString::<4>::from("abc");
/// assert!(s.is_inline());
///
/// s += b'd';
/// assert!(!s.is_inline());
/// assert_eq!(s.as_bytes_with_nul(), b"abcd\0");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HybridString<const N: usize = DEFAULT_INLINE_CAPACITY> {
    bytes: HybridVec<u8, N>,
}

impl<const N: usize> HybridString<N> {
    /// Creates an empty string holding only the terminator.
    pub fn new() -> Self {
        Self {
            bytes: HybridVec::with_value(1, TERMINATOR),
        }
    }

    /// Creates a string from `bytes`, up to the first NUL byte if there is one.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut string = Self::new();
        string.push_bytes(bytes);
        string
    }

    /// Copies a NUL-terminated string owned by foreign code.
    ///
    /// Returns [`Error::InvalidArgument`] if `ptr` is null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must satisfy the requirements of [`CStr::from_ptr`].
    pub unsafe fn from_ptr(ptr: *const c_char) -> Result<Self> {
        if ptr.is_null() {
            return Err(Error::InvalidArgument);
        }

        let source = unsafe { CStr::from_ptr(ptr) };
        Ok(Self::from(source))
    }

    /// Returns the number of bytes, terminator excluded.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Returns `true` if the string holds only the terminator.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the capacity of the underlying storage, terminator slot included.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Returns `true` while the bytes live in the inline buffer.
    pub fn is_inline(&self) -> bool {
        self.bytes.is_inline()
    }

    /// Returns the content without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Returns the content followed by the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Returns a pointer to the terminated buffer for C-style consumers.
    ///
    /// The pointer is valid until the next call that takes `&mut self`.
    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.data().cast()
    }

    /// Borrows the content as a [`CStr`]. An interior NUL pushed with
    /// [`push`](Self::push) ends the borrowed view early.
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.bytes.as_slice()).unwrap_or_default()
    }

    /// Appends a byte, moving the terminator one slot to the right.
    pub fn push(&mut self, byte: u8) {
        // One slot for the byte, the terminator slides into the new one.
        self.bytes.reserve_for(1);

        let end = self.len();
        self.bytes[end] = byte;
        self.bytes.push(TERMINATOR);
    }

    /// Removes and returns the last byte, or `None` if the string is empty.
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }

        let last = self.len() - 1;
        let byte = self.bytes[last];

        self.bytes.pop();
        self.bytes[last] = TERMINATOR;
        Some(byte)
    }

    /// Empties the string and returns it to inline storage.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.bytes.push(TERMINATOR);
    }

    /// Appends `bytes` up to their first NUL byte.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.append(until_nul(bytes));
    }

    /// Appends `text` up to its first NUL character.
    pub fn push_str(&mut self, text: &str) {
        self.push_bytes(text.as_bytes());
    }

    /// Appends a NUL-terminated string owned by foreign code.
    ///
    /// Returns [`Error::InvalidArgument`] if `ptr` is null, leaving `self`
    /// untouched.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must satisfy the requirements of [`CStr::from_ptr`].
    pub unsafe fn push_ptr(&mut self, ptr: *const c_char) -> Result<()> {
        if ptr.is_null() {
            return Err(Error::InvalidArgument);
        }

        let source = unsafe { CStr::from_ptr(ptr) };
        self.append(source.to_bytes());
        Ok(())
    }

    /// Reports whether `needle` (read up to its first NUL byte) occurs in the
    /// string.
    ///
    /// The scan walks the string once with a single match counter that
    /// restarts at zero on every mismatch without looking back, so a needle
    /// whose start repeats inside itself can be missed:
    ///
    /// ```
    /// use hybrid_vec::HybridString;
    ///
    /// let s = HybridString::<8>::from("abcab");
    /// assert!(s.contains("cab"));
    /// assert!(!s.contains("xyz"));
    /// assert!(s.contains(""));
    ///
    /// assert!(!HybridString::<8>::from("aab").contains("ab"));
    /// ```
    pub fn contains(&self, needle: impl AsRef<[u8]>) -> bool {
        let needle = until_nul(needle.as_ref());
        if needle.is_empty() {
            return true;
        }
        if needle.len() > self.len() {
            return false;
        }

        let mut matched = 0;
        for &byte in self.as_bytes() {
            if matched == needle.len() {
                return true;
            }

            if byte == needle[matched] {
                matched += 1;
            } else {
                matched = 0;
            }
        }

        matched == needle.len()
    }

    /// [`contains`](Self::contains) for a needle owned by foreign code.
    ///
    /// Returns [`Error::InvalidArgument`] if `needle` is null.
    ///
    /// # Safety
    ///
    /// A non-null `needle` must satisfy the requirements of [`CStr::from_ptr`].
    pub unsafe fn contains_ptr(&self, needle: *const c_char) -> Result<bool> {
        if needle.is_null() {
            return Err(Error::InvalidArgument);
        }

        let needle = unsafe { CStr::from_ptr(needle) };
        Ok(self.contains(needle.to_bytes()))
    }

    /// Inserts `content` in front of the terminator.
    fn append(&mut self, content: &[u8]) {
        let end = self.len();
        self.bytes.insert_from_slice(end, content);
    }
}

impl<const N: usize> Default for HybridString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> From<&str> for HybridString<N> {
    fn from(value: &str) -> Self {
        Self::from_bytes(value.as_bytes())
    }
}

impl<const N: usize> From<&[u8]> for HybridString<N> {
    fn from(value: &[u8]) -> Self {
        Self::from_bytes(value)
    }
}

impl<const N: usize> From<&CStr> for HybridString<N> {
    fn from(value: &CStr) -> Self {
        let mut string = Self::new();
        string.append(value.to_bytes());
        string
    }
}

impl<const N: usize> Deref for HybridString<N> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl<const N: usize> AsRef<[u8]> for HybridString<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> AsRef<CStr> for HybridString<N> {
    fn as_ref(&self) -> &CStr {
        self.as_c_str()
    }
}

impl<const N: usize> PartialEq<str> for HybridString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> PartialEq<&str> for HybridString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> AddAssign<&HybridString<N>> for HybridString<N> {
    fn add_assign(&mut self, rhs: &HybridString<N>) {
        self.append(rhs.as_bytes());
    }
}

impl<const N: usize> AddAssign<HybridString<N>> for HybridString<N> {
    fn add_assign(&mut self, rhs: HybridString<N>) {
        *self += &rhs;
    }
}

impl<const N: usize> AddAssign<&str> for HybridString<N> {
    fn add_assign(&mut self, rhs: &str) {
        self.push_str(rhs);
    }
}

impl<const N: usize> AddAssign<&CStr> for HybridString<N> {
    fn add_assign(&mut self, rhs: &CStr) {
        self.append(rhs.to_bytes());
    }
}

impl<const N: usize> AddAssign<u8> for HybridString<N> {
    fn add_assign(&mut self, rhs: u8) {
        self.push(rhs);
    }
}

// `a + b` copies `a` (or reuses it when owned) and delegates to `+=`.
macro_rules! impl_concat {
    ($($rhs:ty),* $(,)?) => {$(
        impl<const N: usize> Add<$rhs> for HybridString<N> {
            type Output = HybridString<N>;

            fn add(mut self, rhs: $rhs) -> Self::Output {
                self += rhs;
                self
            }
        }

        impl<const N: usize> Add<$rhs> for &HybridString<N> {
            type Output = HybridString<N>;

            fn add(self, rhs: $rhs) -> Self::Output {
                let mut string = self.clone();
                string += rhs;
                string
            }
        }
    )*};
}

impl_concat!(&HybridString<N>, HybridString<N>, &str, &CStr, u8);

impl<const N: usize> fmt::Write for HybridString<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl<const N: usize> fmt::Display for HybridString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.as_bytes().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }

        Ok(())
    }
}

impl<const N: usize> fmt::Debug for HybridString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_c_str(), f)
    }
}
