//! The sequence engine: a vector that keeps up to `N` elements inline and
//! moves them to a single heap buffer once they no longer fit.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::mem::{self, MaybeUninit};
use core::ops::{Deref, DerefMut, Range};
use core::ptr;
use core::slice::{self, Iter, IterMut};

use crate::error::{Error, Result};
use crate::DEFAULT_INLINE_CAPACITY;

/// Returns the capacity a container must move to when `additional` elements
/// are added to `len` existing ones and the current buffer is too small.
///
/// A request that fits in `inline` slots yields `inline` itself; anything
/// larger yields `floor(3 * (len + additional) / 2)`. Growth is table-driven:
/// two containers with the same length and the same request always end up
/// with the same capacity.
///
/// ```
/// use hybrid_vec::grown_capacity;
///
/// assert_eq!(grown_capacity(5, 1, 5), 9);
/// assert_eq!(grown_capacity(0, 3, 5), 5);
/// assert_eq!(grown_capacity(0, 5, 5), 5);
/// ```
///
/// # Panics
///
/// Panics if the computation overflows `usize`.
pub fn grown_capacity(len: usize, additional: usize, inline: usize) -> usize {
    let required = len.checked_add(additional).expect("capacity overflow");
    if required <= inline {
        return inline;
    }

    required.checked_mul(3).expect("capacity overflow") / 2
}

/// The two storage modes. The variant is the only record of which buffer
/// currently holds the elements.
enum Storage<T, const N: usize> {
    Inline([MaybeUninit<T>; N]),
    Heap(Box<[MaybeUninit<T>]>),
}

impl<T, const N: usize> Storage<T, N> {
    const fn inline() -> Self {
        Self::Inline([const { MaybeUninit::uninit() }; N])
    }

    fn heap(capacity: usize) -> Self {
        Self::Heap(Box::new_uninit_slice(capacity))
    }

    fn slots(&self) -> &[MaybeUninit<T>] {
        match self {
            Self::Inline(slots) => slots.as_slice(),
            Self::Heap(slots) => &slots[..],
        }
    }

    fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        match self {
            Self::Inline(slots) => slots.as_mut_slice(),
            Self::Heap(slots) => &mut slots[..],
        }
    }
}

/// A growable vector with room for `N` elements inside the value itself.
///
/// While the capacity equals `N` the elements live in the inline buffer.
/// An insertion that does not fit moves every element into a heap buffer
/// sized by [`grown_capacity`]; a removal that leaves at most `N` elements
/// moves them back and frees the heap buffer.
///
/// Positions are plain indices. Any call that takes `&mut self` may relocate
/// the elements, so borrows obtained through [`iter`](Self::iter),
/// [`as_slice`](Self::as_slice) and friends cannot be held across it.
///
/// ```
/// use hybrid_vec::HybridVec;
///
/// let mut v = HybridVec::<i32, 2>::new();
/// v.push(1);
/// v.push(2);
/// assert!(v.is_inline());
///
/// v.push(3);
/// assert!(!v.is_inline());
/// assert_eq!(v.capacity(), 4);
///
/// v.pop();
/// assert!(v.is_inline());
/// assert_eq!(v.capacity(), 2);
/// ```
pub struct HybridVec<T, const N: usize = DEFAULT_INLINE_CAPACITY> {
    len: usize,
    storage: Storage<T, N>,
}

impl<T, const N: usize> HybridVec<T, N> {
    /// Creates an empty vector using inline storage.
    ///
    /// ```
    /// use hybrid_vec::HybridVec;
    ///
    /// let v = HybridVec::<i32, 8>::new();
    /// assert_eq!(v.capacity(), 8);
    /// assert_eq!(v.len(), 0);
    /// assert!(v.is_empty());
    /// ```
    pub const fn new() -> Self {
        Self {
            len: 0,
            storage: Storage::inline(),
        }
    }

    /// Returns the number of elements.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector holds no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the active buffer can hold.
    /// This is `N` while inline and strictly greater than `N` on the heap.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline(_) => N,
            Storage::Heap(slots) => slots.len(),
        }
    }

    /// Returns `true` while the elements live in the inline buffer.
    pub const fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// Returns a pointer to the first slot of the active buffer.
    pub fn data(&self) -> *const T {
        self.storage.slots().as_ptr().cast()
    }

    /// Returns a mutable pointer to the first slot of the active buffer.
    pub fn data_mut(&mut self) -> *mut T {
        self.storage.slots_mut().as_mut_ptr().cast()
    }

    /// Returns a shared slice over the elements.
    pub fn as_slice(&self) -> &[T] {
        self.deref()
    }

    /// Returns a mutable slice over the elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.deref_mut()
    }

    /// Returns a reference to the element at `index`, or
    /// [`Error::OutOfRange`] when `index >= len`.
    ///
    /// ```
    /// use hybrid_vec::{Error, HybridVec};
    ///
    /// let v = HybridVec::<u8, 4>::from([1, 2, 3]);
    /// assert_eq!(v.at(2), Ok(&3));
    /// assert_eq!(v.at(3), Err(Error::OutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T> {
        self.as_slice().get(index).ok_or(Error::OutOfRange {
            index,
            len: self.len,
        })
    }

    /// Mutable counterpart of [`at`](Self::at).
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Returns a reference to the element at `index` without any check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len). No check is made, not
    /// even in debug builds; use [`at`](Self::at) for a checked access.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        unsafe { &*self.data().add(index) }
    }

    /// Returns a mutable reference to the element at `index` without any check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        unsafe { &mut *self.data_mut().add(index) }
    }

    /// Returns `true` if an element equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(value)
    }

    /// Appends an element, moving to a larger buffer if the current one is full.
    ///
    /// ```
    /// use hybrid_vec::HybridVec;
    ///
    /// let mut v = HybridVec::<i32, 2>::new();
    /// v.push(10);
    /// v.push(20);
    /// v.push(30);
    /// assert_eq!(v, [10, 20, 30]);
    /// ```
    pub fn push(&mut self, value: T) {
        self.reserve_for(1);

        unsafe {
            self.data_mut().add(self.len).write(value);
        }

        self.len += 1;
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    /// Moves back to inline storage once at most `N` elements remain.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let value = unsafe { self.data().add(self.len - 1).read() };

        self.release_for(1);
        self.len -= 1;
        Some(value)
    }

    /// Inserts `value` at `index`, shifting every element after it one slot
    /// to the right. Returns `index`, the position of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// ```
    /// use hybrid_vec::HybridVec;
    ///
    /// let mut v = HybridVec::<i32, 3>::from([1, 3]);
    /// assert_eq!(v.insert(1, 2), 1);
    /// assert_eq!(v, [1, 2, 3]);
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );

        self.reserve_for(1);

        unsafe {
            let ptr = self.data_mut().add(index);

            // Shift elements starting from the index to the right
            ptr::copy(ptr, ptr.add(1), self.len - index);
            ptr.write(value);
        }

        self.len += 1;
        index
    }

    /// Inserts every element yielded by `iter` at `index`, in order, and
    /// returns `index`. Capacity is checked once for the whole batch.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> usize
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator<Item = T>,
    {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );

        let iter = iter.into_iter();
        self.reserve_for(iter.len());

        let tail_start = self.len;
        for element in iter {
            self.push(element);
        }

        // Move the appended run in front of the old tail
        let inserted = self.len - tail_start;
        self.as_mut_slice()[index..].rotate_right(inserted);

        // An iterator that reported more than it yielded may have spilled us
        self.release_for(0);
        index
    }

    /// Inserts clones of every element of `elements` at `index`.
    ///
    /// ```
    /// use hybrid_vec::HybridVec;
    ///
    /// let mut v = HybridVec::<i32, 2>::from([1, 5]);
    /// v.insert_from_slice(1, &[2, 3, 4]);
    /// assert_eq!(v, [1, 2, 3, 4, 5]);
    /// assert_eq!(v.capacity(), 7);
    /// ```
    pub fn insert_from_slice(&mut self, index: usize, elements: &[T]) -> usize
    where
        T: Clone,
    {
        self.insert_iter(index, elements.iter().cloned())
    }

    /// Removes the element at `index` and returns the index of the element
    /// that now follows the gap (which is `len()` when the last one was removed).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        assert!(
            index < self.len,
            "removal index (is {index}) should be < len (is {})",
            self.len
        );

        self.erase_range(index..index + 1)
    }

    /// Removes the elements in `range`, closes the gap, and returns
    /// `range.start`, the index of the first element after the removed run.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than its end or if the end
    /// is greater than the length of the vector.
    ///
    /// ```
    /// use hybrid_vec::HybridVec;
    ///
    /// let mut v = HybridVec::<i32, 2>::from([0, 1, 2, 3, 4]);
    /// assert_eq!(v.erase_range(1..4), 1);
    /// assert_eq!(v, [0, 4]);
    /// assert!(v.is_inline());
    /// ```
    pub fn erase_range(&mut self, range: Range<usize>) -> usize {
        assert!(
            range.start <= range.end,
            "removal range starts at {} but ends at {}",
            range.start,
            range.end
        );
        assert!(
            range.end <= self.len,
            "removal range end (is {}) should be <= len (is {})",
            range.end,
            self.len
        );

        let removed = range.len();
        let original_len = self.len;

        // Hide the range while its elements drop so a panicking destructor
        // leaks the tail instead of exposing dropped slots.
        self.len = range.start;

        unsafe {
            let ptr = self.data_mut();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                ptr.add(range.start),
                removed,
            ));

            // Shift the tail left to fill the gap
            ptr::copy(
                ptr.add(range.end),
                ptr.add(range.start),
                original_len - range.end,
            );
        }

        self.len = original_len;
        self.release_for(removed);
        self.len -= removed;

        range.start
    }

    /// Drops all elements, frees the heap buffer if any, and returns to inline
    /// storage with capacity `N`.
    pub fn clear(&mut self) {
        let len = mem::take(&mut self.len);

        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data_mut(), len));
        }

        if let Storage::Heap(slots) = &self.storage {
            tracing::trace!(len, from = slots.len(), to = N, "cleared heap buffer");
            self.storage = Storage::inline();
        }
    }

    /// Returns an iterator over immutable references to the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns an iterator over mutable references to the elements.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Makes room for `additional` more elements.
    ///
    /// Does nothing when the active buffer already fits `len + additional`.
    /// Otherwise moves every element into a new heap buffer of
    /// [`grown_capacity`] slots and frees the old heap buffer, if any.
    pub(crate) fn reserve_for(&mut self, additional: usize) {
        let from = self.capacity();
        let required = self.len.checked_add(additional).expect("capacity overflow");
        if required <= from {
            return;
        }

        let to = grown_capacity(self.len, additional, N);
        let mut storage = Storage::heap(to);

        unsafe {
            ptr::copy_nonoverlapping(
                self.data(),
                storage.slots_mut().as_mut_ptr().cast::<T>(),
                self.len,
            );
        }

        // The old slots are `MaybeUninit`, so dropping them only frees memory.
        let previous = mem::replace(&mut self.storage, storage);
        match previous {
            Storage::Inline(_) => tracing::trace!(len = self.len, from, to, "spilled to heap"),
            Storage::Heap(_) => tracing::trace!(len = self.len, from, to, "grew heap buffer"),
        }
    }

    /// Moves back to inline storage if at most `N` elements remain after
    /// `removed` of them are gone.
    ///
    /// Expects the surviving elements to already occupy the first
    /// `len - removed` slots; the caller adjusts `len` afterwards.
    pub(crate) fn release_for(&mut self, removed: usize) {
        let remaining = self.len - removed;
        if remaining > N {
            return;
        }

        let Storage::Heap(slots) = &self.storage else {
            return;
        };

        let from = slots.len();
        let mut inline = [const { MaybeUninit::uninit() }; N];
        unsafe {
            ptr::copy_nonoverlapping(slots.as_ptr(), inline.as_mut_ptr(), remaining);
        }

        self.storage = Storage::Inline(inline);
        tracing::trace!(len = remaining, from, to = N, "moved back inline");
    }
}

impl<T, const N: usize> HybridVec<T, N>
where
    T: Clone,
{
    /// Creates a vector holding `count` clones of `value`.
    ///
    /// ```
    /// use hybrid_vec::HybridVec;
    ///
    /// let v = HybridVec::<char, 4>::with_value(6, 'x');
    /// assert_eq!(v.len(), 6);
    /// assert_eq!(v.capacity(), 9);
    /// ```
    pub fn with_value(count: usize, value: T) -> Self {
        let mut vec = Self::new();
        vec.reserve_for(count);
        vec.extend(core::iter::repeat_n(value, count));
        vec
    }

    /// Creates a vector holding clones of every element of `elements`.
    pub fn from_slice(elements: &[T]) -> Self {
        let mut vec = Self::new();
        vec.insert_from_slice(0, elements);
        vec
    }
}

impl<T, const N: usize> Default for HybridVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Clone for HybridVec<T, N>
where
    T: Clone,
{
    /// Deep copy keeping both the length and the current capacity.
    fn clone(&self) -> Self {
        let mut vec = Self::new();
        if !self.is_inline() {
            vec.storage = Storage::heap(self.capacity());
        }

        for element in self {
            vec.push(element.clone());
        }

        vec
    }
}

impl<T, const N: usize, const M: usize> From<[T; M]> for HybridVec<T, N> {
    fn from(value: [T; M]) -> Self {
        let mut vec = Self::new();
        vec.insert_iter(0, value);
        vec
    }
}

impl<T, const N: usize> From<&[T]> for HybridVec<T, N>
where
    T: Clone,
{
    fn from(value: &[T]) -> Self {
        Self::from_slice(value)
    }
}

/// Collecting sizes the container once, exactly as [`HybridVec::from_slice`]
/// would for the same elements: `grown_capacity(0, count, N)`.
impl<T, const N: usize> FromIterator<T> for HybridVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

/// Extending grows at most once, to `grown_capacity(len, count, N)`.
///
/// Iterators with an exact size hint are written straight into the buffer.
/// Any other iterator is drained into a scratch `Vec` first so the element
/// count is known before the growth check.
impl<T, const N: usize> Extend<T> for HybridVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        match iter.size_hint() {
            (lower, Some(upper)) if lower == upper => {
                self.reserve_for(lower);
                for element in iter {
                    self.push(element);
                }

                // The hint is not trusted for the storage mode
                self.release_for(0);
            }
            _ => {
                let buffered: Vec<T> = iter.collect();
                let end = self.len;
                self.insert_iter(end, buffered);
            }
        }
    }
}

impl<T, const N: usize> Deref for HybridVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        unsafe { slice::from_raw_parts(self.data(), self.len) }
    }
}

impl<T, const N: usize> DerefMut for HybridVec<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let len = self.len;
        unsafe { slice::from_raw_parts_mut(self.data_mut(), len) }
    }
}

impl<T, const N: usize> AsRef<[T]> for HybridVec<T, N> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> AsMut<[T]> for HybridVec<T, N> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize> IntoIterator for HybridVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = mem::take(&mut self.len);
        let storage = mem::replace(&mut self.storage, Storage::inline());

        IntoIter {
            storage,
            range: 0..len,
        }
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a HybridVec<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut HybridVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const N: usize, const M: usize> PartialEq<HybridVec<T, M>> for HybridVec<T, N>
where
    T: PartialEq,
{
    fn eq(&self, other: &HybridVec<T, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, const N: usize> PartialEq<[T]> for HybridVec<T, N>
where
    T: PartialEq,
{
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T, const N: usize> PartialEq<&[T]> for HybridVec<T, N>
where
    T: PartialEq,
{
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, const N: usize, const M: usize> PartialEq<[T; M]> for HybridVec<T, N>
where
    T: PartialEq,
{
    fn eq(&self, other: &[T; M]) -> bool {
        self.as_slice() == other
    }
}

impl<T, const N: usize, const M: usize> PartialEq<&[T; M]> for HybridVec<T, N>
where
    T: PartialEq,
{
    fn eq(&self, other: &&[T; M]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, const N: usize> Eq for HybridVec<T, N> where T: Eq {}

impl<T, const N: usize> PartialOrd for HybridVec<T, N>
where
    T: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.as_slice().partial_cmp(other)
    }
}

impl<T, const N: usize> Ord for HybridVec<T, N>
where
    T: Ord,
{
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_slice().cmp(other)
    }
}

impl<T, const N: usize> Hash for HybridVec<T, N>
where
    T: Hash,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, const N: usize> core::fmt::Debug for HybridVec<T, N>
where
    T: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, const N: usize> Drop for HybridVec<T, N> {
    fn drop(&mut self) {
        let len = mem::take(&mut self.len);

        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data_mut(), len));
        }
    }
}

// ---

/// An owning iterator over the elements of a [`HybridVec`].
pub struct IntoIter<T, const N: usize> {
    storage: Storage<T, N>,
    range: Range<usize>,
}

impl<T, const N: usize> IntoIter<T, N> {
    /// Returns the elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        let remaining = &self.storage.slots()[self.range.clone()];
        unsafe { slice::from_raw_parts(remaining.as_ptr().cast(), remaining.len()) }
    }
}

impl<T, const N: usize> core::fmt::Debug for IntoIter<T, N>
where
    T: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(unsafe { self.storage.slots()[index].assume_init_read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        Some(unsafe { self.storage.slots()[index].assume_init_read() })
    }
}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {
    fn len(&self) -> usize {
        self.range.len()
    }
}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        let slots = self.storage.slots_mut();
        for index in self.range.clone() {
            unsafe { slots[index].assume_init_drop() };
        }
    }
}
