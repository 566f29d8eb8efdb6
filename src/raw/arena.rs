use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes, addressed by [`Handle`].
///
/// Freed slots go on a free list and are handed out again by the next `alloc`, so a tree that
/// churns through inserts and removals does not grow its backing vector.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live elements.
    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            return handle;
        }
        assert!(
            self.slots.len() <= Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX + 1
        );
        self.slots.push(Some(element));
        Handle::from_index(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns a mutable reference to an element through a pointer to the slot storage.
    ///
    /// Only the addressed slot is touched, so references to distinct slots obtained this way
    /// may coexist.
    ///
    /// # Safety
    /// - `slots` must come from [`Arena::slots_ptr`] on an arena that is still alive and has not
    ///   been structurally modified since.
    /// - No other reference to the same slot may be live for `'a`.
    #[inline]
    pub(crate) unsafe fn get_mut_ptr<'a>(slots: *mut Option<T>, handle: Handle) -> &'a mut T {
        // SAFETY: the caller guarantees `slots` points into a live slot vector that contains
        // `handle`, and that this slot is not aliased.
        unsafe { (*slots.add(handle.to_index())).as_mut().expect("`Arena::get_mut_ptr()` - `handle` is invalid!") }
    }

    /// Pointer to the first slot, for use with [`Arena::get_mut_ptr`].
    pub(crate) fn slots_ptr(&mut self) -> *mut Option<T> {
        self.slots.as_mut_ptr()
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
