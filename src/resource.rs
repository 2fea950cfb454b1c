//! Unique resource wrappers

use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};

use tracing::{debug, trace};

use crate::guard::run_teardown;

/// A move-only wrapper binding a resource handle to a disposal action.
///
/// When the wrapper is dropped while still armed, the deleter is invoked
/// with the stored handle exactly once. Disposal can be forced early with
/// [`reset`][UniqueResource::reset], suppressed with
/// [`release`][UniqueResource::release], or redirected to a new handle with
/// [`replace`][UniqueResource::replace].
///
/// Assigning a new wrapper over an existing binding drops the old value at
/// the assignment site, so `res = unique_resource(..)` disposes of the
/// previously owned handle immediately — the move-assignment semantics of
/// the pattern fall out of ordinary Rust moves.
///
/// The deleter borrows the handle slot rather than consuming it, so the
/// handle remains readable through [`get`][UniqueResource::get] after
/// disposal or release. The deleter is responsible for the logical resource
/// behind the handle; the handle *value* itself is still dropped normally
/// when the wrapper goes away.
#[must_use = "the resource is disposed when the wrapper is dropped; binding it to `_` drops it immediately"]
pub struct UniqueResource<H, D>
where
    D: FnMut(&mut H),
{
    handle: ManuallyDrop<H>,
    deleter: ManuallyDrop<D>,
    armed: bool,
}

/// Binds `handle` to `deleter`, armed for disposal at scope end.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
///
/// let closed = RefCell::new(Vec::new());
/// {
///     let res = scopekit::unique_resource(5, |h: &mut i32| closed.borrow_mut().push(*h));
///     assert_eq!(*res.get(), 5);
/// }
/// assert_eq!(closed.into_inner(), [5]);
/// ```
pub fn unique_resource<H, D>(handle: H, deleter: D) -> UniqueResource<H, D>
where
    D: FnMut(&mut H),
{
    UniqueResource {
        handle: ManuallyDrop::new(handle),
        deleter: ManuallyDrop::new(deleter),
        armed: true,
    }
}

/// Binds `handle` to `deleter` unless `handle` equals the `invalid` sentinel.
///
/// A wrapper built from the sentinel starts disarmed: the sentinel is stored
/// and readable through [`get`][UniqueResource::get] but is never passed to
/// the deleter. This lets acquisition functions that signal failure through
/// a sentinel value be wrapped unconditionally:
///
/// ```
/// fn acquire(succeed: bool) -> u32 {
///     if succeed { 7 } else { 0 }
/// }
///
/// let res = scopekit::unique_resource_checked(acquire(false), 0, |_h: &mut u32| {
///     unreachable!("failed acquisition is never disposed");
/// });
/// assert_eq!(*res.get(), 0);
/// ```
pub fn unique_resource_checked<H, D>(handle: H, invalid: H, deleter: D) -> UniqueResource<H, D>
where
    H: PartialEq,
    D: FnMut(&mut H),
{
    let armed = handle != invalid;
    if !armed {
        debug!("checked construction received the invalid sentinel; wrapper starts disarmed");
    }
    UniqueResource {
        handle: ManuallyDrop::new(handle),
        deleter: ManuallyDrop::new(deleter),
        armed,
    }
}

impl<H, D> UniqueResource<H, D>
where
    D: FnMut(&mut H),
{
    /// Returns a reference to the stored handle.
    ///
    /// The handle stays readable after [`reset`][Self::reset] or
    /// [`release`][Self::release]; whether it still designates a live
    /// resource at that point is up to the caller.
    #[inline]
    pub fn get(&self) -> &H {
        &self.handle
    }

    /// Returns a reference to the bound disposal action.
    #[inline]
    pub fn get_deleter(&self) -> &D {
        &self.deleter
    }

    /// Disarms the wrapper without disposing of the handle.
    ///
    /// Idempotent. The handle remains readable through [`get`][Self::get]
    /// but will no longer be disposed automatically; see
    /// [`into_inner`][Self::into_inner] for the consuming form that hands
    /// the handle back.
    #[inline]
    pub fn release(&mut self) {
        self.armed = false;
    }

    /// Disposes of the handle now, if the wrapper is still armed.
    ///
    /// The wrapper is disarmed *before* the deleter runs, so even a
    /// panicking deleter leaves the handle counted as disposed and a second
    /// `reset` (or the eventual drop) is a no-op.
    pub fn reset(&mut self) {
        if mem::take(&mut self.armed) {
            trace!("disposing resource on reset");
            (*self.deleter)(&mut *self.handle);
        }
    }

    /// Disposes of the currently owned handle (if armed), installs
    /// `new_handle` in its place and leaves the wrapper armed.
    ///
    /// The old handle is disposed before `replace` returns. Internally the
    /// new handle is installed first, so a panicking deleter can neither
    /// leak `new_handle` nor leave the wrapper owning an already-disposed
    /// handle; the old handle counts as disposed regardless.
    ///
    /// Replacing also re-arms a wrapper that was disarmed, including one
    /// built from the invalid sentinel by
    /// [`unique_resource_checked`].
    pub fn replace(&mut self, new_handle: H) {
        let mut old = mem::replace(&mut *self.handle, new_handle);
        if mem::replace(&mut self.armed, true) {
            trace!("disposing replaced resource");
            (*self.deleter)(&mut old);
        }
    }

    /// Disarms the wrapper and returns the handle without disposing of it.
    ///
    /// The deleter is dropped unused.
    pub fn into_inner(self) -> H {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `self` is never dropped and each field is taken exactly
        // once.
        let handle = unsafe { ManuallyDrop::take(&mut this.handle) };
        unsafe { ManuallyDrop::drop(&mut this.deleter) }
        handle
    }
}

impl<H, D> Deref for UniqueResource<H, D>
where
    D: FnMut(&mut H),
{
    type Target = H;

    #[inline]
    fn deref(&self) -> &H {
        &self.handle
    }
}

impl<H, D> DerefMut for UniqueResource<H, D>
where
    D: FnMut(&mut H),
{
    #[inline]
    fn deref_mut(&mut self) -> &mut H {
        &mut self.handle
    }
}

impl<H, D> Drop for UniqueResource<H, D>
where
    D: FnMut(&mut H),
{
    fn drop(&mut self) {
        if self.armed {
            trace!("disposing resource at scope end");
            let deleter: &mut D = &mut self.deleter;
            let handle: &mut H = &mut self.handle;
            run_teardown(|| deleter(handle));
        }
        // SAFETY: drop runs at most once and neither field is accessed
        // afterwards.
        unsafe {
            ManuallyDrop::drop(&mut self.handle);
            ManuallyDrop::drop(&mut self.deleter);
        }
    }
}

impl<H, D> fmt::Debug for UniqueResource<H, D>
where
    H: fmt::Debug,
    D: FnMut(&mut H),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueResource")
            .field("handle", &*self.handle)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
