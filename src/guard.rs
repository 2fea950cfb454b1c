//! Conditional exit guards

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::panic::AssertUnwindSafe;

use tracing::{error, trace};

use crate::unwind::UnwindSnapshot;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Always {}
    impl Sealed for super::OnFail {}
    impl Sealed for super::OnSuccess {}
}

/// The trigger condition deciding whether a [`ScopeGuard`] fires when its
/// owning scope ends.
///
/// This trait is sealed; the only implementations are [`Always`], [`OnFail`]
/// and [`OnSuccess`]. Selecting the condition through a type parameter keeps
/// the three guard configurations a single engine with no runtime dispatch.
pub trait Strategy: private::Sealed {
    #[doc(hidden)]
    const NAME: &'static str;

    #[doc(hidden)]
    fn should_fire(baseline: UnwindSnapshot) -> bool;
}

/// Fire when the scope ends, regardless of how it was left.
#[derive(Debug)]
pub enum Always {}

/// Fire only if a panic began propagating within the guarded interval.
#[derive(Debug)]
pub enum OnFail {}

/// Fire only if no panic began propagating within the guarded interval.
#[derive(Debug)]
pub enum OnSuccess {}

impl Strategy for Always {
    const NAME: &'static str = "Always";

    #[inline]
    fn should_fire(_baseline: UnwindSnapshot) -> bool {
        true
    }
}

impl Strategy for OnFail {
    const NAME: &'static str = "OnFail";

    #[inline]
    fn should_fire(baseline: UnwindSnapshot) -> bool {
        baseline.unwind_started_since()
    }
}

impl Strategy for OnSuccess {
    const NAME: &'static str = "OnSuccess";

    #[inline]
    fn should_fire(baseline: UnwindSnapshot) -> bool {
        !baseline.unwind_started_since()
    }
}

/// A guard that runs its action at most once when the owning scope ends.
///
/// Guards are move-only: transferring one to another binding or scope moves
/// the obligation to fire along with it, and the compiler statically prevents
/// any use of the source afterwards. There is no way to duplicate an armed
/// guard, so the action can never run twice.
///
/// Whether the action runs at all is decided by the `S` type parameter; see
/// [`scope_exit`], [`scope_fail`] and [`scope_success`].
#[must_use = "the guard fires when dropped; binding it to `_` drops it immediately"]
pub struct ScopeGuard<F, S = Always>
where
    F: FnOnce(),
    S: Strategy,
{
    action: ManuallyDrop<F>,
    baseline: UnwindSnapshot,
    strategy: PhantomData<S>,
}

impl<F, S> ScopeGuard<F, S>
where
    F: FnOnce(),
    S: Strategy,
{
    fn new(action: F) -> Self {
        ScopeGuard {
            action: ManuallyDrop::new(action),
            baseline: UnwindSnapshot::now(),
            strategy: PhantomData,
        }
    }

    /// Disarms the guard, dropping the action without running it.
    ///
    /// Consuming the guard makes a second `release` (or a fire after
    /// release) impossible by construction.
    pub fn release(mut self) {
        // SAFETY: `self` is forgotten below, so neither `Drop` nor anything
        // else will touch the action again.
        unsafe { ManuallyDrop::drop(&mut self.action) }
        std::mem::forget(self);
    }
}

impl<F, S> Drop for ScopeGuard<F, S>
where
    F: FnOnce(),
    S: Strategy,
{
    fn drop(&mut self) {
        // SAFETY: drop runs at most once and the action is not accessed
        // after being taken.
        let action = unsafe { ManuallyDrop::take(&mut self.action) };
        if S::should_fire(self.baseline) {
            trace!(trigger = S::NAME, "scope guard firing");
            run_teardown(action);
        }
    }
}

impl<F, S> fmt::Debug for ScopeGuard<F, S>
where
    F: FnOnce(),
    S: Strategy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("trigger", &S::NAME)
            .finish_non_exhaustive()
    }
}

/// Returns a guard that runs `action` when the enclosing scope ends, however
/// it ends.
///
/// The action runs on normal fall-through, early `return`, `?` propagation
/// and panic alike, unless [`release`][ScopeGuard::release] was called first.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
///
/// let cleaned = Cell::new(false);
/// {
///     let _guard = scopekit::scope_exit(|| cleaned.set(true));
/// }
/// assert!(cleaned.get());
/// ```
pub fn scope_exit<F: FnOnce()>(action: F) -> ScopeGuard<F, Always> {
    ScopeGuard::new(action)
}

/// Returns a guard that runs `action` only if the enclosing scope is left by
/// a panic that began within it.
///
/// A panic that was already propagating when the guard was created does not
/// trigger it. See [`UnwindSnapshot`] for the limits of the detection.
pub fn scope_fail<F: FnOnce()>(action: F) -> ScopeGuard<F, OnFail> {
    ScopeGuard::new(action)
}

/// Returns a guard that runs `action` only if the enclosing scope is left
/// without a new panic — normal fall-through, early `return` or `?`.
pub fn scope_success<F: FnOnce()>(action: F) -> ScopeGuard<F, OnSuccess> {
    ScopeGuard::new(action)
}

/// Runs a cleanup action fired by automatic scope teardown.
///
/// Teardown actions must not panic. If one panics while the thread is
/// already unwinding there is no frame left to route the failure to, so the
/// process is aborted after logging rather than left to the runtime's
/// double-panic path. A panic during a non-unwinding teardown propagates to
/// the caller like any other panic.
pub(crate) fn run_teardown<F: FnOnce()>(action: F) {
    if std::thread::panicking() {
        if std::panic::catch_unwind(AssertUnwindSafe(action)).is_err() {
            error!("cleanup action panicked while the thread was already unwinding; aborting");
            std::process::abort();
        }
    } else {
        action();
    }
}
