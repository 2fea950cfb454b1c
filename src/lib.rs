#![warn(missing_docs)]

//! Scopekit provides deterministic, exactly-once cleanup bound to lexical
//! scope: a family of conditional exit guards and a generalized wrapper that
//! ties an opaque resource handle to a disposal action.
//!
//! A guard owns an action and fires it at most once when the guard is
//! dropped, no matter how the scope was left — normal fall-through, early
//! `return`, `?` propagation or panic. The conditional variants consult the
//! thread's unwind state so cleanup can be limited to failed or successful
//! exits. The [`UniqueResource`] wrapper applies the same exactly-once
//! discipline to a stored handle and its deleter, with checked construction
//! for acquisition functions that signal failure through a sentinel value.
//!
//! # Usage
//!
//! ```
//! use std::cell::Cell;
//! use scopekit::scope_exit;
//!
//! let cleaned = Cell::new(false);
//! {
//!     let _guard = scope_exit(|| cleaned.set(true));
//!     // work that may return early or panic
//! }
//! assert!(cleaned.get());
//! ```
//!
//! Wrapping a handle so that failed acquisition needs no special-casing:
//!
//! ```
//! use std::cell::RefCell;
//! use scopekit::unique_resource_checked;
//!
//! // pretend acquisition API: returns 0 on failure
//! fn acquire(succeed: bool) -> u32 {
//!     if succeed { 5 } else { 0 }
//! }
//!
//! let closed = RefCell::new(Vec::new());
//! {
//!     let ok = unique_resource_checked(acquire(true), 0, |h: &mut u32| {
//!         closed.borrow_mut().push(*h);
//!     });
//!     let failed = unique_resource_checked(acquire(false), 0, |h: &mut u32| {
//!         closed.borrow_mut().push(*h);
//!     });
//!     assert_eq!(*ok.get(), 5);
//!     assert_eq!(*failed.get(), 0);
//! }
//! // only the successful acquisition was disposed
//! assert_eq!(closed.into_inner(), [5]);
//! ```
//!
//! # Ownership
//!
//! Guards and wrappers are move-only. Moving one transfers the obligation to
//! fire along with it and statically ends the source's ability to act, so
//! the at-most-once invariant cannot be broken by aliasing. Within one
//! scope, guards fire in reverse construction order (ordinary drop order).
//!
//! Instances are single-owner and are not meant to be shared across threads;
//! a guard is `Send` exactly when its action is.
//!
//! # Panics and failure detection
//!
//! [`scope_fail`] and [`scope_success`] decide by comparing the thread's
//! unwind state at construction and at teardown, so a panic that was already
//! propagating when the guard was created is not treated as a failure of the
//! guarded interval. Rust exposes a boolean rather than a panic count, which
//! makes the detection best-effort; see [`UnwindSnapshot`] for the exact
//! limits, including `panic = "abort"` builds.
//!
//! Actions and deleters fired by automatic teardown must not panic. If one
//! panics while the thread is already unwinding there is nowhere to route
//! the failure and the process aborts (after logging at `error` level); this
//! mirrors the behavior of every deterministic-destruction precedent for the
//! pattern and is deliberately not swallowed. Panics out of *explicit* calls
//! such as [`UniqueResource::reset`] propagate to the caller normally, after
//! the wrapper has reached a consistent disposed state.

mod guard;
mod resource;
mod unwind;

pub use guard::{scope_exit, scope_fail, scope_success, Always, OnFail, OnSuccess, ScopeGuard, Strategy};
pub use resource::{unique_resource, unique_resource_checked, UniqueResource};
pub use unwind::UnwindSnapshot;

/// Runs statements when the enclosing scope ends, however it ends.
///
/// Statement-form sugar over [`scope_exit`]: binds an anonymous guard that
/// lives until the end of the enclosing scope.
///
/// ```
/// use std::cell::Cell;
///
/// let cleaned = Cell::new(false);
/// {
///     scopekit::defer! {
///         cleaned.set(true);
///     }
///     assert!(!cleaned.get());
/// }
/// assert!(cleaned.get());
/// ```
#[macro_export]
macro_rules! defer {
    ($($body:tt)*) => {
        let _guard = $crate::scope_exit(|| { $($body)* });
    };
}

/// Runs statements only if the enclosing scope is left by a panic that began
/// within it.
///
/// Statement-form sugar over [`scope_fail`].
#[macro_export]
macro_rules! defer_on_fail {
    ($($body:tt)*) => {
        let _guard = $crate::scope_fail(|| { $($body)* });
    };
}

/// Runs statements only if the enclosing scope is left without a new panic.
///
/// Statement-form sugar over [`scope_success`].
#[macro_export]
macro_rules! defer_on_success {
    ($($body:tt)*) => {
        let _guard = $crate::scope_success(|| { $($body)* });
    };
}
