//! Ambient unwind detection

/// An opaque snapshot of the calling thread's unwind state.
///
/// The conditional guard factories ([`scope_fail`][crate::scope_fail] and
/// [`scope_success`][crate::scope_success]) capture a snapshot at
/// construction time and compare it against the state at teardown time to
/// decide whether a panic began propagating *within* the guarded interval. A
/// panic that was already unwinding the stack when the guard was created
/// (for example, when a guard is created inside a `Drop` impl that runs
/// during a panic) does not count as a new failure.
///
/// Detection is best-effort: Rust exposes whether the thread is unwinding,
/// not how many panics are in flight, so a second panic started by a
/// destructor while the first is still unwinding is indistinguishable from
/// the first. Under `panic = "abort"` no unwinding ever occurs and every
/// scope appears to exit successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwindSnapshot {
    panicking: bool,
}

impl UnwindSnapshot {
    /// Captures the unwind state of the calling thread.
    #[inline]
    pub fn now() -> Self {
        UnwindSnapshot {
            panicking: std::thread::panicking(),
        }
    }

    /// Returns `true` if the calling thread began unwinding after this
    /// snapshot was taken.
    #[inline]
    pub fn unwind_started_since(self) -> bool {
        std::thread::panicking() && !self.panicking
    }
}
