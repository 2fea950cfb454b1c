use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use scopekit::{defer, defer_on_fail, defer_on_success, scope_exit, scope_fail, scope_success};

#[test]
fn exit_action_runs_at_end_of_scope() {
    let called = Cell::new(false);
    {
        let _guard = scope_exit(|| called.set(true));
        assert!(!called.get());
    }
    assert!(called.get());
}

#[test]
fn exit_action_runs_on_early_return() {
    fn leave_early(called: &Cell<bool>) {
        let _guard = scope_exit(|| called.set(true));
        if called.get() {
            unreachable!();
        }
    }

    let called = Cell::new(false);
    leave_early(&called);
    assert!(called.get());
}

#[test]
fn exit_action_runs_when_a_panic_occurs() {
    let called = Cell::new(false);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = scope_exit(|| called.set(true));
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(called.get());
}

#[test]
fn exit_action_does_not_run_when_released() {
    let called = Cell::new(false);
    {
        let guard = scope_exit(|| called.set(true));
        guard.release();
    }
    assert!(!called.get());
}

#[test]
fn release_still_drops_the_action() {
    struct NoteDrop(Rc<Cell<bool>>);
    impl Drop for NoteDrop {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    let ran = Rc::new(Cell::new(false));
    let dropped = Rc::new(Cell::new(false));
    {
        let note = NoteDrop(dropped.clone());
        let ran = ran.clone();
        let guard = scope_exit(move || {
            let _keep = &note;
            ran.set(true);
        });
        guard.release();
    }
    assert!(!ran.get());
    assert!(dropped.get());
}

#[test]
fn fail_action_runs_when_a_panic_occurs() {
    let called = Cell::new(false);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = scope_fail(|| called.set(true));
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(called.get());
}

#[test]
fn fail_action_does_not_run_on_normal_exit() {
    let called = Cell::new(false);
    {
        let _guard = scope_fail(|| called.set(true));
    }
    assert!(!called.get());
}

#[test]
fn fail_action_does_not_run_when_released() {
    let called = Cell::new(false);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let guard = scope_fail(|| called.set(true));
        guard.release();
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(!called.get());
}

#[test]
fn success_action_runs_on_normal_exit() {
    let called = Cell::new(false);
    {
        let _guard = scope_success(|| called.set(true));
    }
    assert!(called.get());
}

#[test]
fn success_action_does_not_run_when_a_panic_occurs() {
    let called = Cell::new(false);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = scope_success(|| called.set(true));
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(!called.get());
}

#[test]
fn success_action_does_not_run_when_released() {
    let called = Cell::new(false);
    {
        let guard = scope_success(|| called.set(true));
        guard.release();
    }
    assert!(!called.get());
}

// A panic that is already unwinding when a guard is created must not count
// as a failure of that guard's interval.
#[test]
fn preexisting_panic_is_not_a_new_failure() {
    struct GuardsInDrop {
        fail_fired: Rc<Cell<bool>>,
        success_fired: Rc<Cell<bool>>,
    }

    impl Drop for GuardsInDrop {
        fn drop(&mut self) {
            let fail_fired = self.fail_fired.clone();
            let success_fired = self.success_fired.clone();
            let _fail = scope_fail(move || fail_fired.set(true));
            let _success = scope_success(move || success_fired.set(true));
        }
    }

    let fail_fired = Rc::new(Cell::new(false));
    let success_fired = Rc::new(Cell::new(false));
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _probe = GuardsInDrop {
            fail_fired: fail_fired.clone(),
            success_fired: success_fired.clone(),
        };
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(!fail_fired.get());
    assert!(success_fired.get());
}

#[test]
fn guards_fire_in_reverse_construction_order() {
    let order = RefCell::new(Vec::new());
    {
        let _first = scope_exit(|| order.borrow_mut().push("first"));
        let _second = scope_exit(|| order.borrow_mut().push("second"));
    }
    assert_eq!(*order.borrow(), ["second", "first"]);
}

#[test]
fn moved_guard_fires_once_at_the_destination() {
    let calls = Cell::new(0);
    {
        let guard = scope_exit(|| calls.set(calls.get() + 1));
        let moved = guard;
        assert_eq!(calls.get(), 0);
        drop(moved);
        assert_eq!(calls.get(), 1);
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn guard_returned_from_a_function_fires_in_the_caller() {
    fn install(called: Rc<Cell<bool>>) -> scopekit::ScopeGuard<impl FnOnce()> {
        scope_exit(move || called.set(true))
    }

    let called = Rc::new(Cell::new(false));
    {
        let _guard = install(called.clone());
        assert!(!called.get());
    }
    assert!(called.get());
}

#[test]
fn defer_macro_runs_at_end_of_scope() {
    let called = Cell::new(false);
    {
        defer! {
            called.set(true);
        }
        assert!(!called.get());
    }
    assert!(called.get());
}

#[test]
fn defer_on_fail_macro_runs_only_on_panic() {
    let called = Cell::new(false);
    {
        defer_on_fail! {
            called.set(true);
        }
    }
    assert!(!called.get());

    let result = catch_unwind(AssertUnwindSafe(|| {
        defer_on_fail! {
            called.set(true);
        }
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(called.get());
}

#[test]
fn defer_on_success_macro_skips_on_panic() {
    let called = Cell::new(false);
    let result = catch_unwind(AssertUnwindSafe(|| {
        defer_on_success! {
            called.set(true);
        }
        panic!("boom");
    }));
    assert!(result.is_err());
    assert!(!called.get());

    {
        defer_on_success! {
            called.set(true);
        }
    }
    assert!(called.get());
}
