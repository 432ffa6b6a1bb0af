//! Depth-first execution of the resolved tree.
//!
//! The scheduler is a strictly sequential state machine: for every running
//! group it executes the `before` hooks, the group's own tests in
//! registration order, the child groups, and finally the `after` hooks. Only
//! the engine's completion race ever blocks; everything between two units is
//! plain bookkeeping on the accumulator fields below.

use std::io;

use crate::{
    engine,
    formatter::{GroupLine, SuiteFormatter, TestLine},
    outcome::TestStatus,
    report::RunFailure,
    resolve::Resolution,
    tree::{GroupId, HookKind, Tree},
};

pub(crate) struct Executor<'r> {
    pub(crate) tree: &'r mut Tree,
    pub(crate) resolution: &'r Resolution,
    pub(crate) formatter: &'r mut dyn SuiteFormatter,
    pub(crate) passed: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
    pub(crate) failures: Vec<RunFailure>,
    pub(crate) fmt_errors: Vec<io::Error>,
}

impl Executor<'_> {
    pub(crate) fn fmt_run_start(&mut self) {
        let res = self.formatter.fmt_run_start();
        self.fmt(res);
    }

    pub(crate) fn run_group(&mut self, id: GroupId, depth: usize) {
        if self.resolution.group_runs(id) {
            self.enter_group(id, depth);
        } else if self.resolution.group_skip_visible(id) {
            self.skip_subtree(id, depth);
        }
        // Anything else sits outside the exclusive scope and stays silent.
    }

    fn enter_group(&mut self, id: GroupId, depth: usize) {
        self.announce_group(id, depth);

        if self.run_hooks(id, HookKind::Before) {
            for test_idx in 0..self.tree.group(id).tests.len() {
                self.run_test(id, test_idx, depth);
            }
            for child_idx in 0..self.tree.group(id).children.len() {
                let child = self.tree.group(id).children[child_idx];
                self.run_group(child, depth + 1);
            }
        }

        // A failed before hook abandons the group's own work, but cleanup
        // still happens and siblings still run.
        self.run_hooks(id, HookKind::After);
    }

    /// Runs one kind of the group's hooks in registration order. Returns
    /// false when one of them failed.
    ///
    /// A `before` failure stops at the first offender; `after` hooks are
    /// independent cleanup steps and all of them run, each failure recorded
    /// separately. Hook failures never touch the test counters.
    fn run_hooks(&mut self, id: GroupId, kind: HookKind) -> bool {
        let count = match kind {
            HookKind::Before => self.tree.group(id).before_hooks.len(),
            HookKind::After => self.tree.group(id).after_hooks.len(),
        };

        let mut ok = true;
        for idx in 0..count {
            let group = self.tree.group(id);
            let hook = match kind {
                HookKind::Before => &group.before_hooks[idx],
                HookKind::After => &group.after_hooks[idx],
            };
            let label = hook.kind.label();
            let timeout = self.resolution.timeout_for(id, hook.raw_timeout);
            let outcome = engine::run_unit(&hook.func, timeout);

            if let Some(fault) = outcome.into_fault() {
                let path = self.tree.path_name(id);
                let name = match path.is_empty() {
                    true => format!("{label} hook"),
                    false => format!("{path} {label} hook"),
                };
                self.failures.push(RunFailure { name, fault });
                ok = false;
                if kind == HookKind::Before {
                    break;
                }
            }
        }
        ok
    }

    fn run_test(&mut self, id: GroupId, idx: usize, depth: usize) {
        let (selected, skip, timeout) = {
            let test = &self.tree.group(id).tests[idx];
            (
                self.resolution.test_selected(id, test.raw_only),
                test.raw_skip,
                self.resolution.timeout_for(id, test.raw_timeout),
            )
        };
        if !selected {
            return;
        }

        let status = match skip {
            true => TestStatus::Skipped,
            false => {
                let outcome = engine::run_unit(&self.tree.group(id).tests[idx].func, timeout);
                match outcome.into_fault() {
                    None => TestStatus::Passed,
                    Some(fault) => TestStatus::Failed(fault),
                }
            }
        };
        self.tree.group_mut(id).tests[idx].status = status;

        let test = &self.tree.group(id).tests[idx];
        let failure_index = match &test.status {
            TestStatus::Passed => {
                self.passed += 1;
                None
            }
            TestStatus::Skipped => {
                self.skipped += 1;
                None
            }
            TestStatus::Failed(fault) => {
                self.failed += 1;
                self.failures.push(RunFailure {
                    name: test.full_name.clone(),
                    fault: fault.clone(),
                });
                Some(self.failures.len())
            }
            TestStatus::Pending => None,
        };

        let res = self.formatter.fmt_test_outcome(TestLine {
            name: &test.name,
            full_name: &test.full_name,
            depth,
            status: &test.status,
            failure_index,
        });
        self.fmt(res);
    }

    /// Marks every test beneath a visibly skipped group as skipped, counted
    /// and reported, without touching any hook or test function.
    fn skip_subtree(&mut self, id: GroupId, depth: usize) {
        self.announce_group(id, depth);

        for idx in 0..self.tree.group(id).tests.len() {
            self.tree.group_mut(id).tests[idx].status = TestStatus::Skipped;
            self.skipped += 1;

            let test = &self.tree.group(id).tests[idx];
            let res = self.formatter.fmt_test_outcome(TestLine {
                name: &test.name,
                full_name: &test.full_name,
                depth,
                status: &test.status,
                failure_index: None,
            });
            self.fmt(res);
        }

        for child_idx in 0..self.tree.group(id).children.len() {
            let child = self.tree.group(id).children[child_idx];
            self.skip_subtree(child, depth + 1);
        }
    }

    fn announce_group(&mut self, id: GroupId, depth: usize) {
        let group = self.tree.group(id);
        if group.name.is_empty() {
            return;
        }
        let res = self.formatter.fmt_group_start(GroupLine {
            name: &group.name,
            depth,
        });
        self.fmt(res);
    }

    fn fmt(&mut self, res: io::Result<()>) {
        if let Err(err) = res {
            self.fmt_errors.push(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use crate::test_support::*;

    #[test]
    fn before_hooks_observe_everything_that_ran_before_their_group() {
        let counter = Counter::new();
        let observed: Arc<Mutex<Vec<usize>>> = Arc::default();

        let mut s = quiet();
        s.describe("a", |s| {
            let (c, o) = (counter.clone(), observed.clone());
            s.before(move || o.lock().unwrap().push(c.get()));
            let c = counter.clone();
            s.test("t1", move || c.bump());

            s.describe("b", |s| {
                let (c, o) = (counter.clone(), observed.clone());
                s.before(move || o.lock().unwrap().push(c.get()));
                let c = counter.clone();
                s.test("t2", move || c.bump());
            });

            s.describe("c", |s| {
                let (c, o) = (counter.clone(), observed.clone());
                s.before(move || o.lock().unwrap().push(c.get()));
                let c = counter.clone();
                s.test("t3", move || c.bump());
            });
        });

        let result = s.run();
        assert_eq!(result.passed, 3);
        // Outer before ran first and saw nothing; b's before saw a's test;
        // c's before saw the running total after its earlier sibling.
        assert_eq!(*observed.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn before_failure_abandons_the_group_but_not_cleanup_or_siblings() {
        let bodies = Counter::new();
        let cleanup = Counter::new();

        let mut s = quiet();
        s.describe("bad", |s| {
            s.before(|| -> () {
                panic!("setup failed");
            });
            let c = bodies.clone();
            s.test("not run", move || c.bump());
            s.describe("child", |s| {
                let c = bodies.clone();
                s.test("nested not run", move || c.bump());
            });
            let c = cleanup.clone();
            s.after(move || c.bump());
        });
        s.describe("good", |s| {
            let c = bodies.clone();
            s.test("runs", move || c.bump());
        });

        let result = s.run();
        assert_eq!(bodies.get(), 1);
        assert_eq!(cleanup.get(), 1);
        assert_eq!((result.passed, result.failed, result.skipped), (1, 0, 0));
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "bad before hook");
        assert_eq!(result.failures[0].fault.message, "setup failed");
    }

    #[test]
    fn hook_failure_is_not_counted_as_failed_test() {
        let mut s = quiet();
        s.describe("g", |s| {
            s.after(|| -> () {
                panic!("teardown failed");
            });
            s.test("t", || {});
        });

        let result = s.run();
        assert_eq!((result.passed, result.failed, result.skipped), (1, 0, 0));
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "g after hook");
        assert!(!result.success());
    }

    #[test]
    fn after_hooks_are_independent_cleanup_steps() {
        let cleanup = Counter::new();

        let mut s = quiet();
        s.describe("g", |s| {
            s.test("t", || {});
            s.after(|| -> () {
                panic!("first teardown");
            });
            let c = cleanup.clone();
            s.after(move || c.bump());
        });

        let result = s.run();
        assert_eq!(cleanup.get(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "g after hook");
    }

    #[test]
    fn callback_hooks_settle_through_done() {
        let mut s = quiet();
        s.describe("g", |s| {
            s.before_cb(|done| done.success());
            s.test("t", || {});
            s.after_cb(|done| done.error("cleanup broke"));
        });

        let result = s.run();
        assert_eq!((result.passed, result.failed), (1, 0));
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "g after hook");
        assert_eq!(result.failures[0].fault.message, "cleanup broke");
    }

    #[test]
    fn hook_timeouts_use_the_configured_bound() {
        let mut s = quiet();
        s.describe("g", |s| {
            s.before_cb(|_done| {}).timeout(30);
            s.test("t", || {});
        });

        let result = s.run();
        assert_eq!((result.passed, result.failed, result.skipped), (0, 0, 0));
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "g before hook");
        assert!(result.failures[0].fault.message.contains("30ms"));
    }

    #[test]
    fn skipped_groups_mark_descendants_without_running_hooks() {
        let bodies = Counter::new();
        let hooks = Counter::new();

        let mut s = quiet();
        s.skip().describe("g", |s| {
            let c = hooks.clone();
            s.before(move || c.bump());
            let c = bodies.clone();
            s.test("a", move || c.bump());
            s.describe("h", |s| {
                let c = bodies.clone();
                s.test("b", move || c.bump());
            });
            let c = hooks.clone();
            s.after(move || c.bump());
        });

        let result = s.run();
        assert_eq!((result.passed, result.failed, result.skipped), (0, 0, 2));
        assert_eq!(bodies.get(), 0);
        assert_eq!(hooks.get(), 0);
    }

    #[test]
    fn only_exclusion_is_silent_and_uncounted() {
        let bodies = Counter::new();

        let mut s = quiet();
        let c = bodies.clone();
        s.test("plain", move || c.bump());
        let c = bodies.clone();
        s.only().test("exclusive", move || c.bump());
        s.describe("outside", |s| {
            let c = bodies.clone();
            s.test("unrelated", move || c.bump());
        });

        let result = s.run();
        assert_eq!((result.passed, result.failed, result.skipped), (1, 0, 0));
        assert_eq!(bodies.get(), 1);
    }

    #[test]
    fn skip_marked_tests_inside_the_exclusive_scope_stay_visible() {
        let mut s = quiet();
        s.only().describe("picked", |s| {
            s.test("runs", || {});
            s.skip().test("pending", || -> () {
                panic!("must not be called");
            });
        });
        s.test("outside", || {});

        let result = s.run();
        assert_eq!((result.passed, result.failed, result.skipped), (1, 0, 1));
    }
}
