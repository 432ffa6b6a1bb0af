use std::time::{Duration, Instant};

use crate::{
    capture::PanicHookGuard,
    formatter::{ListFormatter, ReporterKind, SuiteFormatter},
    outcome::TestStatus,
    report::RunResult,
    resolve,
    scheduler::Executor,
    tree::{GroupId, Hook, HookKind, Pending, Test, Tree},
    unit::{Done, UnitFn, UnitReturn},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// A suite under construction, and the runner that executes it.
///
/// Registration builds a tree of groups, tests, and hooks:
///
/// ```
/// use suitest::{Suite, formatter::NoFormatter};
///
/// let mut s = Suite::new().with_formatter(NoFormatter);
/// s.describe("math", |s| {
///     s.before(|| {});
///     s.test("adds", || assert_eq!(1 + 1, 2));
///     s.skip().test("not yet", || {});
/// });
/// let result = s.run();
/// assert_eq!((result.passed, result.failed, result.skipped), (1, 0, 1));
/// ```
///
/// `skip()`, `only()`, and `timeout(ms)` called on the suite itself are
/// one-shot modifiers consumed by the *next* registration of any kind;
/// the handles returned by `test`/`before`/`after` annotate that specific
/// node after the fact.
pub struct Suite {
    tree: Tree,
    current: GroupId,
    pending: Pending,
    file_label: Option<String>,
    default_timeout: Duration,
    formatter: Box<dyn SuiteFormatter>,
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

impl Suite {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            current: Tree::ROOT,
            pending: Pending::default(),
            file_label: None,
            default_timeout: DEFAULT_TIMEOUT,
            formatter: Box::new(ListFormatter::default()),
        }
    }

    pub fn with_reporter(self, reporter: ReporterKind) -> Self {
        Self {
            formatter: reporter.into_formatter(),
            ..self
        }
    }

    pub fn with_formatter(self, formatter: impl SuiteFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            ..self
        }
    }

    /// Timeout for every unit without an own or inherited override.
    /// Defaults to 2000 ms.
    pub fn with_default_timeout(self, timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            ..self
        }
    }

    /// Clears the tree and all registration state for a fresh phase.
    pub fn reset(&mut self) {
        self.tree = Tree::new();
        self.current = Tree::ROOT;
        self.pending = Pending::default();
        self.file_label = None;
    }

    /// Marks the next registered item as skipped.
    pub fn skip(&mut self) -> &mut Self {
        self.pending.skip = true;
        self
    }

    /// Marks the next registered item as exclusive; once any item is, only
    /// exclusive subtrees run.
    pub fn only(&mut self) -> &mut Self {
        self.pending.only = true;
        self
    }

    /// Overrides the timeout of the next registered item.
    pub fn timeout(&mut self, ms: u64) -> &mut Self {
        self.pending.timeout = Some(Duration::from_millis(ms));
        self
    }

    /// Sets the label the file loader prepends to the full names of tests
    /// registered from now on.
    pub fn set_file_label(&mut self, label: impl Into<String>) {
        self.file_label = Some(label.into());
    }

    pub fn clear_file_label(&mut self) {
        self.file_label = None;
    }

    /// Opens a child group and runs `build` inside it. Construction is
    /// synchronous and depth-first; the cursor is restored on return, so
    /// builders may nest freely.
    pub fn describe(&mut self, name: impl Into<String>, build: impl FnOnce(&mut Suite)) {
        let pending = self.pending.take();
        let child = self.tree.add_group(self.current, name.into(), pending);
        let previous = self.current;
        self.current = child;
        build(self);
        self.current = previous;
    }

    /// Registers a test whose return settles it: `()`, `Result<(), E>`, or a
    /// [`Deferred`](crate::Deferred) to wait on.
    pub fn test<F, R>(&mut self, name: impl Into<String>, func: F) -> TestRef<'_>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<UnitReturn>,
    {
        self.push_test(name.into(), UnitFn::direct(func))
    }

    /// Registers a callback-style test; it settles when the [`Done`] handle
    /// is invoked, from whatever thread, at whatever time.
    pub fn test_cb<F>(&mut self, name: impl Into<String>, func: F) -> TestRef<'_>
    where
        F: Fn(Done) + Send + Sync + 'static,
    {
        self.push_test(name.into(), UnitFn::callback(func))
    }

    /// Registers a hook that runs before this group's tests and child groups.
    pub fn before<F, R>(&mut self, func: F) -> HookRef<'_>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<UnitReturn>,
    {
        self.push_hook(HookKind::Before, UnitFn::direct(func))
    }

    pub fn before_cb<F>(&mut self, func: F) -> HookRef<'_>
    where
        F: Fn(Done) + Send + Sync + 'static,
    {
        self.push_hook(HookKind::Before, UnitFn::callback(func))
    }

    /// Registers a hook that runs after this group's tests and child groups,
    /// even when a hook failure abandoned them.
    pub fn after<F, R>(&mut self, func: F) -> HookRef<'_>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<UnitReturn>,
    {
        self.push_hook(HookKind::After, UnitFn::direct(func))
    }

    pub fn after_cb<F>(&mut self, func: F) -> HookRef<'_>
    where
        F: Fn(Done) + Send + Sync + 'static,
    {
        self.push_hook(HookKind::After, UnitFn::callback(func))
    }

    fn push_test(&mut self, name: String, func: UnitFn) -> TestRef<'_> {
        let pending = self.pending.take();
        let full_name = self
            .tree
            .full_name(self.current, self.file_label.as_deref(), &name);

        let tests = &mut self.tree.group_mut(self.current).tests;
        tests.push(Test {
            name,
            full_name,
            func,
            raw_skip: pending.skip,
            raw_only: pending.only,
            raw_timeout: pending.timeout,
            status: TestStatus::Pending,
        });
        TestRef {
            test: tests.last_mut().expect("test was just pushed"),
        }
    }

    fn push_hook(&mut self, kind: HookKind, func: UnitFn) -> HookRef<'_> {
        // Skip and only have no meaning on a hook; a pending timeout sticks.
        let pending = self.pending.take();

        let group = self.tree.group_mut(self.current);
        let hooks = match kind {
            HookKind::Before => &mut group.before_hooks,
            HookKind::After => &mut group.after_hooks,
        };
        hooks.push(Hook {
            kind,
            func,
            raw_timeout: pending.timeout,
        });
        HookRef {
            hook: hooks.last_mut().expect("hook was just pushed"),
        }
    }

    /// Executes the resolved tree and returns the aggregated result. The
    /// only blocking operation in the public contract; the tree itself stays
    /// registered, `reset()` discards it.
    pub fn run(&mut self) -> RunResult {
        let resolution = resolve::resolve(&self.tree, self.default_timeout);
        for group in &mut self.tree.groups {
            for test in &mut group.tests {
                test.status = TestStatus::Pending;
            }
        }

        let _hook_guard = PanicHookGuard::install();
        let start = Instant::now();

        let mut executor = Executor {
            tree: &mut self.tree,
            resolution: &resolution,
            formatter: self.formatter.as_mut(),
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            fmt_errors: Vec::new(),
        };
        executor.fmt_run_start();
        executor.run_group(Tree::ROOT, 0);

        let duration = start.elapsed();
        let Executor {
            passed,
            failed,
            skipped,
            failures,
            mut fmt_errors,
            ..
        } = executor;

        let mut result = RunResult {
            passed,
            failed,
            skipped,
            duration,
            failures,
            fmt_errors: Vec::new(),
        };
        if let Err(err) = self.formatter.fmt_run_outcomes(&result) {
            fmt_errors.push(err);
        }
        result.fmt_errors = fmt_errors;
        result
    }
}

/// Handle to a just registered test for post-hoc annotation.
pub struct TestRef<'s> {
    test: &'s mut Test,
}

impl TestRef<'_> {
    pub fn skip(self) -> Self {
        self.test.raw_skip = true;
        self
    }

    pub fn only(self) -> Self {
        self.test.raw_only = true;
        self
    }

    pub fn timeout(self, ms: u64) -> Self {
        self.test.raw_timeout = Some(Duration::from_millis(ms));
        self
    }
}

/// Handle to a just registered hook.
pub struct HookRef<'s> {
    hook: &'s mut Hook,
}

impl HookRef<'_> {
    pub fn timeout(self, ms: u64) -> Self {
        self.hook.raw_timeout = Some(Duration::from_millis(ms));
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::*;

    fn full_names(suite: &Suite) -> Vec<String> {
        suite
            .tree
            .groups
            .iter()
            .flat_map(|group| group.tests.iter().map(|test| test.full_name.clone()))
            .collect()
    }

    #[test]
    fn describe_prefixes_test_names() {
        let mut s = quiet();
        s.describe("something", |s| {
            s.test("blabla", || {});
        });

        assert_eq!(full_names(&s), vec!["something blabla"]);
    }

    #[test]
    fn nested_describes_stack_their_prefixes() {
        let mut s = quiet();
        s.describe("something", |s| {
            s.describe("else", |s| {
                s.test("blabla", || {});
            });
            s.test("after", || {});
        });

        assert_eq!(full_names(&s), vec!["something else blabla", "something after"]);
    }

    #[test]
    fn file_labels_prefix_with_a_colon() {
        let mut s = quiet();
        s.set_file_label("math.rs");
        s.test("adds", || {});
        s.describe("calc", |s| {
            s.test("multiplies", || {});
        });
        s.clear_file_label();
        s.test("unlabeled", || {});

        assert_eq!(
            full_names(&s),
            vec!["math.rs: adds", "unlabeled", "math.rs: calc multiplies"]
        );
    }

    #[test]
    fn pending_modifiers_attach_to_the_next_registration() {
        let mut s = quiet();
        s.skip().test("skipped", || {});
        s.test("plain", || {});
        s.timeout(10).describe("limited", |s| {
            s.test("inner", || {});
        });

        let root = s.tree.group(Tree::ROOT);
        assert!(root.tests[0].raw_skip);
        assert!(!root.tests[1].raw_skip);
        assert_eq!(root.tests[1].raw_timeout, None);

        let limited = &s.tree.groups[1];
        assert_eq!(limited.raw_timeout, Some(Duration::from_millis(10)));
        assert_eq!(limited.tests[0].raw_timeout, None);
    }

    #[test]
    fn handles_annotate_their_own_node() {
        let mut s = quiet();
        s.test("a", || {}).timeout(50).skip();
        s.test("b", || {}).only();
        s.before(|| {}).timeout(25);

        let root = s.tree.group(Tree::ROOT);
        assert_eq!(root.tests[0].raw_timeout, Some(Duration::from_millis(50)));
        assert!(root.tests[0].raw_skip);
        assert!(root.tests[1].raw_only);
        assert_eq!(root.before_hooks[0].raw_timeout, Some(Duration::from_millis(25)));
    }

    #[test]
    fn reset_discards_all_registrations() {
        let mut s = quiet();
        s.set_file_label("stale.rs");
        s.skip().describe("old", |s| {
            s.test("gone", || {});
        });

        s.reset();
        s.test("fresh", || {});

        assert_eq!(s.tree.groups.len(), 1);
        assert_eq!(full_names(&s), vec!["fresh"]);
        let result = s.run();
        assert_eq!((result.passed, result.failed, result.skipped), (1, 0, 0));
    }
}
