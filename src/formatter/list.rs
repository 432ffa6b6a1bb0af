use std::io;

use crate::{
    formatter::{
        GroupLine, SuiteFormatter, TestLine,
        color::{ColorSetting, SupportsColor, colors::*},
        common,
    },
    outcome::TestStatus,
    report::RunResult,
};

/// Renders an indented line per group and test: a check mark for passes, the
/// failure-list number for failures, a dash for skips.
#[derive(Debug)]
pub struct ListFormatter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
}

impl Default for ListFormatter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: ColorSetting::default(),
        }
    }
}

impl<W: io::Write> ListFormatter<W> {
    pub fn with_target<WithTarget: io::Write>(self, target: WithTarget) -> ListFormatter<WithTarget> {
        ListFormatter {
            target,
            color_setting: self.color_setting,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        Self {
            color_setting: color_setting.into(),
            ..self
        }
    }
}

impl<W: io::Write + SupportsColor> ListFormatter<W> {
    /// Return whether this formatter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        match self.color_setting {
            ColorSetting::Automatic => self.target.supports_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }
}

impl<W: io::Write + SupportsColor> SuiteFormatter for ListFormatter<W> {
    fn fmt_run_start(&mut self) -> io::Result<()> {
        writeln!(self.target)?;
        writeln!(self.target)
    }

    fn fmt_group_start(&mut self, group: GroupLine<'_>) -> io::Result<()> {
        let indent = group.depth * 2;
        writeln!(self.target, "{:indent$}{}", "", group.name)
    }

    fn fmt_test_outcome(&mut self, test: TestLine<'_>) -> io::Result<()> {
        let indent = test.depth * 2 + 4;
        match (test.status, self.use_color()) {
            (TestStatus::Skipped, true) => {
                writeln!(self.target, "{:indent$}{BLUE}- {}{RESET}", "", test.name)
            }
            (TestStatus::Skipped, false) => writeln!(self.target, "{:indent$}- {}", "", test.name),
            (TestStatus::Failed(_), true) => writeln!(
                self.target,
                "{:indent$}{RED}{}) {}{RESET}",
                "",
                test.failure_index.unwrap_or(0),
                test.name
            ),
            (TestStatus::Failed(_), false) => writeln!(
                self.target,
                "{:indent$}{}) {}",
                "",
                test.failure_index.unwrap_or(0),
                test.name
            ),
            (_, true) => writeln!(self.target, "{:indent$}{GREEN}\u{221a}{GRAY} {}{RESET}", "", test.name),
            (_, false) => writeln!(self.target, "{:indent$}\u{221a} {}", "", test.name),
        }
    }

    fn fmt_run_outcomes(&mut self, result: &RunResult) -> io::Result<()> {
        let use_color = self.use_color();
        common::write_summary(&mut self.target, use_color, result)
    }
}
