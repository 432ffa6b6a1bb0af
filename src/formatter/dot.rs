use std::io;

use crate::{
    formatter::{
        SuiteFormatter, TestLine,
        color::{ColorSetting, SupportsColor, colors::*},
        common,
    },
    outcome::TestStatus,
    report::RunResult,
};

/// Renders one dot per test; color carries the outcome.
#[derive(Debug)]
pub struct DotFormatter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
}

impl Default for DotFormatter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: ColorSetting::default(),
        }
    }
}

impl<W: io::Write> DotFormatter<W> {
    pub fn with_target<WithTarget: io::Write>(self, target: WithTarget) -> DotFormatter<WithTarget> {
        DotFormatter {
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

impl<W: io::Write + SupportsColor> DotFormatter<W> {
    /// Return whether this formatter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        match self.color_setting {
            ColorSetting::Automatic => self.target.supports_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }
}

impl<W: io::Write + SupportsColor> SuiteFormatter for DotFormatter<W> {
    fn fmt_run_start(&mut self) -> io::Result<()> {
        writeln!(self.target)?;
        writeln!(self.target)
    }

    fn fmt_test_outcome(&mut self, test: TestLine<'_>) -> io::Result<()> {
        match (test.status, self.use_color()) {
            (TestStatus::Skipped, true) => write!(self.target, "{BLUE}.{RESET}")?,
            (TestStatus::Failed(_), true) => write!(self.target, "{RED}.{RESET}")?,
            (_, true) => write!(self.target, "{GREEN}.{RESET}")?,
            (_, false) => write!(self.target, ".")?,
        }
        self.target.flush()
    }

    fn fmt_run_outcomes(&mut self, result: &RunResult) -> io::Result<()> {
        let use_color = self.use_color();
        common::write_summary(&mut self.target, use_color, result)
    }
}
