//! Rendering shared by the list and dot formatters.

use std::io;

use crate::{formatter::color::colors::*, report::RunResult};

/// Writes the closing summary block: the three counters, then the numbered
/// failure list with full path names, messages, and traces.
pub(crate) fn write_summary(
    target: &mut dyn io::Write,
    use_color: bool,
    result: &RunResult,
) -> io::Result<()> {
    writeln!(target)?;
    writeln!(target)?;

    let ms = result.duration.as_millis();
    if result.passed > 0 {
        match use_color {
            true => writeln!(target, "  {GREEN}{} passing {GRAY}({ms}ms){RESET}", result.passed)?,
            false => writeln!(target, "  {} passing ({ms}ms)", result.passed)?,
        }
    }
    if result.failed > 0 {
        match use_color {
            true => writeln!(target, "  {RED}{} failing{RESET}", result.failed)?,
            false => writeln!(target, "  {} failing", result.failed)?,
        }
    }
    if result.skipped > 0 {
        match use_color {
            true => writeln!(target, "  {BLUE}{} pending{RESET}", result.skipped)?,
            false => writeln!(target, "  {} pending", result.skipped)?,
        }
    }
    writeln!(target)?;

    for (idx, failure) in result.failures.iter().enumerate() {
        writeln!(target, "  {}) {}:", idx + 1, failure.name)?;
        writeln!(target)?;
        match use_color {
            true => {
                writeln!(target, "    {RED}{}{RESET}", failure.fault.message)?;
                writeln!(target, "    {GRAY}{}{RESET}", failure.fault.trace)?;
            }
            false => {
                writeln!(target, "    {}", failure.fault.message)?;
                writeln!(target, "    {}", failure.fault.trace)?;
            }
        }
        writeln!(target)?;
    }

    Ok(())
}
