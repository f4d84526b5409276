use std::time::Duration;

use crate::chart::Renderer;
use crate::probe::{CommandResult, ProbeError};


/// A diagnostic probe: a shell command bound to a PID at construction,
/// a timeout budget, and a parse-and-report step consuming the captured
/// output exactly once.
pub trait Probe {
    fn title(&self) -> &str;

    /// The exact shell command, PID already substituted.
    fn command(&self) -> &str;

    fn timeout(&self) -> Duration;

    /// Parses the captured output and emits the report: printed text,
    /// a chart artifact through the renderer, or both.
    fn report(&self, result: &CommandResult, renderer: &Renderer) -> Result<(), ProbeError>;
}
