use std::time::Duration;

use crate::chart::Renderer;
use crate::probe::{CommandResult, Probe, ProbeError};


/// One-shot probe that reports its captured output verbatim. Covers the
/// listing tools (lsof, netstat, pmap, strace) whose value is the raw text.
#[derive(Debug, Clone)]
pub struct RawOutputProbe {
    title: String,
    command: String,
    timeout: Duration,
}


impl RawOutputProbe {
    pub fn new(title: String, command: String, timeout: Duration) -> RawOutputProbe {
        return RawOutputProbe {
            title,
            command,
            timeout,
        };
    }
}


impl Probe for RawOutputProbe {
    fn title(&self) -> &str {
        &self.title
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn report(&self, result: &CommandResult, _renderer: &Renderer) -> Result<(), ProbeError> {
        println!("{}", result.text.trim_end());
        return Ok(());
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn report_accepts_any_output() {
        let probe = RawOutputProbe::new(
            String::from("(lsof) Files opened by the target"),
            String::from("lsof -n -p 42"),
            Duration::from_secs(10),
        );
        let result = CommandResult {
            text: String::from("COMMAND PID USER\n"),
            timed_out: false,
        };

        let renderer = Renderer::new(Path::new("data"));

        assert!(probe.report(&result, &renderer).is_ok());
        assert_eq!(probe.title(), "(lsof) Files opened by the target");
        assert_eq!(probe.command(), "lsof -n -p 42");
    }
}
