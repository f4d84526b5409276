use std::error::Error;
use std::fmt;


/// Per-probe failure taxonomy. A timeout is not an error: the partial
/// output is carried by `CommandResult` and parsed as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// The underlying command could not be spawned.
    Launch(String),
    /// The captured output did not match the expected shape.
    /// The raw output is kept for diagnosis.
    Parse { reason: String, raw: String },
    /// A chart artifact could not be persisted.
    Render(String),
}


impl ProbeError {
    pub fn parse(reason: String, raw: &str) -> ProbeError {
        return ProbeError::Parse {
            reason,
            raw: raw.to_string(),
        };
    }
}


impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProbeError::Launch(message) => write!(f, "Failed to launch command: {}", message),
            ProbeError::Parse { reason, .. } => write!(f, "Failed to parse output: {}", reason),
            ProbeError::Render(message) => write!(f, "Failed to render chart: {}", message),
        }
    }
}


impl Error for ProbeError {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_raw_output() {
        let error = ProbeError::parse(String::from("bad field"), "raw text");

        match error {
            ProbeError::Parse { reason, raw } => {
                assert_eq!(reason, "bad field");
                assert_eq!(raw, "raw text");
            }
            _ => panic!("expected parse error"),
        }
    }

    #[test]
    fn display_names_the_failure_kind() {
        let error = ProbeError::Launch(String::from("no such file"));

        assert_eq!(format!("{}", error), "Failed to launch command: no such file");
    }
}
