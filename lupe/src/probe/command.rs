use std::io::Read;
use std::process::{Command, Child, Stdio};
use std::os::unix::process::CommandExt;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use log::{debug, warn};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use process_control::{ChildExt, Control};

use crate::probe::ProbeError;


/// Raw captured text plus whether it came from a timeout-killed process.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub text: String,
    pub timed_out: bool,
}


/// An in-flight shell command. Owns the child exclusively until collection.
#[derive(Debug)]
pub struct CommandHandle {
    command: String,
    timeout: Duration,
    child: Child,
    stdout_reader: JoinHandle<String>,
    stderr_reader: JoinHandle<String>,
}


/// Starts `command` through the shell in its own process group and returns
/// immediately. Stdout and stderr are drained by background threads so that
/// partial output survives a timeout kill.
pub fn launch(command: &str, timeout: Duration) -> Result<CommandHandle, ProbeError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|error| ProbeError::Launch(format!("`{}`: {}", command, error)))?;

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    debug!("Launched `{}` (pid={})", command, child.id());

    return Ok(CommandHandle {
        command: command.to_string(),
        timeout,
        child,
        stdout_reader,
        stderr_reader,
    });
}


/// Sends SIGKILL to a whole process group. Errors are ignored: the group
/// may already be gone.
pub fn terminate_group(pid: u32) {
    let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
}


fn spawn_reader(pipe: Option<impl Read + Send + 'static>) -> JoinHandle<String> {
    return thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    });
}


impl CommandHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the process exits or the timeout elapses. On timeout the
    /// process group is killed and whatever output was buffered is returned.
    /// If stdout is empty or all-whitespace, stderr is returned instead, so
    /// tools that report on stderr still surface something useful.
    pub fn collect(mut self) -> CommandResult {
        let wait_result = self.child
            .controlled()
            .time_limit(self.timeout)
            .terminate_for_timeout()
            .wait();

        let timed_out = match wait_result {
            Ok(Some(exit_status)) => {
                debug!("Command `{}` exited with status {}", self.command, exit_status);
                false
            }
            Ok(None) => {
                warn!("Command `{}` exceeded its timeout of {:?} and was killed", self.command, self.timeout);
                true
            }
            Err(error) => {
                warn!("Failed to wait for command `{}`: {}", self.command, error);
                true
            }
        };

        if timed_out {
            terminate_group(self.child.id());
        }

        let stdout = self.stdout_reader.join().unwrap_or_default();
        let stderr = self.stderr_reader.join().unwrap_or_default();

        let text = if stdout.trim().is_empty() { stderr } else { stdout };

        return CommandResult { text, timed_out };
    }
}
