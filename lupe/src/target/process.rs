use std::process::{Child, Command, ExitStatus};
use std::sync::{Arc, Mutex};
use log::{debug, warn};


pub type ProcessRef = Arc<Mutex<Process>>;


/// The program under diagnosis. Stdio is inherited so its own output stays
/// visible alongside the probe reports.
#[derive(Debug)]
pub struct Process {
    executable: String,
    arguments: Vec<String>,
    child: Option<Box<Child>>,
}


impl Process {
    pub fn new(executable: String, arguments: Vec<String>) -> Process {
        return Process {
            executable,
            arguments,
            child: None,
        };
    }

    pub fn new_ref(executable: String, arguments: Vec<String>) -> ProcessRef {
        return Arc::new(Mutex::new(Process::new(executable, arguments)));
    }

    pub fn get_pid(&self) -> Option<u32> {
        return match self.child {
            Some(ref child) => Some(child.as_ref().id()),
            None => None,
        };
    }

    /// Checks if the process is running.
    pub fn is_running(&mut self) -> bool {
        if self.get_pid().is_none() {
            return false;
        }

        if self.exit_code().is_some() {
            return false;
        }

        return true;
    }

    pub fn exit_code(&mut self) -> Option<ExitStatus> {
        return match self.child {
            Some(ref mut child) => {
                match child.try_wait() {
                    Ok(Some(exit_code)) => {
                        debug!("Process {} exited with code {}", self.executable, exit_code);
                        Some(exit_code)
                    }
                    Ok(None) | Err(_) => None,
                }
            }
            None => None,
        };
    }

    /// Starts the target process.
    pub fn start(&mut self) -> Result<u32, String> {
        if self.is_running() {
            warn!("Cannot start process {} because it is already running", self.executable);
            return Err(format!("Process {} is already running", self.executable));
        }

        let child = Command::new(&self.executable)
            .args(&self.arguments)
            .spawn();

        match child {
            Ok(child) => {
                let pid = child.id();
                debug!("Process {} was started (pid={})", self.executable, pid);
                self.child = Some(Box::new(child));
                Ok(pid)
            }
            Err(error) => {
                self.child = None;
                Err(format!("Process {} failed to start: {}", self.executable, error))
            }
        }
    }

    /// Kills the target process.
    pub fn stop(&mut self) -> Result<bool, String> {
        if !self.is_running() {
            warn!("Cannot stop process {} because it is NOT running", self.executable);
            return Ok(false);
        }

        match self.child {
            Some(ref mut child) => {
                match child.kill() {
                    Ok(_) => {
                        let _ = child.wait();
                        debug!("Process {} was stopped", self.executable);
                        self.child = None;
                        Ok(true)
                    }
                    Err(error) => {
                        Err(format!("Process {} failed to stop: {}", self.executable, error))
                    }
                }
            }
            None => {
                warn!("Cannot stop process {} because it is NOT running", self.executable);
                Ok(false)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn build_process() -> Process {
        return Process::new(String::from("sleep"), vec![String::from("5")]);
    }

    #[test]
    fn pid_is_none_before_start() {
        let process = build_process();

        assert_eq!(process.get_pid(), None);
    }

    #[test]
    fn start_assigns_a_pid() {
        let mut process = build_process();

        let pid = process.start().unwrap();

        assert_eq!(process.get_pid(), Some(pid));
        process.stop().unwrap();
    }

    #[test]
    fn is_running_tracks_lifecycle() {
        let mut process = build_process();

        assert_eq!(process.is_running(), false);
        process.start().unwrap();
        assert_eq!(process.is_running(), true);
        process.stop().unwrap();
        assert_eq!(process.is_running(), false);
    }

    #[test]
    fn cannot_start_twice() {
        let mut process = build_process();

        process.start().unwrap();
        assert!(process.start().is_err());
        process.stop().unwrap();
    }

    #[test]
    fn start_fails_for_missing_executable() {
        let mut process = Process::new(String::from("lupe-no-such-binary"), vec![]);

        assert!(process.start().is_err());
    }
}
