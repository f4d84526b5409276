use std::sync::{Arc, Mutex};
use log::debug;

use crate::probe::command;


pub type RegistryRef = Arc<Mutex<Registry>>;


/// Process-group ids of all in-flight probe commands. The interrupt
/// handler sweeps these so no probe subprocess outlives the run.
#[derive(Debug, Default)]
pub struct Registry {
    pids: Vec<u32>,
}


impl Registry {
    pub fn new_ref() -> RegistryRef {
        return Arc::new(Mutex::new(Registry::default()));
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.push(pid);
    }

    pub fn deregister(&mut self, pid: u32) {
        self.pids.retain(|registered| *registered != pid);
    }

    pub fn terminate_all(&mut self) {
        for pid in self.pids.drain(..) {
            debug!("Terminating probe process group {}", pid);
            command::terminate_group(pid);
        }
    }

    pub fn pids(&self) -> Vec<u32> {
        self.pids.clone()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_deregister_track_pids() {
        let mut registry = Registry::default();

        registry.register(10);
        registry.register(20);
        registry.deregister(10);

        assert_eq!(registry.pids(), vec![20]);
    }

    #[test]
    fn terminate_all_empties_the_registry() {
        let mut registry = Registry::default();

        // above the largest possible Linux pid, so the sweep hits nothing
        registry.register(400_000_000);
        registry.terminate_all();

        assert!(registry.pids().is_empty());
    }
}
