use log::{debug, error};

use crate::chart::Renderer;
use crate::probe::{command, CommandHandle, Probe, ProbeError, RegistryRef};


/// A probe bound to its in-flight command. Owned by the scheduler until
/// the result is consumed.
struct RunningProbe {
    probe: Box<dyn Probe>,
    handle: Result<CommandHandle, ProbeError>,
}


/// Launches every probe's command up front, then collects and reports in
/// descending-timeout order. Launching the longest-running commands first
/// keeps total wall-clock time near max(timeout) instead of sum(timeout);
/// the fixed collection order keeps reports deterministic.
pub struct Scheduler {
    registry: RegistryRef,
}


impl Scheduler {
    pub fn new(registry: RegistryRef) -> Scheduler {
        return Scheduler { registry };
    }

    pub fn run(&self, mut probes: Vec<Box<dyn Probe>>, renderer: &Renderer) {
        probes.sort_by(|a, b| b.timeout().cmp(&a.timeout()));

        let mut running: Vec<RunningProbe> = Vec::with_capacity(probes.len());
        for probe in probes {
            let handle = command::launch(probe.command(), probe.timeout());
            if let Ok(ref handle) = handle {
                self.register(handle.pid());
            }
            running.push(RunningProbe { probe, handle });
        }

        for entry in running {
            print_banner(entry.probe.as_ref());

            match entry.handle {
                Ok(handle) => {
                    debug!(
                        "Collecting {} (timeout {})",
                        entry.probe.title(),
                        humantime::format_duration(entry.probe.timeout()),
                    );

                    let pid = handle.pid();
                    let result = handle.collect();
                    self.deregister(pid);

                    if let Err(probe_error) = entry.probe.report(&result, renderer) {
                        print_failure(&probe_error);
                    }
                }
                Err(probe_error) => {
                    print_failure(&probe_error);
                }
            }

            print_separator();
        }
    }

    fn register(&self, pid: u32) {
        match self.registry.lock() {
            Ok(mut registry) => registry.register(pid),
            Err(lock_error) => error!("Error acquiring registry lock: {}", lock_error),
        }
    }

    fn deregister(&self, pid: u32) {
        match self.registry.lock() {
            Ok(mut registry) => registry.deregister(pid),
            Err(lock_error) => error!("Error acquiring registry lock: {}", lock_error),
        }
    }
}


fn print_banner(probe: &dyn Probe) {
    println!();
    println!("{}", probe.title());
    println!("{}", probe.command());
}


fn print_failure(probe_error: &ProbeError) {
    println!("Probe failed: {}", probe_error);
    if let ProbeError::Parse { raw, .. } = probe_error {
        println!("Raw output:");
        println!("{}", raw.trim_end());
    }
}


fn print_separator() {
    println!("{}", "=".repeat(50));
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use crate::probe::{CommandResult, Registry};

    struct TestProbe {
        title: String,
        timeout: Duration,
        collected: Arc<Mutex<Vec<String>>>,
    }

    impl Probe for TestProbe {
        fn title(&self) -> &str {
            &self.title
        }

        fn command(&self) -> &str {
            "sleep 1"
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }

        fn report(&self, _result: &CommandResult, _renderer: &Renderer) -> Result<(), ProbeError> {
            self.collected.lock().unwrap().push(self.title.clone());
            return Ok(());
        }
    }

    fn build_probe(title: &str, timeout_s: u64, collected: &Arc<Mutex<Vec<String>>>) -> Box<dyn Probe> {
        return Box::new(TestProbe {
            title: String::from(title),
            timeout: Duration::from_secs(timeout_s),
            collected: collected.clone(),
        });
    }

    #[test]
    fn run_collects_in_descending_timeout_order_with_overlap() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let probes = vec![
            build_probe("five", 5, &collected),
            build_probe("twenty", 20, &collected),
            build_probe("one", 1, &collected),
        ];
        let renderer = Renderer::new(Path::new("data"));
        let scheduler = Scheduler::new(Registry::new_ref());

        let started = Instant::now();
        scheduler.run(probes, &renderer);

        // three one-second sleeps overlap, so the run is far below 3 s
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(*collected.lock().unwrap(), vec!["twenty", "five", "one"]);
    }

    #[test]
    fn run_continues_after_a_failing_probe() {
        struct FailingProbe;

        impl Probe for FailingProbe {
            fn title(&self) -> &str {
                "failing"
            }

            fn command(&self) -> &str {
                "true"
            }

            fn timeout(&self) -> Duration {
                Duration::from_secs(5)
            }

            fn report(&self, result: &CommandResult, _renderer: &Renderer) -> Result<(), ProbeError> {
                return Err(ProbeError::parse(String::from("bad shape"), &result.text));
            }
        }

        let collected = Arc::new(Mutex::new(Vec::new()));
        let probes: Vec<Box<dyn Probe>> = vec![
            Box::new(FailingProbe),
            build_probe("after", 1, &collected),
        ];
        let renderer = Renderer::new(Path::new("data"));
        let scheduler = Scheduler::new(Registry::new_ref());

        scheduler.run(probes, &renderer);

        assert_eq!(*collected.lock().unwrap(), vec!["after"]);
    }

    #[test]
    fn run_deregisters_collected_probes() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::new_ref();
        let scheduler = Scheduler::new(registry.clone());
        let renderer = Renderer::new(Path::new("data"));

        scheduler.run(vec![build_probe("only", 2, &collected)], &renderer);

        assert!(registry.lock().unwrap().pids().is_empty());
    }
}
