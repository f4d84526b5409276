use std::path::Path;
use std::time::Duration;

use crate::config::Flamegraph;
use crate::probe::{
    CpuLoadProbe, FileEventsProbe, FlameGraphProbe, IoLoadProbe, NetworkLoadProbe, Probe,
    RawOutputProbe, ThreadListProbe, ThreadStateProbe,
};


const LISTING_TIMEOUT: Duration = Duration::from_secs(10);
const PAYLOAD_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);


/// The full diagnostic battery for one target PID. The set is fixed; every
/// probe gets its final command and timeout here, once.
pub fn build_battery(
    pid: u32,
    data_dir: &Path,
    flamegraph: &Flamegraph,
    cores: usize,
) -> Vec<Box<dyn Probe>> {
    return vec![
        Box::new(ThreadListProbe::new(pid)),
        Box::new(RawOutputProbe::new(
            String::from("(lsof) Files opened by the target"),
            format!("lsof -n -p {}", pid),
            LISTING_TIMEOUT,
        )),
        Box::new(FileEventsProbe::new(pid)),
        Box::new(RawOutputProbe::new(
            String::from("(lsof) Network connections of the target"),
            format!("lsof -i -a -p {}", pid),
            LISTING_TIMEOUT,
        )),
        Box::new(RawOutputProbe::new(
            String::from("(netstat) Listening sockets of the target"),
            format!("netstat -nlp | grep {}", pid),
            LISTING_TIMEOUT,
        )),
        Box::new(RawOutputProbe::new(
            String::from("(pmap) Memory map of the target"),
            format!("pmap -d {}", pid),
            LISTING_TIMEOUT,
        )),
        Box::new(RawOutputProbe::new(
            String::from("(strace) Network payloads sent and received"),
            format!("strace -p {} -f -e trace=sendto,recvfrom -s 10000", pid),
            PAYLOAD_CAPTURE_TIMEOUT,
        )),
        Box::new(FlameGraphProbe::new(
            pid,
            data_dir,
            &flamegraph.get_scripts_dir(),
            flamegraph.get_seconds(),
        )),
        Box::new(CpuLoadProbe::new(pid, cores)),
        Box::new(IoLoadProbe::new(pid)),
        Box::new(NetworkLoadProbe::new(pid)),
        Box::new(ThreadStateProbe::new(pid)),
    ];
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_contains_the_full_probe_set() {
        let flamegraph = Flamegraph::default();

        let probes = build_battery(42, Path::new("data"), &flamegraph, 4);

        assert_eq!(probes.len(), 12);
    }

    #[test]
    fn battery_commands_carry_the_pid() {
        let flamegraph = Flamegraph::default();

        let probes = build_battery(4242, Path::new("data"), &flamegraph, 4);

        for probe in &probes {
            assert!(probe.command().contains("4242"), "missing pid: {}", probe.command());
        }
    }
}
