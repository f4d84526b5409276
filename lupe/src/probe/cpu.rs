use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chart::{Renderer, Series};
use crate::probe::{CommandResult, Probe, ProbeError, Sampling};


const THREAD_LIST_TIMEOUT: Duration = Duration::from_secs(10);


/// One-shot thread inventory via `ps -T`.
#[derive(Debug, Clone)]
pub struct ThreadListProbe {
    title: String,
    command: String,
}


#[derive(Debug, Clone, PartialEq)]
pub struct ThreadListing {
    pub tids: Vec<i32>,
    pub raw: String,
}


impl ThreadListProbe {
    pub fn new(pid: u32) -> ThreadListProbe {
        return ThreadListProbe {
            title: String::from("(ps) Threads spawned by the target"),
            command: format!("ps -p {} -T -o pid,tid,psr,pcpu", pid),
        };
    }

    /// Skips the header row; an empty listing is a valid zero-thread result.
    pub fn parse(raw: &str) -> Result<ThreadListing, ProbeError> {
        let mut tids = Vec::new();

        for line in raw.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let tid_field = match line.split_whitespace().nth(1) {
                Some(tid_field) => tid_field,
                None => {
                    return Err(ProbeError::parse(
                        format!("thread row has no tid column: '{}'", line),
                        raw,
                    ));
                }
            };

            let tid = tid_field.parse::<i32>().map_err(|_| {
                ProbeError::parse(format!("invalid tid '{}'", tid_field), raw)
            })?;
            tids.push(tid);
        }

        return Ok(ThreadListing {
            tids,
            raw: raw.to_string(),
        });
    }
}


impl Probe for ThreadListProbe {
    fn title(&self) -> &str {
        &self.title
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn timeout(&self) -> Duration {
        THREAD_LIST_TIMEOUT
    }

    fn report(&self, result: &CommandResult, _renderer: &Renderer) -> Result<(), ProbeError> {
        let listing = Self::parse(&result.text)?;

        let tids: Vec<String> = listing.tids.iter().map(|tid| tid.to_string()).collect();
        println!("Thread count: {}", listing.tids.len());
        println!("Thread ids: {}", tids.join(" "));
        println!("{}", listing.raw.trim_end());
        return Ok(());
    }
}


/// One-shot flame-graph capture: `perf record` over a fixed window piped
/// through the FlameGraph scripts into an SVG artifact.
#[derive(Debug, Clone)]
pub struct FlameGraphProbe {
    title: String,
    command: String,
    timeout: Duration,
    data_file: PathBuf,
    svg_file: PathBuf,
}


impl FlameGraphProbe {
    pub fn new(pid: u32, data_dir: &Path, scripts_dir: &str, seconds: u64) -> FlameGraphProbe {
        let data_file = data_dir.join("perf.data");
        let svg_file = data_dir.join("perf.svg");

        let command = format!(
            "perf record -o {data} -p {pid} -F 99 -a -g -- sleep {seconds}; \
             perf script -i {data} | {scripts}/stackcollapse-perf.pl | {scripts}/flamegraph.pl > {svg}",
            data = data_file.display(),
            pid = pid,
            seconds = seconds,
            scripts = scripts_dir,
            svg = svg_file.display(),
        );

        return FlameGraphProbe {
            title: String::from("(perf) CPU flame graph of the target"),
            command,
            timeout: Duration::from_secs(seconds + 5),
            data_file,
            svg_file,
        };
    }
}


impl Probe for FlameGraphProbe {
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
        println!("{}", self.data_file.display());
        println!("{}", self.svg_file.display());
        return Ok(());
    }
}


/// Repeated per-core CPU load sampled through `ps -mo %cpu,psr`. The load
/// is an instantaneous gauge, so the full sample count is charted.
#[derive(Debug, Clone)]
pub struct CpuLoadProbe {
    title: String,
    command: String,
    sampling: Sampling,
    cores: usize,
}


#[derive(Debug, Clone, PartialEq)]
pub struct CpuLoadSeries {
    pub time: Vec<f64>,
    /// Per-core load rows, ordered by core id; each row has one value per
    /// sample.
    pub load: Vec<(u32, Vec<f64>)>,
}


impl CpuLoadProbe {
    pub fn new(pid: u32, cores: usize) -> CpuLoadProbe {
        let sampling = Sampling::new(Duration::from_secs(1), 60);
        let command = sampling.command(&format!("ps -mo %cpu,psr -p {} --no-header", pid));

        return CpuLoadProbe {
            title: String::from("(ps) CPU load of the target per core"),
            command,
            sampling,
            cores,
        };
    }

    /// Sums per-thread %cpu by core for every sample. Rows whose `psr`
    /// field is not a core number (the per-process aggregate row prints
    /// `-`) are skipped. The matrix is pre-seeded with every machine core
    /// so idle cores chart as flat zero lines.
    pub fn parse(&self, raw: &str) -> Result<CpuLoadSeries, ProbeError> {
        let chunks = self.sampling.split(raw)?;
        let count = self.sampling.count();

        let mut per_core: BTreeMap<u32, Vec<f64>> = (0..self.cores)
            .map(|core| (core as u32, vec![0.0; count]))
            .collect();

        for (index, chunk) in chunks.iter().enumerate() {
            for line in chunk.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let mut fields = line.split_whitespace();
                let (cpu_field, core_field) = match (fields.next(), fields.next()) {
                    (Some(cpu_field), Some(core_field)) => (cpu_field, core_field),
                    _ => {
                        return Err(ProbeError::parse(
                            format!("unexpected ps row: '{}'", line),
                            raw,
                        ));
                    }
                };

                let core = match core_field.parse::<u32>() {
                    Ok(core) => core,
                    Err(_) => continue,
                };
                let cpu = cpu_field.parse::<f64>().map_err(|_| {
                    ProbeError::parse(format!("invalid %cpu value '{}'", cpu_field), raw)
                })?;

                let samples = per_core.entry(core).or_insert_with(|| vec![0.0; count]);
                samples[index] += cpu;
            }
        }

        return Ok(CpuLoadSeries {
            time: self.sampling.time_axis(),
            load: per_core.into_iter().collect(),
        });
    }
}


impl Probe for CpuLoadProbe {
    fn title(&self) -> &str {
        &self.title
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn timeout(&self) -> Duration {
        self.sampling.timeout()
    }

    fn report(&self, result: &CommandResult, renderer: &Renderer) -> Result<(), ProbeError> {
        let series = self.parse(&result.text)?;

        let lines: Vec<Series> = series
            .load
            .iter()
            .map(|(core, points)| Series {
                label: core.to_string(),
                points: points.clone(),
            })
            .collect();

        let path = renderer
            .line_chart("cpu.png", &self.title, "Time, s", "CPU load, %", &series.time, &lines)
            .map_err(ProbeError::Render)?;

        println!("{}", path.display());
        return Ok(());
    }
}


/// Repeated running-thread counter: `ps -T -o state | grep -c R` sampled
/// twice a second. A gauge, charted without differencing.
#[derive(Debug, Clone)]
pub struct ThreadStateProbe {
    title: String,
    command: String,
    sampling: Sampling,
}


#[derive(Debug, Clone, PartialEq)]
pub struct ThreadStateSeries {
    pub time: Vec<f64>,
    pub running: Vec<u32>,
}


impl ThreadStateProbe {
    pub fn new(pid: u32) -> ThreadStateProbe {
        let sampling = Sampling::new(Duration::from_millis(500), 120);
        let command = sampling.command(&format!("ps -p {} -T -o state | grep -c R", pid));

        return ThreadStateProbe {
            title: String::from("(ps) Running threads of the target over time"),
            command,
            sampling,
        };
    }

    pub fn parse(&self, raw: &str) -> Result<ThreadStateSeries, ProbeError> {
        let chunks = self.sampling.split(raw)?;

        let mut running = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let value = chunk.trim();
            let count = value.parse::<u32>().map_err(|_| {
                ProbeError::parse(format!("invalid running-thread count '{}'", value), raw)
            })?;
            running.push(count);
        }

        return Ok(ThreadStateSeries {
            time: self.sampling.time_axis(),
            running,
        });
    }
}


impl Probe for ThreadStateProbe {
    fn title(&self) -> &str {
        &self.title
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn timeout(&self) -> Duration {
        self.sampling.timeout()
    }

    fn report(&self, result: &CommandResult, renderer: &Renderer) -> Result<(), ProbeError> {
        let series = self.parse(&result.text)?;

        let lines = vec![Series {
            label: String::from("running"),
            points: series.running.iter().map(|count| *count as f64).collect(),
        }];

        let path = renderer
            .line_chart("state.png", &self.title, "Time, s", "Running threads", &series.time, &lines)
            .map_err(ProbeError::Render)?;

        println!("{}", path.display());
        return Ok(());
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::sampling::DELIMITER;

    #[test]
    fn thread_list_parse_extracts_tids() {
        let raw = "    PID     TID PSR %CPU\n\
                   1234    1234   0  1.0\n\
                   1234    1250   1  0.5\n";

        let listing = ThreadListProbe::parse(raw).unwrap();

        assert_eq!(listing.tids, vec![1234, 1250]);
        assert_eq!(listing.raw, raw);
    }

    #[test]
    fn thread_list_parse_accepts_empty_listing() {
        let listing = ThreadListProbe::parse("").unwrap();

        assert!(listing.tids.is_empty());
    }

    #[test]
    fn thread_list_parse_rejects_non_numeric_tid() {
        let raw = "    PID     TID PSR %CPU\n1234    abc   0  1.0\n";

        assert!(matches!(ThreadListProbe::parse(raw), Err(ProbeError::Parse { .. })));
    }

    #[test]
    fn thread_list_parse_is_pure() {
        let raw = "    PID     TID PSR %CPU\n1234    1250   1  0.5\n";

        assert_eq!(ThreadListProbe::parse(raw).unwrap(), ThreadListProbe::parse(raw).unwrap());
    }

    fn build_cpu_probe(samples: usize) -> CpuLoadProbe {
        let sampling = Sampling::new(Duration::from_secs(1), samples);
        let command = sampling.command("ps -mo %cpu,psr -p 42 --no-header");

        return CpuLoadProbe {
            title: String::from("cpu"),
            command,
            sampling,
            cores: 2,
        };
    }

    #[test]
    fn cpu_load_parse_sums_threads_per_core() {
        let probe = build_cpu_probe(2);
        let raw = format!(
            "12.0 -\n5.0 0\n2.5 0\n1.0 1\n{d}\n3.0 1\n{d}\n",
            d = DELIMITER,
        );

        let series = probe.parse(&raw).unwrap();

        assert_eq!(series.time, vec![0.0, 1.0]);
        assert_eq!(series.load, vec![
            (0, vec![7.5, 0.0]),
            (1, vec![1.0, 3.0]),
        ]);
    }

    #[test]
    fn cpu_load_parse_rejects_non_numeric_load() {
        let probe = build_cpu_probe(1);
        let raw = format!("abc 0\n{}\n", DELIMITER);

        assert!(matches!(probe.parse(&raw), Err(ProbeError::Parse { .. })));
    }

    #[test]
    fn cpu_load_parse_fails_on_short_series() {
        let probe = build_cpu_probe(3);
        let raw = format!("1.0 0\n{}\n", DELIMITER);

        assert!(matches!(probe.parse(&raw), Err(ProbeError::Parse { .. })));
    }

    fn build_state_probe(samples: usize) -> ThreadStateProbe {
        let sampling = Sampling::new(Duration::from_millis(500), samples);
        let command = sampling.command("ps -p 42 -T -o state | grep -c R");

        return ThreadStateProbe {
            title: String::from("state"),
            command,
            sampling,
        };
    }

    #[test]
    fn thread_state_parse_reads_one_count_per_sample() {
        let probe = build_state_probe(3);
        let raw = format!("2\n{d}\n0\n{d}\n1\n{d}\n", d = DELIMITER);

        let series = probe.parse(&raw).unwrap();

        assert_eq!(series.running, vec![2, 0, 1]);
        assert_eq!(series.time, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn thread_state_parse_rejects_blank_sample() {
        let probe = build_state_probe(2);
        let raw = format!("2\n{d}\n{d}\n", d = DELIMITER);

        assert!(matches!(probe.parse(&raw), Err(ProbeError::Parse { .. })));
    }
}
