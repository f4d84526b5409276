use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tabled::{builder::Builder, settings::Style};

use crate::chart::{Panel, Renderer, Series};
use crate::probe::{series, CommandResult, Probe, ProbeError, Sampling};


const FATRACE_SECONDS: u64 = 10;
const FATRACE_MARGIN: Duration = Duration::from_secs(2);


/// One-shot file-event capture: `fatrace` filtered to the target PID,
/// aggregated into a path -> event-types table.
#[derive(Debug, Clone)]
pub struct FileEventsProbe {
    title: String,
    command: String,
    timeout: Duration,
}


#[derive(Debug, Clone, PartialEq)]
pub struct FileEventTable {
    pub raw: String,
    pub events: BTreeMap<String, BTreeSet<String>>,
}


impl FileEventsProbe {
    pub fn new(pid: u32) -> FileEventsProbe {
        return FileEventsProbe {
            title: String::from("(fatrace) Files touched by the target"),
            command: format!("fatrace -s {} | grep '({})'", FATRACE_SECONDS, pid),
            timeout: Duration::from_secs(FATRACE_SECONDS) + FATRACE_MARGIN,
        };
    }

    /// Rows look like `name(pid): EVENT /path`. An empty capture is a
    /// valid result: quiet processes touch no files.
    pub fn parse(raw: &str) -> Result<FileEventTable, ProbeError> {
        let mut events: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (event, path) = match (fields.next(), fields.next(), fields.next()) {
                (Some(_process), Some(event), Some(path)) => (event, path),
                _ => {
                    return Err(ProbeError::parse(
                        format!("unexpected fatrace row: '{}'", line),
                        raw,
                    ));
                }
            };

            events
                .entry(path.to_string())
                .or_default()
                .insert(event.to_string());
        }

        return Ok(FileEventTable {
            raw: raw.to_string(),
            events,
        });
    }
}


impl Probe for FileEventsProbe {
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
        let table = Self::parse(&result.text)?;

        if table.events.is_empty() {
            println!("No file events captured");
            return Ok(());
        }

        let mut builder = Builder::new();
        builder.set_header(vec!["FILE", "EVENTS"]);
        for (path, event_types) in &table.events {
            let joined: Vec<&str> = event_types.iter().map(|event| event.as_str()).collect();
            builder.push_record([path.clone(), joined.join(", ")]);
        }

        let mut rendered = builder.build();
        rendered.with(Style::modern());
        println!("{}", rendered);
        return Ok(());
    }
}


/// Repeated I/O counters from `/proc/<pid>/io`. The counters are
/// cumulative, so the report charts their discrete-difference rates.
#[derive(Debug, Clone)]
pub struct IoLoadProbe {
    title: String,
    command: String,
    sampling: Sampling,
}


#[derive(Debug, Clone, PartialEq)]
pub struct IoLoadSeries {
    pub time: Vec<f64>,
    pub char_reads: Vec<u64>,
    pub char_writes: Vec<u64>,
    pub byte_reads: Vec<u64>,
    pub byte_writes: Vec<u64>,
}


impl IoLoadProbe {
    pub fn new(pid: u32) -> IoLoadProbe {
        let sampling = Sampling::new(Duration::from_secs(1), 60);
        let command = sampling.command(&format!("cat /proc/{}/io", pid));

        return IoLoadProbe {
            title: String::from("(proc/io) I/O subsystem load of the target"),
            command,
            sampling,
        };
    }

    pub fn parse(&self, raw: &str) -> Result<IoLoadSeries, ProbeError> {
        let chunks = self.sampling.split(raw)?;

        let mut char_reads = Vec::with_capacity(chunks.len());
        let mut char_writes = Vec::with_capacity(chunks.len());
        let mut byte_reads = Vec::with_capacity(chunks.len());
        let mut byte_writes = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            char_reads.push(counter_field(chunk, "rchar:", raw)?);
            char_writes.push(counter_field(chunk, "wchar:", raw)?);
            byte_reads.push(counter_field(chunk, "read_bytes:", raw)?);
            byte_writes.push(counter_field(chunk, "write_bytes:", raw)?);
        }

        return Ok(IoLoadSeries {
            time: self.sampling.time_axis(),
            char_reads,
            char_writes,
            byte_reads,
            byte_writes,
        });
    }
}


fn counter_field(chunk: &str, key: &str, raw: &str) -> Result<u64, ProbeError> {
    for line in chunk.lines() {
        if let Some(value) = line.trim().strip_prefix(key) {
            let value = value.trim();
            return value.parse::<u64>().map_err(|_| {
                ProbeError::parse(format!("invalid value '{}' for {}", value, key), raw)
            });
        }
    }

    return Err(ProbeError::parse(format!("missing field {}", key), raw));
}


impl Probe for IoLoadProbe {
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
        let io = self.parse(&result.text)?;
        let interval = self.sampling.interval_s();

        // rates pair with the trimmed time axis
        let x = io.time[1..io.time.len() - 1].to_vec();

        let panels = vec![
            Panel {
                x: x.clone(),
                x_desc: String::from("Time, s"),
                y_desc: String::from("Load, chars/s"),
                series: vec![
                    Series {
                        label: String::from("read char"),
                        points: series::rate(&io.char_reads, interval),
                    },
                    Series {
                        label: String::from("write char"),
                        points: series::rate(&io.char_writes, interval),
                    },
                ],
            },
            Panel {
                x,
                x_desc: String::from("Time, s"),
                y_desc: String::from("Load, bytes/s"),
                series: vec![
                    Series {
                        label: String::from("read byte"),
                        points: series::rate(&io.byte_reads, interval),
                    },
                    Series {
                        label: String::from("write byte"),
                        points: series::rate(&io.byte_writes, interval),
                    },
                ],
            },
        ];

        let path = renderer
            .panel_chart("io.png", &self.title, &panels)
            .map_err(ProbeError::Render)?;

        println!("{}", path.display());
        return Ok(());
    }
}
