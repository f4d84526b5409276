use std::time::Duration;

use crate::chart::{Renderer, Series};
use crate::probe::{series, CommandResult, Probe, ProbeError, Sampling};


/// Repeated network counters from `/proc/<pid>/net/dev`, summed over all
/// interfaces. Cumulative, so the report charts discrete-difference rates.
#[derive(Debug, Clone)]
pub struct NetworkLoadProbe {
    title: String,
    command: String,
    sampling: Sampling,
}


#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLoadSeries {
    pub time: Vec<f64>,
    pub received: Vec<u64>,
    pub sent: Vec<u64>,
}


impl NetworkLoadProbe {
    pub fn new(pid: u32) -> NetworkLoadProbe {
        let sampling = Sampling::new(Duration::from_secs(1), 60);
        let command = sampling.command(&format!(
            "cat /proc/{}/net/dev | awk 'NR>2 {{print $2,$10}}'",
            pid,
        ));

        return NetworkLoadProbe {
            title: String::from("(proc/net) Network subsystem load of the target"),
            command,
            sampling,
        };
    }

    /// Each sample holds one `recv sent` pair per interface; both columns
    /// are summed across interfaces.
    pub fn parse(&self, raw: &str) -> Result<NetworkLoadSeries, ProbeError> {
        let chunks = self.sampling.split(raw)?;

        let mut received = Vec::with_capacity(chunks.len());
        let mut sent = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let mut received_sum: u64 = 0;
            let mut sent_sum: u64 = 0;

            for line in chunk.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let mut fields = line.split_whitespace();
                let (received_field, sent_field) = match (fields.next(), fields.next()) {
                    (Some(received_field), Some(sent_field)) => (received_field, sent_field),
                    _ => {
                        return Err(ProbeError::parse(
                            format!("unexpected interface row: '{}'", line),
                            raw,
                        ));
                    }
                };

                received_sum += received_field.parse::<u64>().map_err(|_| {
                    ProbeError::parse(format!("invalid recv counter '{}'", received_field), raw)
                })?;
                sent_sum += sent_field.parse::<u64>().map_err(|_| {
                    ProbeError::parse(format!("invalid sent counter '{}'", sent_field), raw)
                })?;
            }

            received.push(received_sum);
            sent.push(sent_sum);
        }

        return Ok(NetworkLoadSeries {
            time: self.sampling.time_axis(),
            received,
            sent,
        });
    }
}


impl Probe for NetworkLoadProbe {
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
        let network = self.parse(&result.text)?;
        let interval = self.sampling.interval_s();

        let x = network.time[1..network.time.len() - 1].to_vec();
        let lines = vec![
            Series {
                label: String::from("recv"),
                points: series::rate(&network.received, interval),
            },
            Series {
                label: String::from("send"),
                points: series::rate(&network.sent, interval),
            },
        ];

        let path = renderer
            .line_chart("network.png", &self.title, "Time, s", "Load, bytes/s", &x, &lines)
            .map_err(ProbeError::Render)?;

        println!("{}", path.display());
        return Ok(());
    }
}
