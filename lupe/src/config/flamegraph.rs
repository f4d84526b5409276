use serde::Deserialize;


/// Where the FlameGraph helper scripts live and how long `perf record`
/// samples the target.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Flamegraph {
    scripts_dir: Option<String>,
    seconds: Option<u64>,
}


impl Flamegraph {
    pub fn get_scripts_dir(&self) -> String {
        return match &self.scripts_dir {
            Some(scripts_dir) => scripts_dir.clone(),
            None => String::from("FlameGraph"),
        };
    }

    pub fn get_seconds(&self) -> u64 {
        return match &self.seconds {
            Some(seconds) => *seconds,
            None => 30,
        };
    }
}
