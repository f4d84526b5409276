use serde::Deserialize;

use crate::config::LogLevel;


#[derive(Deserialize, Debug, Clone, Default)]
pub struct Application {
    log_level: Option<LogLevel>,
    data_dir: Option<String>,
    keep_running: Option<bool>,
}


impl Application {
    pub fn get_log_level(&self) -> LogLevel {
        return match &self.log_level {
            Some(log_level) => *log_level,
            None => LogLevel::Info,
        };
    }

    pub fn get_data_dir(&self) -> String {
        return match &self.data_dir {
            Some(data_dir) => data_dir.clone(),
            None => String::from("data"),
        };
    }

    pub fn get_keep_running(&self) -> bool {
        return match &self.keep_running {
            Some(keep_running) => *keep_running,
            None => false,
        };
    }
}
