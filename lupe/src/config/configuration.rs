use std::fs;
use serde::Deserialize;

use crate::config::{Application, Flamegraph};


/// Run configuration. Every section and key is optional; a missing file
/// falls back to defaults entirely.
#[derive(Deserialize, Debug, Default)]
pub struct Configuration {
    application: Option<Application>,
    flamegraph: Option<Flamegraph>,
}


impl Configuration {
    pub fn from_file(file_path: String) -> Result<Configuration, String> {
        return match fs::read_to_string(file_path) {
            Ok(content) => {
                Configuration::from_string(content)
            },
            Err(error) => {
                Err(format!("Error reading configuration file: {}", error))
            }
        }
    }

    pub fn from_string(content: String) -> Result<Configuration, String> {
        return match toml::from_str(&content) {
            Ok(configuration) => {
                Ok(configuration)
            },
            Err(error) => {
                Err(format!("Error parsing configuration file: {}", error))
            }
        }
    }

    pub fn get_application(&self) -> Application {
        return match &self.application {
            Some(application) => application.clone(),
            None => Application::default(),
        };
    }

    pub fn get_flamegraph(&self) -> Flamegraph {
        return match &self.flamegraph {
            Some(flamegraph) => flamegraph.clone(),
            None => Flamegraph::default(),
        };
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    fn sample_complete_conf() -> String {
        return String::from(
            r#"
                [application]
                log_level = "debug"
                data_dir = "diagnostics"
                keep_running = true

                [flamegraph]
                scripts_dir = "/opt/FlameGraph"
                seconds = 10
            "#,
        );
    }

    #[test]
    fn from_string_should_work() {
        let content = sample_complete_conf();

        let configuration = Configuration::from_string(content).unwrap();

        assert_eq!(configuration.get_application().get_log_level(), LogLevel::Debug);
        assert_eq!(configuration.get_application().get_data_dir(), "diagnostics");
        assert_eq!(configuration.get_application().get_keep_running(), true);
        assert_eq!(configuration.get_flamegraph().get_scripts_dir(), "/opt/FlameGraph");
        assert_eq!(configuration.get_flamegraph().get_seconds(), 10);
    }

    #[test]
    fn from_string_when_missing_keys_should_use_defaults() {
        let configuration = Configuration::from_string(String::from("[application]")).unwrap();

        assert_eq!(configuration.get_application().get_log_level(), LogLevel::Info);
        assert_eq!(configuration.get_application().get_data_dir(), "data");
        assert_eq!(configuration.get_application().get_keep_running(), false);
        assert_eq!(configuration.get_flamegraph().get_scripts_dir(), "FlameGraph");
        assert_eq!(configuration.get_flamegraph().get_seconds(), 30);
    }

    #[test]
    fn from_string_when_empty_should_use_defaults() {
        let configuration = Configuration::from_string(String::new()).unwrap();

        assert_eq!(configuration.get_application().get_log_level(), LogLevel::Info);
    }

    #[test]
    fn from_file_should_work() {
        let file = String::from("resources/lupe.toml");

        let configuration = Configuration::from_file(file).unwrap();

        assert_eq!(configuration.get_application().get_log_level(), LogLevel::Debug);
    }

    #[test]
    fn from_file_when_file_invalid_should_return_error() {
        let file = String::from("foo/bar/invalid.file");

        let configuration = Configuration::from_file(file);

        assert!(configuration.is_err());
    }
}
