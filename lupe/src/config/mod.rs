mod configuration;
pub use configuration::Configuration;

mod application;
pub use application::Application;

mod flamegraph;
pub use flamegraph::Flamegraph;

mod log_level;
pub use log_level::LogLevel;
