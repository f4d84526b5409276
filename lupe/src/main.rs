use std::path::PathBuf;
use std::process::exit;
use std::thread::sleep;
use std::time::Duration;
use argparse::{ArgumentParser, List, Store};
use log::{info, warn};
use sysinfo::{System, SystemExt};

mod chart;
mod config;
mod probe;
mod target;

use chart::Renderer;
use config::Configuration;
use probe::{Registry, RegistryRef, Scheduler};
use target::{Process, ProcessRef};


struct CommandLineParameters {
    config_file: String,
    command: Vec<String>,
}


fn parse_args_or_exit() -> CommandLineParameters {
    let mut config_file = String::new();
    let mut command: Vec<String> = Vec::new();

    {
        let mut ap = ArgumentParser::new();
        ap.set_description("Lupe Process Inspector");
        ap.stop_on_first_argument(true);
        ap.refer(&mut config_file).add_option(&["-c", "--config"], Store, "Configuration file");
        ap.refer(&mut command).add_argument("command", List, "Target command to launch and inspect");
        ap.parse_args_or_exit();
    }

    if command.is_empty() {
        println!("Error: no target command given");
        exit(1);
    }

    CommandLineParameters {
        config_file,
        command,
    }
}


fn init_config_or_exit(config_file: String) -> Configuration {
    if config_file.is_empty() {
        return Configuration::default();
    }

    match Configuration::from_file(config_file) {
        Ok(configuration) => {
            configuration
        },
        Err(e) => {
            println!("Error: {}", e);
            exit(10);
        }
    }
}


fn init_logger(configuration: &Configuration) {
    let log_level = configuration.get_application().get_log_level();
    let env = env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV,
                                                   log_level.to_string());
    env_logger::init_from_env(env);
}


fn init_data_dir_or_exit(configuration: &Configuration) -> PathBuf {
    let data_dir = PathBuf::from(configuration.get_application().get_data_dir());

    match std::fs::create_dir_all(&data_dir) {
        Ok(_) => data_dir,
        Err(e) => {
            println!("Error creating data directory {}: {}", data_dir.display(), e);
            exit(20);
        }
    }
}


fn launch_target_or_exit(command: Vec<String>) -> (ProcessRef, u32) {
    let executable = command[0].clone();
    let arguments = command[1..].to_vec();
    let process = Process::new_ref(executable, arguments);

    let pid = match process.lock() {
        Ok(mut target) => {
            match target.start() {
                Ok(pid) => pid,
                Err(e) => {
                    println!("Error: {}", e);
                    exit(30);
                }
            }
        },
        Err(e) => {
            println!("Error acquiring lock: {}", e);
            exit(30);
        }
    };

    (process, pid)
}


fn install_interrupt_handler(registry: RegistryRef, target: ProcessRef) {
    ctrlc::set_handler(move || {
        match registry.lock() {
            Ok(mut registry) => registry.terminate_all(),
            Err(e) => println!("Error acquiring registry lock: {}", e),
        }

        stop_target(&target);
        exit(130);
    }).expect("Error setting Ctrl-C handler");
}


fn stop_target(target: &ProcessRef) {
    match target.lock() {
        Ok(mut target) => {
            match target.stop() {
                Ok(_) => info!("Target process stopped"),
                Err(e) => warn!("{}", e),
            }
        },
        Err(e) => {
            warn!("Error acquiring lock: {}", e);
        }
    }
}


fn count_cores() -> usize {
    let mut system = System::new();
    system.refresh_cpu();
    return system.cpus().len().max(1);
}


fn main() {
    let params = parse_args_or_exit();
    let configuration = init_config_or_exit(params.config_file);
    init_logger(&configuration);

    let data_dir = init_data_dir_or_exit(&configuration);
    let (target, pid) = launch_target_or_exit(params.command);
    println!("Target process pid: {}", pid);

    let registry = Registry::new_ref();
    install_interrupt_handler(registry.clone(), target.clone());

    let probes = probe::build_battery(pid, &data_dir, &configuration.get_flamegraph(), count_cores());
    let renderer = Renderer::new(&data_dir);
    let scheduler = Scheduler::new(registry);
    scheduler.run(probes, &renderer);

    println!("Done");

    if configuration.get_application().get_keep_running() {
        info!("Keeping target process running, press Ctrl-C to stop");
        loop {
            sleep(Duration::from_secs(1));
        }
    }

    stop_target(&target);
}
