use crate::utils::logging::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

const CONFIG_PATH: &str = "./carwatch.toml";

#[cfg(target_os = "windows")]
const DEFAULT_PYTHON: &str = "python";
#[cfg(not(target_os = "windows"))]
const DEFAULT_PYTHON: &str = "python3";

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub http_server_bind_port: u16, //port
    pub bind_retry_duration: u64, //seconds
    pub inference_workers: usize, //count
    pub max_file_size: usize, //bytes
    pub max_image_dimension: u32, //pixels
    pub inference_image_size: u32, //pixels
    pub detection_confidence: f32, //0.0 - 1.0
    pub verification_threshold: f32, //0.0 - 1.0
    pub target_classes: Vec<u32>, //model class ids
    pub python_executable: String, //command
    pub model_path: String, //path
    pub script_folder: String, //path
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_server_bind_port: 8000,
            bind_retry_duration: 10,
            inference_workers: 2,
            max_file_size: 10 * 1024 * 1024,
            max_image_dimension: 1280,
            inference_image_size: 640,
            detection_confidence: 0.25,
            verification_threshold: 0.5,
            target_classes: vec![2],
            python_executable: DEFAULT_PYTHON.to_string(),
            model_path: "yolo11n.pt".to_string(),
            script_folder: "scripts/ultralytics".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = match fs::read_to_string(CONFIG_PATH) {
            Ok(toml_string) => match toml::from_str::<ConfigTable>(&toml_string) {
                Ok(config_table) => config_table.config,
                Err(err) => {
                    logging_console!(emergency_entry!(
                        "Unable to parse configuration file",
                        format!("Err: {err}")
                    ));
                    panic!("Unable to parse configuration file");
                }
            },
            Err(_) => {
                logging_console!(warning_entry!(SystemEntry::ConfigNotFound));
                Config::default()
            }
        };
        if let Ok(port) = env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.http_server_bind_port = port,
                Err(err) => {
                    logging_console!(emergency_entry!(
                        "Invalid PORT environment variable",
                        format!("Err: {err}")
                    ));
                    panic!("Invalid PORT environment variable");
                }
            }
        }
        if !Self::validate(&config) {
            logging_console!(emergency_entry!(SystemEntry::InvalidConfig));
            panic!("Invalid configuration");
        }
        config
    }

    pub fn validate(config: &Config) -> bool {
        Config::validate_second(config.bind_retry_duration)
            && Config::validate_count(config.inference_workers)
            && Config::validate_size(config.max_file_size)
            && Config::validate_dimension(config.max_image_dimension)
            && Config::validate_dimension(config.inference_image_size)
            && Config::validate_confidence(config.detection_confidence)
            && Config::validate_confidence(config.verification_threshold)
            && !config.target_classes.is_empty()
            && !config.python_executable.is_empty()
            && !config.model_path.is_empty()
            && !config.script_folder.is_empty()
    }

    fn validate_second(second: u64) -> bool {
        second <= 3600
    }

    fn validate_count(count: usize) -> bool {
        count > 0_usize
    }

    fn validate_size(size: usize) -> bool {
        size > 0_usize
    }

    fn validate_dimension(dimension: u32) -> bool {
        dimension > 0_u32
    }

    fn validate_confidence(confidence: f32) -> bool {
        (0.0_f32..=1.0_f32).contains(&confidence)
    }
}
