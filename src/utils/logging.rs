pub use crate::utils::log_entry::io::IOEntry;
pub use crate::utils::log_entry::misc::MiscEntry;
pub use crate::utils::log_entry::network::NetworkEntry;
pub use crate::utils::log_entry::system::SystemEntry;
pub use crate::{
    critical_entry, debug_entry, emergency_entry, error_entry, information_entry, warning_entry,
};
pub use crate::{
    logging_console, logging_critical, logging_debug, logging_emergency, logging_entry,
    logging_error, logging_information, logging_warning,
};

use chrono::{DateTime, Local};
use colored::*;
use lazy_static::lazy_static;
use std::fmt::Display;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

lazy_static! {
    static ref LOGGER: RwLock<Logger> = RwLock::new(Logger::new());
}

#[derive(Copy, Clone, Debug)]
pub enum LogLevel {
    Debug,
    Information,
    Warning,
    Error,
    Critical,
    Emergency,
}

impl LogLevel {
    pub fn to_plain_string(&self) -> String {
        match self {
            LogLevel::Debug => "Debug      ".to_string(),
            LogLevel::Information => "Information".to_string(),
            LogLevel::Warning => "Warning    ".to_string(),
            LogLevel::Error => "Error      ".to_string(),
            LogLevel::Critical => "Critical   ".to_string(),
            LogLevel::Emergency => "Emergency  ".to_string(),
        }
    }

    pub fn to_colored_string(&self) -> ColoredString {
        match self {
            LogLevel::Debug => "Debug      ".to_string().bright_black(),
            LogLevel::Information => "Information".to_string().bright_blue(),
            LogLevel::Warning => "Warning    ".to_string().yellow(),
            LogLevel::Error => "Error      ".to_string().bright_red(),
            LogLevel::Critical => "Critical   ".to_string().bright_yellow(),
            LogLevel::Emergency => "Emergency  ".to_string().magenta(),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = self.to_plain_string();
        write!(f, "{}", str)
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub position: String,
    pub message: String,
    pub debug_info: String,
}

impl LogEntry {
    pub fn new<T: Into<String>, U: Into<String>, V: Into<String>>(
        level: LogLevel,
        position: T,
        message: U,
        debug_info: V,
    ) -> Self {
        Self {
            level,
            timestamp: Local::now(),
            position: position.into(),
            message: message.into(),
            debug_info: debug_info.into(),
        }
    }

    pub fn to_plain_string(&self) -> String {
        let level = self.level.to_plain_string();
        let timestamp = self.timestamp.format("%Y/%m/%d %H:%M:%S").to_string();
        let position = self.position.clone();
        let message = self.message.clone();
        if self.debug_info.is_empty() {
            format!("[{}] {} {}: {}", level, timestamp, position, message)
        } else {
            format!(
                "[{}] {} {}: {}\n{}",
                level, timestamp, position, message, self.debug_info
            )
        }
    }

    pub fn to_colored_string(&self) -> String {
        let level = self.level.to_colored_string();
        let timestamp = self.timestamp.format("%Y/%m/%d %H:%M:%S").to_string();
        let position = self.position.cyan();
        let message = self.message.white();
        if self.debug_info.is_empty() {
            format!("[{}] {} {}: {}", level, timestamp, position, message)
        } else {
            let debug_info = self.debug_info.bright_black();
            format!(
                "[{}] {} {}: {}\n{}",
                level, timestamp, position, message, debug_info
            )
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = self.to_plain_string();
        write!(f, "{}", str)
    }
}

pub struct Logger {
    system_log: Vec<LogEntry>,
}

impl Logger {
    fn new() -> Self {
        let mut system_log = Vec::new();
        let log_entry = LogEntry::new(LogLevel::Information, "Logger", "Online now", "");
        system_log.push(log_entry);
        Self { system_log }
    }

    pub async fn instance() -> RwLockReadGuard<'static, Logger> {
        LOGGER.read().await
    }

    pub async fn instance_mut() -> RwLockWriteGuard<'static, Logger> {
        LOGGER.write().await
    }

    pub async fn add_system_log<T: Into<String>, U: Into<String>, V: Into<String>>(
        level: LogLevel,
        position: T,
        message: U,
        debug_info: V,
    ) {
        let log_entry = LogEntry::new(level, position, message, debug_info);
        Self::logging_console(log_entry.clone());
        let mut logger = Self::instance_mut().await;
        logger.system_log.push(log_entry);
    }

    pub async fn add_system_log_entry(log_entry: LogEntry) {
        Self::logging_console(log_entry.clone());
        let mut logger = Self::instance_mut().await;
        logger.system_log.push(log_entry);
    }

    pub fn logging_console(log_entry: LogEntry) {
        println!("{}", log_entry.to_colored_string());
    }

    pub async fn get_system_logs() -> Vec<LogEntry> {
        Self::instance().await.system_log.clone()
    }

    pub async fn get_system_logs_since(time: DateTime<Local>) -> Vec<LogEntry> {
        let logger = Self::instance().await;
        let index = logger
            .system_log
            .binary_search_by(|entry| entry.timestamp.cmp(&time))
            .unwrap_or_else(|x| x);
        logger.system_log[index..].to_vec()
    }
}

#[macro_export]
macro_rules! debug_entry {
    ($message:expr) => {
        LogEntry::new(
            LogLevel::Debug,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
    };
    ($message:expr, $debug_info:expr) => {
        LogEntry::new(
            LogLevel::Debug,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
    };
}

#[macro_export]
macro_rules! information_entry {
    ($message:expr) => {
        LogEntry::new(
            LogLevel::Information,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
    };
    ($message:expr, $debug_info:expr) => {
        LogEntry::new(
            LogLevel::Information,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
    };
}

#[macro_export]
macro_rules! warning_entry {
    ($message:expr) => {
        LogEntry::new(
            LogLevel::Warning,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
    };
    ($message:expr, $debug_info:expr) => {
        LogEntry::new(
            LogLevel::Warning,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
    };
}

#[macro_export]
macro_rules! error_entry {
    ($message:expr) => {
        LogEntry::new(
            LogLevel::Error,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
    };
    ($message:expr, $debug_info:expr) => {
        LogEntry::new(
            LogLevel::Error,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
    };
}

#[macro_export]
macro_rules! critical_entry {
    ($message:expr) => {
        LogEntry::new(
            LogLevel::Critical,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
    };
    ($message:expr, $debug_info:expr) => {
        LogEntry::new(
            LogLevel::Critical,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
    };
}

#[macro_export]
macro_rules! emergency_entry {
    ($message:expr) => {
        LogEntry::new(
            LogLevel::Emergency,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
    };
    ($message:expr, $debug_info:expr) => {
        LogEntry::new(
            LogLevel::Emergency,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
    };
}

#[macro_export]
macro_rules! logging_debug {
    ($message:expr) => {
        Logger::add_system_log(
            LogLevel::Debug,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
        .await
    };
    ($message:expr, $debug_info:expr) => {
        Logger::add_system_log(
            LogLevel::Debug,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
        .await
    };
}

#[macro_export]
macro_rules! logging_information {
    ($message:expr) => {
        Logger::add_system_log(
            LogLevel::Information,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
        .await
    };
    ($message:expr, $debug_info:expr) => {
        Logger::add_system_log(
            LogLevel::Information,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
        .await
    };
}

#[macro_export]
macro_rules! logging_warning {
    ($message:expr) => {
        Logger::add_system_log(
            LogLevel::Warning,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
        .await
    };
    ($message:expr, $debug_info:expr) => {
        Logger::add_system_log(
            LogLevel::Warning,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
        .await
    };
}

#[macro_export]
macro_rules! logging_error {
    ($message:expr) => {
        Logger::add_system_log(
            LogLevel::Error,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
        .await
    };
    ($message:expr, $debug_info:expr) => {
        Logger::add_system_log(
            LogLevel::Error,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
        .await
    };
}

#[macro_export]
macro_rules! logging_critical {
    ($message:expr) => {
        Logger::add_system_log(
            LogLevel::Critical,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
        .await
    };
    ($message:expr, $debug_info:expr) => {
        Logger::add_system_log(
            LogLevel::Critical,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
        .await
    };
}

#[macro_export]
macro_rules! logging_emergency {
    ($message:expr) => {
        Logger::add_system_log(
            LogLevel::Emergency,
            format!("{}:{}", file!(), line!()),
            $message,
            "",
        )
        .await
    };
    ($message:expr, $debug_info:expr) => {
        Logger::add_system_log(
            LogLevel::Emergency,
            format!("{}:{}", file!(), line!()),
            $message,
            $debug_info,
        )
        .await
    };
}

#[macro_export]
macro_rules! logging_entry {
    ($entry:expr) => {
        Logger::add_system_log_entry($entry).await
    };
}

#[macro_export]
macro_rules! logging_console {
    ($entry:expr) => {
        Logger::logging_console($entry)
    };
}
