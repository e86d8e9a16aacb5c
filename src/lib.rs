pub mod config;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod progress;
pub mod repository;
pub mod sampling;
pub mod server_messages;
pub mod state;

pub mod handlers {
    pub mod command_handler;
    pub mod connection_handler;
    pub mod timer_handler;
}

pub mod loggers {
    pub mod file_logger;
}

pub mod models {
    pub mod communication;
    pub mod progress;
    pub mod question;
    pub mod session;
}
