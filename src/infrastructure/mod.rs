pub mod config_repository;
pub mod history;

pub use config_repository::ConfigRepository;
