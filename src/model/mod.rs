pub mod config;
pub mod payload;
pub mod release;
pub mod stage;
