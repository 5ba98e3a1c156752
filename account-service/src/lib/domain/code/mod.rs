pub mod errors;
pub mod manager;
pub mod models;
pub mod ports;
