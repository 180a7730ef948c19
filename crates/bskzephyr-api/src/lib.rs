// bskzephyr-api: Async Rust client for the BSK Zephyr cloud ventilation API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod speed;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, ZephyrClient};
pub use error::Error;
pub use models::{ControlRequest, Device, DeviceUser, FanMode, FanSpeed};
pub use speed::SpeedTable;
pub use transport::TransportConfig;

pub use secrecy::SecretString;
