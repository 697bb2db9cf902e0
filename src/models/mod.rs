pub mod client;
pub mod enums;
pub mod identity;
pub mod reading;

pub use client::*;
pub use enums::*;
pub use identity::*;
pub use reading::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
