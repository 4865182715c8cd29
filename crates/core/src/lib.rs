//! Core shared types for Magnet Board
//! 
//! This crate contains:
//! - Grid, cell and color types and the paint session
//! - Payload encodings and validation for the device
//! - Device address handling and live channel messages
//! - Error types

pub mod address;
pub mod color;
pub mod error;
pub mod grid;
pub mod messages;
pub mod models;
pub mod payload;
pub mod session;

pub use address::*;
pub use color::*;
pub use error::*;
pub use grid::*;
pub use messages::*;
pub use models::*;
pub use payload::*;
pub use session::*;
