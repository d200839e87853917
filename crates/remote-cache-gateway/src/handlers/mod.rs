//! Cache API request handlers

pub mod artifact;
pub mod service;

pub use artifact::*;
pub use service::*;
