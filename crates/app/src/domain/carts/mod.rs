//! Carts

pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::CartsServiceError;
pub use repository::*;
pub use service::*;
