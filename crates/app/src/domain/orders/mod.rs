//! Orders

pub mod errors;
pub mod gateway;
pub mod service;

pub use errors::OrdersServiceError;
pub use gateway::*;
pub use service::*;
