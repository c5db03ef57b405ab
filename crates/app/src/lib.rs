//! Shared application domain and coordination modules.
//!
//! The engine in `comptoir` is pure and synchronous; this crate supplies the
//! asynchronous collaborators around it (the cart repository, the product
//! catalog and the order gateway), in-memory implementations standing in for
//! the real backend, and the services that coordinate fetch, mutate and
//! persist without ever leaving state half-applied.

pub mod context;
pub mod domain;
