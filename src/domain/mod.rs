//! Domain types and the ports the workflows depend on.

pub mod identity;
pub mod ports;
pub mod route;
pub mod workflow;
