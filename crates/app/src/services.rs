//! Application services.
//!
//! The registry is the only stateful service: it holds what the integration
//! registered and fans changes out to the event bus.

pub mod registry;
