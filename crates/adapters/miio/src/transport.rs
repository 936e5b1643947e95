//! Request/response transport to a monitor.
//!
//! The real exchange (UDP, handshake, token-derived encryption) is not part
//! of this crate. A transport takes a method name and its JSON parameters
//! and returns the `result` member of the device's answer.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::MiioError;

/// Sends one request to the monitor and returns its `result`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, MiioError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, MiioError>> + Send {
        (**self).send(method, params)
    }
}
