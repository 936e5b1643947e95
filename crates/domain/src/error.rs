//! Error types shared across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`AirmonError`]
//! when crossing a port boundary.

use std::error::Error as StdError;

/// Top-level error returned through port traits.
#[derive(Debug, thiserror::Error)]
pub enum AirmonError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A requested record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Talking to the monitor failed.
    #[error("device error")]
    Device(#[from] DeviceError),
}

/// Invariant violations detected by the domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("device host must not be empty")]
    EmptyHost,

    #[error("device token must be 32 hexadecimal characters")]
    InvalidToken,

    #[error("unsupported device model {0:?}")]
    UnsupportedModel(String),

    #[error("service {service:?} is not supported by {entity}")]
    UnsupportedService {
        /// Unique id of the entity the call targeted.
        entity: String,
        /// Requested service name.
        service: String,
    },

    #[error("service call requires a numeric \"value\"")]
    MissingValue,

    #[error("service call requires a valid {0:?} field")]
    InvalidField(&'static str),

    #[error("value {value} is outside of [{min}, {max}]")]
    OutOfRange {
        /// Rejected value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
}

/// A lookup by identifier matched nothing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record (e.g. `"Entity"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}

/// Failures while exchanging requests with the monitor.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The transport could not deliver the request or read the response.
    #[error("communication with the device failed")]
    Communication(#[source] Box<dyn StdError + Send + Sync>),

    /// The device answered with something that does not fit the request.
    #[error("unexpected response to {method}: {reason}")]
    UnexpectedResponse {
        /// Request method (e.g. `"get_prop"`).
        method: &'static str,
        /// Short explanation.
        reason: String,
    },

    /// The device has no property or action with that name.
    #[error("unknown property or action {0:?}")]
    UnknownProperty(String),
}

impl DeviceError {
    /// Wrap any transport failure.
    pub fn communication(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Communication(Box::new(err))
    }
}
