//! miIO adapter error types.

use std::error::Error as StdError;

use airmon_domain::error::{AirmonError, DeviceError};

/// Errors specific to the miIO adapter.
#[derive(Debug, thiserror::Error)]
pub enum MiioError {
    /// The request could not be delivered or no answer came back.
    #[error("transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The device answered with an error object.
    #[error("device returned error {code}: {message}")]
    Device {
        /// Error code reported by the device.
        code: i64,
        /// Error message reported by the device.
        message: String,
    },

    /// The answer does not have the expected shape.
    #[error("unexpected response to {method}: {reason}")]
    UnexpectedResponse {
        /// Request method (e.g. `"get_properties"`).
        method: &'static str,
        /// Short explanation.
        reason: String,
    },

    /// No mapping exists for the requested property or action.
    #[error("unknown property or action {0:?}")]
    UnknownProperty(String),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] AirmonError),
}

impl MiioError {
    /// Wrap any transport failure.
    pub fn transport(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Convert into an [`AirmonError::Device`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> AirmonError {
        match self {
            Self::Domain(err) => err,
            Self::UnexpectedResponse { method, reason } => {
                DeviceError::UnexpectedResponse { method, reason }.into()
            }
            Self::UnknownProperty(name) => DeviceError::UnknownProperty(name).into(),
            other => DeviceError::communication(other).into(),
        }
    }
}

impl From<MiioError> for AirmonError {
    fn from(err: MiioError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airmon_domain::error::ValidationError;

    #[test]
    fn should_display_device_error_with_code() {
        let err = MiioError::Device {
            code: -5001,
            message: "command error".to_string(),
        };
        assert_eq!(err.to_string(), "device returned error -5001: command error");
    }

    #[test]
    fn should_convert_transport_error_to_communication_error() {
        let err: AirmonError = MiioError::transport(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "no answer",
        ))
        .into();
        assert!(matches!(
            err,
            AirmonError::Device(DeviceError::Communication(_))
        ));
    }

    #[test]
    fn should_convert_unknown_property_to_device_error() {
        let err: AirmonError = MiioError::UnknownProperty("fan-level".to_string()).into();
        assert!(matches!(
            err,
            AirmonError::Device(DeviceError::UnknownProperty(name)) if name == "fan-level"
        ));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let miio_err = MiioError::Domain(ValidationError::EmptyHost.into());
        let back: AirmonError = miio_err.into();
        assert!(matches!(
            back,
            AirmonError::Validation(ValidationError::EmptyHost)
        ));
    }
}
