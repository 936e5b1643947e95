//! Per-entity availability flag.
//!
//! A monitor that drops off the network fails every poll until it comes
//! back. Only the transition to unavailable is logged as an error, so a
//! long outage produces a single log line per entity.

use std::error::Error as StdError;
use std::fmt::Write as _;

/// Tracks whether an entity's last device exchange succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    available: bool,
}

impl Default for Availability {
    fn default() -> Self {
        Self { available: true }
    }
}

impl Availability {
    /// Start as available.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Mark the entity available. Returns `true` when it was unavailable.
    pub fn record_success(&mut self, entity: &str) -> bool {
        if self.available {
            return false;
        }
        self.available = true;
        tracing::info!(entity, "device reachable again");
        true
    }

    /// Mark the entity unavailable, logging `message` on the falling edge
    /// only. Returns `true` when it was available.
    pub fn record_failure(&mut self, entity: &str, message: &str, err: &dyn StdError) -> bool {
        if !self.available {
            tracing::debug!(entity, error = %error_chain(err), "device still unreachable");
            return false;
        }
        self.available = false;
        tracing::error!(entity, error = %error_chain(err), "{message}");
        true
    }
}

/// `err: source: source…` on a single line.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let _ = write!(out, ": {inner}");
        source = inner.source();
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use airmon_domain::error::{AirmonError, DeviceError};
    use tracing_subscriber::layer::{Context, SubscriberExt};

    use super::*;

    /// Counts `ERROR` events emitted while installed.
    #[derive(Clone, Default)]
    pub(crate) struct ErrorCounter(pub Arc<AtomicUsize>);

    impl ErrorCounter {
        pub(crate) fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub(crate) fn timeout_error() -> AirmonError {
        DeviceError::communication(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "no response",
        ))
        .into()
    }

    #[test]
    fn should_start_available() {
        assert!(Availability::new().is_available());
    }

    #[test]
    fn should_log_once_when_many_polls_fail() {
        let counter = ErrorCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let err = timeout_error();

        let falls = tracing::subscriber::with_default(subscriber, || {
            let mut availability = Availability::new();
            (0..5)
                .filter(|_| availability.record_failure("office_co2", "poll failed", &err))
                .count()
        });

        assert_eq!(falls, 1);
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn should_restore_when_poll_succeeds_after_failure() {
        let err = timeout_error();
        let mut availability = Availability::new();
        availability.record_failure("office_co2", "poll failed", &err);
        assert!(!availability.is_available());

        assert!(availability.record_success("office_co2"));
        assert!(availability.is_available());
        assert!(!availability.record_success("office_co2"));
    }

    #[test]
    fn should_log_again_when_failing_after_recovery() {
        let counter = ErrorCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let err = timeout_error();

        tracing::subscriber::with_default(subscriber, || {
            let mut availability = Availability::new();
            availability.record_failure("office_co2", "poll failed", &err);
            availability.record_failure("office_co2", "poll failed", &err);
            availability.record_success("office_co2");
            availability.record_failure("office_co2", "poll failed", &err);
        });

        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn should_include_source_in_error_chain() {
        let chain = error_chain(&timeout_error());
        assert_eq!(chain, "device error: communication with the device failed: no response");
    }
}
