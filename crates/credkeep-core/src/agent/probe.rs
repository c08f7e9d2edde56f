//! Availability probe
//!
//! A secret service can be installed and still not work: no running daemon,
//! a headless SSH session, a sandbox without a session bus. Running
//! [`trial_run`] at startup surfaces that immediately instead of on the
//! first real `save`.

use std::sync::Arc;

use thiserror::Error;

use super::SecretAgent;
use crate::backend::{default_backend, SecretBackend, SecretServiceError};
use crate::logging::{ConsoleLogger, LogLevel, SharedLogger};
use crate::schema::AttributeSet;

/// Schema name of the throwaway probe secret
pub const TEST_SCHEMA_NAME: &str = "Test Schema";

/// Payload written and read back by the probe
pub const TEST_PAYLOAD: &str = "Test Data";

/// Where users are sent when the probe fails
pub const REMEDIATION_URL: &str =
    "https://github.com/AzureAD/microsoft-authentication-extensions-for-python/wiki/Encryption-on-Linux";

/// Why the probe failed
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The backend reported an error, returned as it was raised
    #[error(transparent)]
    Service(#[from] SecretServiceError),

    /// The backend accepted the secret but gave back something else
    #[error("Secret service returned different data than was stored (expected {expected:?}, got {actual:?})")]
    RoundTripMismatch {
        expected: String,
        actual: Option<String>,
    },
}

impl ProbeError {
    /// Whether this is the "service not usable here" class of failure
    pub fn is_unavailable(&self) -> bool {
        match self {
            ProbeError::Service(err) => err.is_unavailable(),
            ProbeError::RoundTripMismatch { .. } => false,
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Probe the default backend, logging failures to the console
///
/// Returns the first failure of the save/load/clear round trip after
/// logging it twice: once with the full error chain, once as a short
/// warning pointing at [`REMEDIATION_URL`].
pub fn trial_run() -> ProbeResult<()> {
    trial_run_with(default_backend(), Arc::new(console_logger()))
}

/// Console sink used by `trial_run`: warnings and errors only
fn console_logger() -> ConsoleLogger {
    ConsoleLogger::new().with_min_level(LogLevel::Warn)
}

/// Probe `backend`, logging failures to `logger`
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use credkeep_core::agent::trial_run_with;
/// use credkeep_core::backend::MemoryBackend;
/// use credkeep_core::logging::RecordingLogger;
///
/// let backend = Arc::new(MemoryBackend::new());
/// let logger = Arc::new(RecordingLogger::new());
///
/// trial_run_with(backend.clone(), logger.clone()).unwrap();
/// assert!(logger.is_empty());
///
/// backend.set_available(false);
/// assert!(trial_run_with(backend, logger.clone()).is_err());
/// assert_eq!(logger.len(), 2);
/// ```
pub fn trial_run_with(backend: Arc<dyn SecretBackend>, logger: SharedLogger) -> ProbeResult<()> {
    let result = round_trip(backend);

    if let Err(err) = &result {
        let message = format!(
            "The secret service did not perform properly. Please refer to {}",
            REMEDIATION_URL
        );
        // Full chain for developers, then the short line users see by default
        logger.exception(&message, err);
        logger.warn(&message);
    }

    result
}

fn round_trip(backend: Arc<dyn SecretBackend>) -> ProbeResult<()> {
    let attributes: AttributeSet = [("attr1", "foo"), ("attr2", "bar")].into_iter().collect();
    let agent = SecretAgent::new(backend, TEST_SCHEMA_NAME, attributes);

    agent.save(TEST_PAYLOAD)?;
    let loaded = agent.load()?;
    if loaded.as_deref() != Some(TEST_PAYLOAD) {
        return Err(ProbeError::RoundTripMismatch {
            expected: TEST_PAYLOAD.to_string(),
            actual: loaded,
        });
    }
    agent.clear()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, SecretServiceResult};
    use crate::logging::RecordingLogger;
    use crate::schema::{AttributeSchema, Collection};
    use std::io;

    /// Backend that answers every lookup with a fixed value
    struct CorruptBackend {
        inner: MemoryBackend,
        answer: Option<String>,
    }

    impl SecretBackend for CorruptBackend {
        fn name(&self) -> &str {
            "corrupt"
        }

        fn store(
            &self,
            schema: &AttributeSchema,
            attributes: &AttributeSet,
            collection: Option<&Collection>,
            label: &str,
            payload: &str,
        ) -> SecretServiceResult<bool> {
            self.inner.store(schema, attributes, collection, label, payload)
        }

        fn lookup(
            &self,
            _schema: &AttributeSchema,
            _attributes: &AttributeSet,
            _collection: Option<&Collection>,
        ) -> SecretServiceResult<Option<String>> {
            Ok(self.answer.clone())
        }

        fn clear(
            &self,
            schema: &AttributeSchema,
            attributes: &AttributeSet,
            collection: Option<&Collection>,
        ) -> SecretServiceResult<bool> {
            self.inner.clear(schema, attributes, collection)
        }
    }

    /// Backend whose clear fails after a successful save and load
    struct FailingClear(MemoryBackend);

    impl SecretBackend for FailingClear {
        fn name(&self) -> &str {
            "failing-clear"
        }

        fn store(
            &self,
            schema: &AttributeSchema,
            attributes: &AttributeSet,
            collection: Option<&Collection>,
            label: &str,
            payload: &str,
        ) -> SecretServiceResult<bool> {
            self.0.store(schema, attributes, collection, label, payload)
        }

        fn lookup(
            &self,
            schema: &AttributeSchema,
            attributes: &AttributeSet,
            collection: Option<&Collection>,
        ) -> SecretServiceResult<Option<String>> {
            self.0.lookup(schema, attributes, collection)
        }

        fn clear(
            &self,
            _schema: &AttributeSchema,
            _attributes: &AttributeSet,
            _collection: Option<&Collection>,
        ) -> SecretServiceResult<bool> {
            Err(SecretServiceError::unavailable_with(
                "connection dropped",
                Box::new(io::Error::new(io::ErrorKind::BrokenPipe, "bus closed")),
            ))
        }
    }

    fn assert_logged_twice(logger: &RecordingLogger) {
        let errors = logger.messages_at(LogLevel::Error);
        let warnings = logger.messages_at(LogLevel::Warn);
        assert_eq!(errors.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(REMEDIATION_URL));
        assert!(errors[0].starts_with(&warnings[0]));
    }

    #[test]
    fn test_console_sink_shows_both_failure_records() {
        let logger = console_logger();
        assert!(logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Error));
        assert!(!logger.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_trial_run_succeeds_and_cleans_up() {
        let backend = Arc::new(MemoryBackend::new());
        let logger = Arc::new(RecordingLogger::new());

        trial_run_with(backend.clone(), logger.clone()).unwrap();

        assert!(backend.is_empty());
        assert!(logger.messages_at(LogLevel::Warn).is_empty());
        assert!(logger.messages_at(LogLevel::Error).is_empty());
    }

    #[test]
    fn test_trial_run_reports_unavailable_service() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_available(false);
        let logger = Arc::new(RecordingLogger::new());

        let err = trial_run_with(backend, logger.clone()).unwrap_err();

        assert!(matches!(err, ProbeError::Service(SecretServiceError::Unavailable { .. })));
        assert!(err.is_unavailable());
        assert_logged_twice(&logger);
    }

    #[test]
    fn test_trial_run_reports_locked_service() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_locked(true);
        let logger = Arc::new(RecordingLogger::new());

        let err = trial_run_with(backend, logger.clone()).unwrap_err();

        assert!(matches!(err, ProbeError::Service(SecretServiceError::Locked { .. })));
        assert_logged_twice(&logger);
    }

    #[test]
    fn test_trial_run_reports_mismatch() {
        let backend = Arc::new(CorruptBackend {
            inner: MemoryBackend::new(),
            answer: Some("Other Data".to_string()),
        });
        let logger = Arc::new(RecordingLogger::new());

        let err = trial_run_with(backend, logger.clone()).unwrap_err();

        match err {
            ProbeError::RoundTripMismatch { expected, actual } => {
                assert_eq!(expected, TEST_PAYLOAD);
                assert_eq!(actual, Some("Other Data".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_logged_twice(&logger);
    }

    #[test]
    fn test_trial_run_reports_missing_secret_as_mismatch() {
        let backend = Arc::new(CorruptBackend {
            inner: MemoryBackend::new(),
            answer: None,
        });
        let logger = Arc::new(RecordingLogger::new());

        let err = trial_run_with(backend, logger.clone()).unwrap_err();

        assert!(matches!(err, ProbeError::RoundTripMismatch { actual: None, .. }));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_trial_run_reports_clear_failure_with_cause_chain() {
        let backend = Arc::new(FailingClear(MemoryBackend::new()));
        let logger = Arc::new(RecordingLogger::new());

        let err = trial_run_with(backend, logger.clone()).unwrap_err();

        assert_eq!(err.to_string(), "Secret service unavailable: connection dropped");
        assert_logged_twice(&logger);
        let detail = &logger.messages_at(LogLevel::Error)[0];
        assert!(detail.contains("caused by: bus closed"));
    }
}
