use thiserror::Error;

/// Failures that are scoped to a single request and reported to the user.
///
/// Anything else (storage faults, I/O) travels as a plain `anyhow::Error`
/// and is treated as an internal error by the binary.
#[derive(Debug, Error)]
pub enum SalesError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("Call to {service}.{module}.{action} failed")]
    Downstream {
        service: String,
        module: String,
        action: String,
    },
}

impl SalesError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        SalesError::NotFound { kind, id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        SalesError::Validation(message.into())
    }
}

/// Find the outermost `SalesError` carried by an error, if any
pub fn classify(err: &anyhow::Error) -> Option<&SalesError> {
    err.downcast_ref::<SalesError>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_messages() {
        assert_eq!(
            SalesError::not_found("Board", "b1").to_string(),
            "Board 'b1' not found"
        );
        assert_eq!(
            SalesError::validation("Name is required").to_string(),
            "Name is required"
        );
    }

    #[test]
    fn test_classify_through_context() {
        let result: anyhow::Result<()> = Err(SalesError::not_found("Template", "t1").into());
        let err = result.context("Failed to use template").unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::NotFound { .. })));

        let plain = anyhow::anyhow!("disk full");
        assert!(classify(&plain).is_none());
    }
}
