/// Outcome of a failed authentication operation.
///
/// Callers only ever see these three kinds. Storage, hashing and signing
/// failures are collapsed into [`CoreError::Internal`]; the message is for
/// logs and must not be forwarded to clients.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Unknown email or wrong password. The two cases are deliberately
    /// indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A user with the requested email already exists.
    #[error("User already exists")]
    UserExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for wrapping any displayable failure as [`CoreError::Internal`],
    /// prefixed with the operation that produced it.
    pub fn internal(op: &str, err: impl std::fmt::Display) -> Self {
        CoreError::Internal(format!("{op}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_is_tagged_with_operation() {
        let err = CoreError::internal("auth.login", "connection reset");
        assert_eq!(
            err.to_string(),
            "Internal error: auth.login: connection reset"
        );
    }

    #[test]
    fn credential_errors_have_fixed_messages() {
        assert_eq!(CoreError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(CoreError::UserExists.to_string(), "User already exists");
    }
}
