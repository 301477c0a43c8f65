//! Provider credential value object

use super::error::DomainError;

/// Secret used to authenticate against the completion provider.
///
/// The secret is only reachable through [`Credential::expose`]; `Debug` and
/// `Display` always render a redacted placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Result<Self, DomainError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(DomainError::EmptyCredential);
        }
        Ok(Self(secret))
    }

    /// Returns the raw secret for use in request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_is_redacted() {
        let credential = Credential::new("sk-secret").unwrap();
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.to_string(), "***");
        assert_eq!(credential.expose(), "sk-secret");
    }

    #[test]
    fn test_empty_credential_rejected() {
        assert_eq!(Credential::new("  "), Err(DomainError::EmptyCredential));
    }
}
