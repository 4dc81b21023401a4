//! Shared-password gate for administrative operations

use crate::{Error, Result};
use sha2::{Digest, Sha256};

/// Checks the administrator password
///
/// There is one shared password and no sessions; every administrative
/// request presents it again.
#[derive(Clone)]
pub struct AdminGate {
    digest: Option<[u8; 32]>,
}

impl AdminGate {
    /// A gate with no password refuses everyone
    pub fn new(password: Option<&str>) -> Self {
        let digest = password
            .filter(|p| !p.is_empty())
            .map(|p| Sha256::digest(p.as_bytes()).into());
        Self { digest }
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Verify a presented password
    pub fn check(&self, attempt: &str) -> Result<()> {
        let Some(expected) = self.digest else {
            return Err(Error::Unauthorized);
        };
        let presented: [u8; 32] = Sha256::digest(attempt.as_bytes()).into();
        // Compare every byte so the time taken does not reveal the prefix.
        let diff = expected
            .iter()
            .zip(presented.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
