//! # Oracle Service
//!
//! Implements the two escrow operations over an injected [`LedgerView`]
//! and the in-process [`KeyVault`].

use crate::errors::OracleError;
use crate::ports::LedgerView;
use crate::vault::KeyVault;
use survey_types::{ContentHash, PartyId, SurveyState};
use tracing::{info, warn};

/// The key-escrow oracle.
pub struct Oracle<L: LedgerView> {
    ledger: L,
    vault: KeyVault,
}

impl<L: LedgerView> Oracle<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            vault: KeyVault::new(),
        }
    }

    /// Escrow a decryption key under a document hash. Called once by the
    /// issuer before the Issue transaction is submitted; idempotent for an
    /// identical key, rejected for a conflicting one.
    pub fn register(&self, content_hash: ContentHash, encoded_key: &str) -> Result<(), OracleError> {
        self.vault.register(content_hash, encoded_key)?;
        info!(%content_hash, "escrowed survey key");
        Ok(())
    }

    /// Release the escrowed key for `claimed` to `caller`, but only after
    /// independently re-deriving from committed ledger state that `caller`
    /// is the survey's current owner and that the claimed record is the
    /// current version.
    ///
    /// Any mismatch (unknown survey, stale version, wrong owner) is the
    /// hard [`OracleError::UnauthorizedKeyRequest`] rejection.
    pub async fn authorize(
        &self,
        claimed: &SurveyState,
        caller: PartyId,
    ) -> Result<String, OracleError> {
        let committed = self
            .ledger
            .current_survey(claimed.linear_id)
            .await?
            .ok_or_else(|| {
                warn!(caller = %caller, survey = %claimed.linear_id, "key requested for unknown survey");
                OracleError::UnauthorizedKeyRequest
            })?;

        if committed.owner != caller {
            warn!(
                caller = %caller,
                owner = %committed.owner,
                survey = %claimed.linear_id,
                "key requested by a party that is not the committed owner"
            );
            return Err(OracleError::UnauthorizedKeyRequest);
        }
        if committed.content_hash != claimed.content_hash {
            warn!(
                caller = %caller,
                survey = %claimed.linear_id,
                "key requested with a survey record that does not match committed state"
            );
            return Err(OracleError::UnauthorizedKeyRequest);
        }

        let key = self.vault.get(committed.content_hash)?;
        info!(caller = %caller, survey = %claimed.linear_id, "released escrowed key");
        Ok(key)
    }
}
