//! Outbound (driven) port: the oracle's own view of committed ledger state.
//!
//! Ownership decisions are derived exclusively through this trait, never
//! from records a caller sends along with its request.

use crate::errors::OracleError;
use async_trait::async_trait;
use survey_types::{LinearId, SurveyState};

/// Read access to the committed ledger as this oracle observes it.
#[async_trait]
pub trait LedgerView: Send + Sync {
    /// The current committed version of the survey with this logical id,
    /// or `None` if no such survey has been committed (or it has been
    /// consumed without a successor, which cannot happen for surveys).
    async fn current_survey(&self, linear_id: LinearId) -> Result<Option<SurveyState>, OracleError>;
}
