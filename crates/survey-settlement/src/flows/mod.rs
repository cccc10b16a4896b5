//! Initiator-side flows, one per marketplace operation.
//!
//! Each flow builds a candidate locally, validates it, signs it, gathers
//! the remaining required signatures over peer sessions, submits to the
//! sequencer, and distributes the committed result. Failure anywhere
//! before the commit point settles nothing.

pub mod issue_survey;
pub mod request_key;
pub mod request_survey;
pub mod trade;

mod support;

pub use issue_survey::IssueSurveyFlow;
pub use request_key::RequestKeyFlow;
pub use request_survey::RequestSurveyFlow;
pub use trade::TradeFlow;
