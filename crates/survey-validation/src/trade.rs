//! Trade clauses: transfer of a survey and its escrowed key to a new owner
//! against payment, split deterministically between the prior owner and
//! the original issuer.
//!
//! `{survey, key, cash(buyer)} -> {survey', key', cash(owner), cash(issuer)}`
//!
//! The split is computed on the resale price, not the paid amount; the
//! conservation clause pins the paid amount to the resale price exactly,
//! so overpayment cannot slip through.

use crate::errors::ValidationError;
use crate::issue_request::cash_total;
use crate::require_signers;
use survey_types::{Amount, StateRecord, Transaction};

/// The original issuer's cut of every resale: 20% of the resale price,
/// integer exact.
pub fn issuer_share(resale_price: Amount) -> Amount {
    resale_price / 5
}

/// The prior owner's cut: the resale price minus the issuer share, so the
/// two always sum to the full price.
pub fn owner_share(resale_price: Amount) -> Amount {
    resale_price - issuer_share(resale_price)
}

pub(crate) fn check(tx: &Transaction) -> Result<(), ValidationError> {
    if tx.attachment.is_some() {
        return Err(ValidationError::UnexpectedAttachment);
    }

    // Shape: one survey + one key + buyer cash in; one survey + one key +
    // exactly two cash out.
    let &[survey_in] = tx.inputs_of(StateRecord::as_survey).as_slice() else {
        return Err(ValidationError::ExpectedSingleSurveyInput);
    };
    let &[key_in] = tx.inputs_of(StateRecord::as_survey_key).as_slice() else {
        return Err(ValidationError::ExpectedSingleKeyInput);
    };
    let input_cash = tx.inputs_of(StateRecord::as_cash);
    if input_cash.is_empty() {
        return Err(ValidationError::NoCashInput);
    }
    if tx.inputs.len() != 2 + input_cash.len() {
        return Err(ValidationError::ForeignStateKind);
    }

    let &[survey_out] = tx.outputs_of(StateRecord::as_survey).as_slice() else {
        return Err(ValidationError::ExpectedSingleSurveyOutput);
    };
    let &[key_out] = tx.outputs_of(StateRecord::as_survey_key).as_slice() else {
        return Err(ValidationError::ExpectedSingleKeyOutput);
    };
    let output_cash = tx.outputs_of(StateRecord::as_cash);
    if output_cash.len() != 2 {
        return Err(ValidationError::ExpectedTwoCashOutputs);
    }
    if tx.outputs.len() != 4 {
        return Err(ValidationError::ForeignStateKind);
    }

    // Tamper evidence: the content hash never changes hands altered.
    if survey_out.content_hash != survey_in.content_hash {
        return Err(ValidationError::ContentHashChanged);
    }

    // The key moves in lock-step with the survey.
    let lock_step = key_in.content_hash == survey_in.content_hash
        && key_out.content_hash == survey_out.content_hash
        && key_out.owner == survey_out.owner;
    if !lock_step {
        return Err(ValidationError::KeyNotInLockStep);
    }

    // Continuity: only the owner changes between versions.
    let survey_continuity = survey_out.linear_id == survey_in.linear_id
        && survey_out.issuer == survey_in.issuer
        && survey_out.land_title_id == survey_in.land_title_id
        && survey_out.survey_date == survey_in.survey_date
        && survey_out.property_address == survey_in.property_address
        && survey_out.initial_price == survey_in.initial_price
        && survey_out.resale_price == survey_in.resale_price;
    if !survey_continuity {
        return Err(ValidationError::SurveyContinuityBroken);
    }
    let key_continuity = key_out.linear_id == key_in.linear_id
        && key_out.surveyor == key_in.surveyor
        && key_out.encoded_key == key_in.encoded_key;
    if !key_continuity {
        return Err(ValidationError::KeyContinuityBroken);
    }

    if survey_out.owner == survey_in.owner {
        return Err(ValidationError::SelfTrade);
    }

    // The buyer funds the trade with its own cash, exactly at price.
    if input_cash.iter().any(|c| c.owner != survey_out.owner) {
        return Err(ValidationError::InputCashNotOwnedByBuyer);
    }
    let consumed = cash_total(input_cash.iter().copied())?;
    let resale = survey_in.resale_price;
    if consumed != resale {
        return Err(ValidationError::CashNotExactPrice {
            consumed,
            price: resale,
        });
    }

    // Deterministic split on the resale price. When the prior owner is
    // also the issuer both shares flow to the same party.
    let to_prior_owner = cash_total(
        output_cash
            .iter()
            .copied()
            .filter(|c| c.owner == survey_in.owner),
    )?;
    let to_issuer = cash_total(
        output_cash
            .iter()
            .copied()
            .filter(|c| c.owner == survey_in.issuer),
    )?;
    if survey_in.owner == survey_in.issuer {
        if to_prior_owner != resale {
            return Err(ValidationError::WrongOwnerShare {
                expected: resale,
                got: to_prior_owner,
            });
        }
    } else {
        if to_prior_owner != owner_share(resale) {
            return Err(ValidationError::WrongOwnerShare {
                expected: owner_share(resale),
                got: to_prior_owner,
            });
        }
        if to_issuer != issuer_share(resale) {
            return Err(ValidationError::WrongIssuerShare {
                expected: issuer_share(resale),
                got: to_issuer,
            });
        }
    }

    require_signers(tx, &[survey_in.owner, survey_in.issuer, survey_out.owner])
}
