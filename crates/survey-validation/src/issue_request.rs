//! IssueRequest clauses: a requester pays a surveyor up front and opens a
//! pending survey request.
//!
//! `{cash(requester)} -> {cash(surveyor), request(pending)}`

use crate::errors::ValidationError;
use crate::require_signers;
use survey_types::{Amount, CashState, RequestStatus, StateRecord, Transaction};

pub(crate) fn check(tx: &Transaction) -> Result<(), ValidationError> {
    if tx.attachment.is_some() {
        return Err(ValidationError::UnexpectedAttachment);
    }

    // Shape: only cash in; exactly one request plus cash out.
    let input_cash = tx.inputs_of(StateRecord::as_cash);
    if input_cash.is_empty() {
        return Err(ValidationError::NoCashInput);
    }
    if input_cash.len() != tx.inputs.len() {
        return Err(ValidationError::ForeignStateKind);
    }

    let requests = tx.outputs_of(StateRecord::as_survey_request);
    let &[request] = requests.as_slice() else {
        return Err(ValidationError::ExpectedSingleRequestOutput);
    };
    let output_cash = tx.outputs_of(StateRecord::as_cash);
    if output_cash.is_empty() {
        return Err(ValidationError::NoCashOutput);
    }
    if output_cash.len() + 1 != tx.outputs.len() {
        return Err(ValidationError::ForeignStateKind);
    }

    // Price and lifecycle.
    if request.price == 0 {
        return Err(ValidationError::NonPositivePrice);
    }
    if request.status != RequestStatus::Pending {
        return Err(ValidationError::RequestNotPending);
    }

    // Conservation: the payment covers the price and nothing is minted.
    let consumed = cash_total(input_cash.iter().copied())?;
    let produced = cash_total(output_cash.iter().copied())?;
    if consumed < request.price {
        return Err(ValidationError::CashBelowPrice {
            consumed,
            price: request.price,
        });
    }
    if consumed != produced {
        return Err(ValidationError::CashNotConserved { consumed, produced });
    }

    // Ownership: requester funds, surveyor is paid.
    if input_cash.iter().any(|c| c.owner != request.requester) {
        return Err(ValidationError::InputCashNotOwnedByRequester);
    }
    if output_cash.iter().any(|c| c.owner != request.surveyor) {
        return Err(ValidationError::OutputCashNotOwnedBySurveyor);
    }

    require_signers(tx, &[request.requester, request.surveyor])
}

/// Sum cash amounts without silent wrap-around: amounts are peer-supplied,
/// so an overflowing total is a rejection, not a panic.
pub(crate) fn cash_total<'a, I>(cash: I) -> Result<Amount, ValidationError>
where
    I: IntoIterator<Item = &'a CashState>,
{
    cash.into_iter().try_fold(0u64, |total, c| {
        total
            .checked_add(c.amount)
            .ok_or(ValidationError::CashOverflow)
    })
}
