//! Issue clauses: a surveyor mints the survey record, its escrowed key and
//! the completed request against a pending survey request.
//!
//! `{request(pending)} -> {survey, key, request(complete)}`
//!
//! The attached sealed document is part of the contract: an Issue whose
//! document is missing, or whose hash does not bind to the survey record,
//! is rejected outright regardless of every other clause.

use crate::errors::ValidationError;
use crate::require_signers;
use survey_types::{RequestStatus, StateRecord, Transaction};

pub(crate) fn check(tx: &Transaction) -> Result<(), ValidationError> {
    // Shape: exactly the pending request in, exactly survey + key +
    // completed request out.
    if tx.inputs.len() != 1 {
        return Err(ValidationError::ExpectedSingleRequestInput);
    }
    let request_in = tx.inputs[0]
        .record
        .as_survey_request()
        .ok_or(ValidationError::ExpectedSingleRequestInput)?;
    if request_in.status != RequestStatus::Pending {
        return Err(ValidationError::ConsumedRequestNotPending);
    }

    if tx.outputs.len() != 3 {
        return Err(ValidationError::WrongIssueOutputs);
    }
    let &[survey] = tx.outputs_of(StateRecord::as_survey).as_slice() else {
        return Err(ValidationError::WrongIssueOutputs);
    };
    let &[key] = tx.outputs_of(StateRecord::as_survey_key).as_slice() else {
        return Err(ValidationError::WrongIssueOutputs);
    };
    let &[request_out] = tx.outputs_of(StateRecord::as_survey_request).as_slice() else {
        return Err(ValidationError::WrongIssueOutputs);
    };

    // Issuance pricing: positive, and no markup at minting.
    if survey.initial_price == 0 {
        return Err(ValidationError::NonPositiveInitialPrice);
    }
    if survey.initial_price != survey.resale_price {
        return Err(ValidationError::InitialResaleMismatch {
            initial: survey.initial_price,
            resale: survey.resale_price,
        });
    }

    // Request lifecycle: flipped to complete, otherwise unchanged.
    if request_out.status != RequestStatus::Complete {
        return Err(ValidationError::RequestNotComplete);
    }
    let continuity_intact = request_out.linear_id == request_in.linear_id
        && request_out.requester == request_in.requester
        && request_out.surveyor == request_in.surveyor
        && request_out.land_title_id == request_in.land_title_id
        && request_out.price == request_in.price;
    if !continuity_intact {
        return Err(ValidationError::RequestContinuityBroken);
    }

    // The minted survey answers the consumed request.
    if survey.owner != request_in.requester {
        return Err(ValidationError::OwnerNotRequester);
    }
    if survey.issuer != request_in.surveyor {
        return Err(ValidationError::IssuerNotSurveyor);
    }
    if survey.land_title_id != request_in.land_title_id {
        return Err(ValidationError::LandTitleMismatch);
    }
    if survey.initial_price != request_in.price {
        return Err(ValidationError::PriceMismatch {
            requested: request_in.price,
            initial: survey.initial_price,
        });
    }

    // Key pairing: the key is minted bound to this survey and its owner.
    let key_paired = key.content_hash == survey.content_hash
        && key.surveyor == survey.issuer
        && key.owner == survey.owner;
    if !key_paired {
        return Err(ValidationError::KeyNotInLockStep);
    }

    // The sealed document must be attached and must bind to the record.
    match tx.attachment {
        Some(att) if att.content_hash == survey.content_hash => {}
        _ => return Err(ValidationError::DocumentMissingOrHashMismatch),
    }

    require_signers(tx, &[survey.issuer, survey.owner])
}
