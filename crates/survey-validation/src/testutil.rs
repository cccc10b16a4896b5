//! Shared builders for validation tests: a cast of parties and one valid
//! candidate per command that individual tests then mutate to hit a clause.

use std::collections::BTreeSet;
use survey_types::{
    Amount, Attachment, CashState, Command, ContentHash, LinearId, PartyId, RequestStatus,
    StateEntry, StateRecord, StateRef, SurveyKeyState, SurveyRequestState, SurveyState,
    Transaction, TxId,
};

use crate::{issuer_share, owner_share};

pub(crate) struct Fixture {
    pub requester: PartyId,
    pub surveyor: PartyId,
    pub buyer: PartyId,
    pub land_title_id: String,
    pub content_hash: ContentHash,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            requester: PartyId([1u8; 32]),
            surveyor: PartyId([2u8; 32]),
            buyer: PartyId([3u8; 32]),
            land_title_id: "L1".to_string(),
            content_hash: ContentHash::of(b"sealed survey report"),
        }
    }

    pub fn entry(&self, index: u32, record: StateRecord) -> StateEntry {
        StateEntry {
            ref_: StateRef {
                txid: TxId([0xEE; 32]),
                index,
            },
            record,
        }
    }

    pub fn cash(&self, owner: PartyId, amount: Amount) -> StateRecord {
        StateRecord::Cash(CashState {
            owner,
            amount,
            linear_id: LinearId::fresh(),
        })
    }

    pub fn pending_request(&self, price: Amount) -> SurveyRequestState {
        SurveyRequestState {
            requester: self.requester,
            surveyor: self.surveyor,
            land_title_id: self.land_title_id.clone(),
            price,
            status: RequestStatus::Pending,
            linear_id: LinearId::fresh(),
        }
    }

    pub fn survey(&self, owner: PartyId, price: Amount) -> SurveyState {
        SurveyState {
            issuer: self.surveyor,
            owner,
            land_title_id: self.land_title_id.clone(),
            survey_date: "2018-03-14".to_string(),
            property_address: "1 Acacia Avenue".to_string(),
            initial_price: price,
            resale_price: price,
            content_hash: self.content_hash,
            linear_id: LinearId::fresh(),
        }
    }

    pub fn survey_key(&self, owner: PartyId) -> SurveyKeyState {
        SurveyKeyState {
            surveyor: self.surveyor,
            owner,
            content_hash: self.content_hash,
            encoded_key: "base64:0123abcd".to_string(),
            linear_id: LinearId::fresh(),
        }
    }

    /// Valid IssueRequest: requester pays `price` to the surveyor and opens
    /// a pending request.
    pub fn issue_request_candidate(&self, price: Amount) -> Transaction {
        Transaction {
            inputs: vec![self.entry(0, self.cash(self.requester, price))],
            outputs: vec![
                StateRecord::Cash(CashState {
                    owner: self.surveyor,
                    amount: price,
                    linear_id: LinearId::fresh(),
                }),
                StateRecord::SurveyRequest(self.pending_request(price)),
            ],
            command: Command::IssueRequest,
            signers: signer_set(&[self.requester, self.surveyor]),
            attachment: None,
        }
    }

    /// Valid Issue against a pending request at `price`.
    pub fn issue_candidate(&self, price: Amount) -> Transaction {
        let request = self.pending_request(price);
        let survey = self.survey(self.requester, price);
        let key = self.survey_key(self.requester);
        let completed = SurveyRequestState {
            status: RequestStatus::Complete,
            ..request.clone()
        };
        Transaction {
            inputs: vec![self.entry(0, StateRecord::SurveyRequest(request))],
            outputs: vec![
                StateRecord::Survey(survey),
                StateRecord::SurveyKey(key),
                StateRecord::SurveyRequest(completed),
            ],
            command: Command::Issue,
            signers: signer_set(&[self.surveyor, self.requester]),
            attachment: Some(Attachment {
                content_hash: self.content_hash,
            }),
        }
    }

    /// Valid Trade: `self.requester` sells the survey to `self.buyer` at
    /// the resale price, split 80/20 between prior owner and issuer.
    pub fn trade_candidate(&self, resale: Amount) -> Transaction {
        let survey_in = self.survey(self.requester, resale);
        let key_in = self.survey_key(self.requester);
        let survey_out = SurveyState {
            owner: self.buyer,
            ..survey_in.clone()
        };
        let key_out = SurveyKeyState {
            owner: self.buyer,
            ..key_in.clone()
        };
        Transaction {
            inputs: vec![
                self.entry(0, StateRecord::Survey(survey_in)),
                self.entry(1, StateRecord::SurveyKey(key_in)),
                self.entry(2, self.cash(self.buyer, resale)),
            ],
            outputs: vec![
                StateRecord::Survey(survey_out),
                StateRecord::SurveyKey(key_out),
                StateRecord::Cash(CashState {
                    owner: self.requester,
                    amount: owner_share(resale),
                    linear_id: LinearId::fresh(),
                }),
                StateRecord::Cash(CashState {
                    owner: self.surveyor,
                    amount: issuer_share(resale),
                    linear_id: LinearId::fresh(),
                }),
            ],
            command: Command::Trade,
            signers: signer_set(&[self.requester, self.surveyor, self.buyer]),
            attachment: None,
        }
    }
}

pub(crate) fn signer_set(parties: &[PartyId]) -> BTreeSet<PartyId> {
    parties.iter().copied().collect()
}
