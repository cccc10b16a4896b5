//! # Transaction Container
//!
//! An atomic bundle of consumed states, produced states, one command, the
//! set of required signers, and optionally a reference to a sealed
//! document. A transaction is never mutated after construction; when a
//! candidate is abandoned, a new candidate replaces it.
//!
//! The transaction id is a SHA-256 digest over a canonical field-by-field
//! encoding of the body (resolved inputs included, so a countersigner
//! attests to exactly the state versions it re-validated).

use crate::identity::{Keypair, PartyId};
use crate::states::{StateRecord, ContentHash};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A 32-byte transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…")
    }
}

/// Reference to one produced state of a committed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub txid: TxId,
    pub index: u32,
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.txid, self.index)
    }
}

/// A resolved input: the reference plus the record it pointed at when the
/// candidate was built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub ref_: StateRef,
    pub record: StateRecord,
}

/// The fixed, closed command set. Dispatch is by sum type; there is no
/// generic scripting surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Pay a surveyor and open a pending survey request.
    IssueRequest,
    /// Mint a survey plus its escrowed key against a pending request.
    Issue,
    /// Transfer a survey and its key to a new owner against payment.
    Trade,
}

/// Reference to a sealed document in the document store. Validation sees
/// only the hash; the ciphertext itself never enters a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_hash: ContentHash,
}

/// An atomic state transition candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<StateEntry>,
    pub outputs: Vec<StateRecord>,
    pub command: Command,
    pub signers: BTreeSet<PartyId>,
    pub attachment: Option<Attachment>,
}

impl Transaction {
    /// Canonical id of this candidate.
    pub fn id(&self) -> TxId {
        let mut hasher = Sha256::new();
        hasher.update((self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.ref_.txid.0);
            hasher.update(input.ref_.index.to_le_bytes());
            input.record.absorb(&mut hasher);
        }
        hasher.update((self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            output.absorb(&mut hasher);
        }
        hasher.update([match self.command {
            Command::IssueRequest => 0x10u8,
            Command::Issue => 0x11,
            Command::Trade => 0x12,
        }]);
        for signer in &self.signers {
            hasher.update(signer.0);
        }
        match &self.attachment {
            Some(att) => {
                hasher.update([1u8]);
                hasher.update(att.content_hash.0);
            }
            None => hasher.update([0u8]),
        }
        TxId(hasher.finalize().into())
    }

    /// Input records of a given downcast, in input order.
    pub fn inputs_of<'a, T, F>(&'a self, downcast: F) -> Vec<&'a T>
    where
        F: Fn(&'a StateRecord) -> Option<&'a T>,
    {
        self.inputs
            .iter()
            .filter_map(|e| downcast(&e.record))
            .collect()
    }

    /// Output records of a given downcast, in output order.
    pub fn outputs_of<'a, T, F>(&'a self, downcast: F) -> Vec<&'a T>
    where
        F: Fn(&'a StateRecord) -> Option<&'a T>,
    {
        self.outputs.iter().filter_map(downcast).collect()
    }
}

/// Transaction container errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TxError {
    /// A signature was produced by a party outside the required signer set.
    #[error("Signer {0} is not a required signer of this transaction")]
    UnknownSigner(PartyId),

    /// A collected signature does not verify over the transaction id.
    #[error("Invalid signature from {0}")]
    InvalidSignature(PartyId),

    /// A required signer has not signed yet.
    #[error("Missing signature from required signer {0}")]
    MissingSignature(PartyId),

    /// A commit receipt that the sequencer never signed.
    #[error("Commit receipt for {0} is not attested by the sequencer")]
    ForgedReceipt(TxId),
}

/// A detached signature by one required signer over the transaction id.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySignature {
    pub signer: PartyId,
    #[serde_as(as = "Bytes")]
    pub signature: [u8; 64],
}

/// A transaction body plus the signatures collected so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<PartySignature>,
}

impl SignedTransaction {
    /// Wrap an unsigned candidate.
    pub fn unsigned(transaction: Transaction) -> Self {
        Self {
            transaction,
            signatures: Vec::new(),
        }
    }

    pub fn id(&self) -> TxId {
        self.transaction.id()
    }

    /// Append this keypair's signature. Idempotent for the same signer;
    /// rejects signers outside the required set.
    pub fn sign_with(&mut self, keypair: &Keypair) -> Result<(), TxError> {
        let signer = keypair.party_id();
        if !self.transaction.signers.contains(&signer) {
            return Err(TxError::UnknownSigner(signer));
        }
        if self.signatures.iter().any(|s| s.signer == signer) {
            return Ok(());
        }
        let signature = keypair.sign(&self.id().0);
        self.signatures.push(PartySignature { signer, signature });
        Ok(())
    }

    /// Merge a countersignature received from a peer, verifying it first.
    pub fn merge(&mut self, sig: PartySignature) -> Result<(), TxError> {
        if !self.transaction.signers.contains(&sig.signer) {
            return Err(TxError::UnknownSigner(sig.signer));
        }
        if !sig.signer.verify(&self.id().0, &sig.signature) {
            return Err(TxError::InvalidSignature(sig.signer));
        }
        if !self.signatures.iter().any(|s| s.signer == sig.signer) {
            self.signatures.push(sig);
        }
        Ok(())
    }

    /// Verify every collected signature against the transaction id and the
    /// required signer set.
    pub fn verify_signatures(&self) -> Result<(), TxError> {
        let id = self.id();
        for sig in &self.signatures {
            if !self.transaction.signers.contains(&sig.signer) {
                return Err(TxError::UnknownSigner(sig.signer));
            }
            if !sig.signer.verify(&id.0, &sig.signature) {
                return Err(TxError::InvalidSignature(sig.signer));
            }
        }
        Ok(())
    }

    /// Check that every required signer has a valid signature.
    pub fn require_fully_signed(&self) -> Result<(), TxError> {
        self.verify_signatures()?;
        for required in &self.transaction.signers {
            if !self.signatures.iter().any(|s| s.signer == *required) {
                return Err(TxError::MissingSignature(*required));
            }
        }
        Ok(())
    }

    /// The signers still missing from the collected set.
    pub fn missing_signers(&self) -> Vec<PartyId> {
        self.transaction
            .signers
            .iter()
            .filter(|required| !self.signatures.iter().any(|s| s.signer == **required))
            .copied()
            .collect()
    }
}

/// The sequencer's acceptance of a transaction: the commit point.
///
/// Only the sequencer can mint a receipt: it signs the receipt body with
/// its own key, and every node verifies that signature before treating a
/// transaction as committed. A receipt nobody can verify is a forgery,
/// however many party signatures the transaction itself carries.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub txid: TxId,
    /// Position in the sequencer's total order.
    pub sequence: u64,
    /// Unix timestamp (seconds) of acceptance.
    pub committed_at: u64,
    /// The sequencer's signature over the receipt body.
    #[serde_as(as = "Bytes")]
    pub signature: [u8; 64],
}

impl CommitReceipt {
    fn signed_bytes(txid: TxId, sequence: u64, committed_at: u64) -> [u8; 48] {
        let mut bytes = [0u8; 48];
        bytes[..32].copy_from_slice(&txid.0);
        bytes[32..40].copy_from_slice(&sequence.to_le_bytes());
        bytes[40..].copy_from_slice(&committed_at.to_le_bytes());
        bytes
    }

    /// Issue a receipt signed with the sequencer's key.
    pub fn attest(txid: TxId, sequence: u64, committed_at: u64, sequencer: &Keypair) -> Self {
        let signature = sequencer.sign(&Self::signed_bytes(txid, sequence, committed_at));
        Self {
            txid,
            sequence,
            committed_at,
            signature,
        }
    }

    /// Check that `sequencer` signed this receipt.
    pub fn verify(&self, sequencer: PartyId) -> Result<(), TxError> {
        let bytes = Self::signed_bytes(self.txid, self.sequence, self.committed_at);
        if sequencer.verify(&bytes, &self.signature) {
            Ok(())
        } else {
            Err(TxError::ForgedReceipt(self.txid))
        }
    }
}

/// A transaction that the sequencer has accepted; part of committed history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedTransaction {
    pub tx: SignedTransaction,
    pub receipt: CommitReceipt,
}

impl CommittedTransaction {
    pub fn id(&self) -> TxId {
        self.receipt.txid
    }

    /// Check that this commit actually happened: the receipt names this
    /// very transaction, carries `sequencer`'s signature, and the
    /// transaction is fully signed by its required signers.
    pub fn verify_attested(&self, sequencer: PartyId) -> Result<(), TxError> {
        if self.receipt.txid != self.tx.id() {
            return Err(TxError::ForgedReceipt(self.receipt.txid));
        }
        self.receipt.verify(sequencer)?;
        self.tx.require_fully_signed()
    }

    /// Address every produced state of this transaction.
    pub fn produced_entries(&self) -> Vec<StateEntry> {
        let txid = self.id();
        self.tx
            .transaction
            .outputs
            .iter()
            .enumerate()
            .map(|(index, record)| StateEntry {
                ref_: StateRef {
                    txid,
                    index: index as u32,
                },
                record: record.clone(),
            })
            .collect()
    }

    /// Every party entitled to a committed copy: required signers plus all
    /// state participants, including pure observers.
    pub fn participants(&self) -> BTreeSet<PartyId> {
        let tx = &self.tx.transaction;
        let mut parties: BTreeSet<PartyId> = tx.signers.iter().copied().collect();
        for entry in &tx.inputs {
            parties.extend(entry.record.participants());
        }
        for output in &tx.outputs {
            parties.extend(output.participants());
        }
        parties
    }
}
