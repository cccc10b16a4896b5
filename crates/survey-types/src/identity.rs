//! # Principal Identity
//!
//! Every principal on the ledger (requester, surveyor, buyer, oracle) is
//! identified by its Ed25519 verifying key. Signing material never leaves
//! the owning process; only `PartyId` values travel inside states and
//! transactions.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A party identifier: the raw bytes of an Ed25519 verifying key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyId(pub [u8; 32]);

impl PartyId {
    /// Verify `signature` over `message` against this party's key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = Signature::from_bytes(signature);
        key.verify_strict(message, &sig).is_ok()
    }
}

impl fmt::Debug for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({})", self)
    }
}

impl fmt::Display for PartyId {
    /// Abbreviated hex form (first four bytes), enough for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…")
    }
}

/// Signing identity held by a running principal.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Derive a keypair from 32 seed bytes.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// The ledger-visible identity of this keypair.
    pub fn party_id(&self) -> PartyId {
        PartyId(self.signing.verifying_key().to_bytes())
    }

    /// Sign `message`, returning the detached 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print signing material.
        write!(f, "Keypair({})", self.party_id())
    }
}
