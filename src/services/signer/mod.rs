//! Signing key resolution.
//!
//! Transaction assembly needs a signer for every account the message header
//! marks as required. [`SignerResolver`] is the seam between the client and
//! whatever holds the keys: an in-process keypair set here, a remote signing
//! backend behind the same trait elsewhere.

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

/// Maps required signer accounts to a signing capability.
pub trait SignerResolver: Send + Sync {
    /// Returns the signer holding `pubkey`, or `None` when the key is not held.
    fn resolve(&self, pubkey: &Pubkey) -> Option<&dyn Signer>;
}

/// Resolver backed by an in-process set of keypairs.
#[derive(Default)]
pub struct KeypairResolver {
    keys: HashMap<Pubkey, Keypair>,
}

impl KeypairResolver {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    /// Adds a keypair and returns its public key.
    pub fn insert(&mut self, keypair: Keypair) -> Pubkey {
        let pubkey = keypair.pubkey();
        self.keys.insert(pubkey, keypair);
        pubkey
    }

    pub fn contains(&self, pubkey: &Pubkey) -> bool {
        self.keys.contains_key(pubkey)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<Keypair> for KeypairResolver {
    fn from_iter<I: IntoIterator<Item = Keypair>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for keypair in iter {
            resolver.insert(keypair);
        }
        resolver
    }
}

impl SignerResolver for KeypairResolver {
    fn resolve(&self, pubkey: &Pubkey) -> Option<&dyn Signer> {
        self.keys.get(pubkey).map(|keypair| keypair as &dyn Signer)
    }
}

/// A lone keypair resolves only its own public key.
impl SignerResolver for Keypair {
    fn resolve(&self, pubkey: &Pubkey) -> Option<&dyn Signer> {
        if &self.pubkey() == pubkey {
            Some(self)
        } else {
            None
        }
    }
}
