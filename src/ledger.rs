//! In-memory credit ledger keyed by API key.
//!
//! Balances live only as long as the process. The ledger is owned by the
//! application state and handed to handlers, never a global.

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::config::KeyGrant;
use crate::error::Rejected;

/// Proof that `CreditLedger::authorize` accepted a key. Only the ledger can
/// mint one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedKey(String);

impl ApprovedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short fingerprint safe to log in place of the key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

pub struct CreditLedger {
    credits: DashMap<String, u64>, // key -> remaining credits
}

impl CreditLedger {
    /// Builds the ledger from configured grants; a later grant for the same
    /// key replaces an earlier one.
    pub fn from_grants<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = KeyGrant>,
    {
        let credits = DashMap::new();
        for grant in grants {
            credits.insert(grant.key, grant.credits);
        }
        Self { credits }
    }

    /// Read-only gate check. A missing key counts as zero credits.
    pub fn authorize(&self, key: Option<&str>) -> Result<ApprovedKey, Rejected> {
        let key = key.ok_or(Rejected)?;
        let credits = self.balance(key).unwrap_or(0);
        if credits == 0 {
            return Err(Rejected);
        }
        Ok(ApprovedKey(key.to_string()))
    }

    /// Spends one credit and returns what is left.
    ///
    /// The balance is re-checked under the entry lock, so concurrent callers
    /// holding approvals for the same key can never drive it below zero: the
    /// loser of the race gets `Rejected`.
    pub fn consume(&self, key: &ApprovedKey) -> Result<u64, Rejected> {
        let mut entry = self.credits.get_mut(key.as_str()).ok_or(Rejected)?;
        if *entry == 0 {
            return Err(Rejected);
        }
        *entry -= 1;
        Ok(*entry)
    }

    pub fn balance(&self, key: &str) -> Option<u64> {
        self.credits.get(key).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.credits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }
}

// first 8 bytes of sha256, hex encoded
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ledger(pairs: &[(&str, u64)]) -> CreditLedger {
        CreditLedger::from_grants(pairs.iter().map(|(key, credits)| KeyGrant {
            key: key.to_string(),
            credits: *credits,
        }))
    }

    #[test]
    fn unknown_and_missing_keys_are_rejected() {
        let ledger = ledger(&[("abc", 5)]);
        assert_eq!(ledger.authorize(Some("xyz")), Err(Rejected));
        assert_eq!(ledger.authorize(Some("")), Err(Rejected));
        assert_eq!(ledger.authorize(None), Err(Rejected));
        assert_eq!(ledger.balance("abc"), Some(5));
        assert_eq!(ledger.balance("xyz"), None);
    }

    #[test]
    fn zero_balance_is_rejected() {
        let ledger = ledger(&[("abc", 0)]);
        assert_eq!(ledger.authorize(Some("abc")), Err(Rejected));
    }

    #[test]
    fn authorize_has_no_side_effect() {
        let ledger = ledger(&[("abc", 2)]);
        for _ in 0..10 {
            ledger.authorize(Some("abc")).unwrap();
        }
        assert_eq!(ledger.balance("abc"), Some(2));
    }

    #[test]
    fn exactly_n_consumptions_then_rejected() {
        let ledger = ledger(&[("abc", 5)]);
        for expected in (0..5).rev() {
            let approved = ledger.authorize(Some("abc")).unwrap();
            assert_eq!(ledger.consume(&approved), Ok(expected));
        }
        assert_eq!(ledger.authorize(Some("abc")), Err(Rejected));
        assert_eq!(ledger.balance("abc"), Some(0));
    }

    #[test]
    fn stale_approval_cannot_overdraw() {
        let ledger = ledger(&[("abc", 1)]);
        let first = ledger.authorize(Some("abc")).unwrap();
        let second = ledger.authorize(Some("abc")).unwrap();

        assert_eq!(ledger.consume(&first), Ok(0));
        assert_eq!(ledger.consume(&second), Err(Rejected));
        assert_eq!(ledger.balance("abc"), Some(0));
    }

    #[test]
    fn later_grant_wins() {
        let ledger = ledger(&[("abc", 5), ("abc", 1), ("xyz", 3)]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.balance("abc"), Some(1));
    }

    #[test]
    fn concurrent_consumers_never_exceed_budget() {
        let ledger = Arc::new(ledger(&[("abc", 50)]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let mut spent = 0;
                    for _ in 0..20 {
                        if let Ok(approved) = ledger.authorize(Some("abc")) {
                            if ledger.consume(&approved).is_ok() {
                                spent += 1;
                            }
                        }
                    }
                    spent
                })
            })
            .collect();

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(ledger.balance("abc"), Some(0));
    }

    #[test]
    fn fingerprint_hides_key() {
        let fp = fingerprint("super-secret");
        assert_eq!(fp.len(), 16);
        assert!(!fp.contains("secret"));
        assert_eq!(fp, fingerprint("super-secret"));
    }
}
