//! Transaction references correlating a gateway payment with its return
//! redirect.
//!
//! Format: `tx-<unix millis>-<13 lowercase base36 chars>`.

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_LEN: usize = 13;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fresh reference for the current instant.
#[must_use]
pub fn new_tx_ref() -> String {
    tx_ref_at(Utc::now(), &mut rand::rng())
}

/// A reference for `now` with a suffix drawn from `rng`.
#[must_use]
pub fn tx_ref_at<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("tx-{}-{suffix}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    use super::*;

    #[test]
    fn matches_expected_shape() {
        let re = Regex::new(r"^tx-[0-9]+-[0-9a-z]{13}$").unwrap();
        for _ in 0..50 {
            let tx_ref = new_tx_ref();
            assert!(re.is_match(&tx_ref), "unexpected tx_ref: {tx_ref}");
        }
    }

    #[test]
    fn embeds_unix_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let tx_ref = tx_ref_at(now, &mut StdRng::seed_from_u64(7));
        assert!(tx_ref.starts_with("tx-1700000000123-"));
    }

    #[test]
    fn same_seed_same_suffix() {
        let now = Utc::now();
        let a = tx_ref_at(now, &mut StdRng::seed_from_u64(42));
        let b = tx_ref_at(now, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn consecutive_references_differ() {
        assert_ne!(new_tx_ref(), new_tx_ref());
    }
}
