/// Cache key derivation
///
/// A fingerprint is a Sha256 digest over the canonical serialization of a
/// category plus its parameters (sorted by name). Deterministic and
/// order-independent with respect to parameter insertion order; sensitive to
/// every name, value, and the category itself. Collisions are an
/// accepted-but-unlikely failure mode, not actively guarded against.
use sha2::{Digest, Sha256};

use crate::types::{Category, ParameterSet};

pub fn fingerprint(category: Category, parameters: &ParameterSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update(category.as_str().as_bytes());

    for (name, value) in parameters.sorted_pairs() {
        hasher.update(b"\n");
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
    }

    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        let a = ParameterSet::from_pairs([("a", "1"), ("b", "2")]);
        let b = ParameterSet::from_pairs([("b", "2"), ("a", "1")]);

        assert_eq!(
            fingerprint(Category::Ticker, &a),
            fingerprint(Category::Ticker, &b)
        );
    }

    #[test]
    fn test_sensitive_to_values_names_and_category() {
        let base = ParameterSet::from_pairs([("symbol", "BTC/USDT")]);
        let other_value = ParameterSet::from_pairs([("symbol", "ETH/USDT")]);
        let other_name = ParameterSet::from_pairs([("pair", "BTC/USDT")]);

        let reference = fingerprint(Category::Ticker, &base);
        assert_ne!(reference, fingerprint(Category::Ticker, &other_value));
        assert_ne!(reference, fingerprint(Category::Ticker, &other_name));
        assert_ne!(reference, fingerprint(Category::Candles, &base));
    }

    #[test]
    fn test_stable_hex_output() {
        let params = ParameterSet::from_pairs([("symbol", "BTC/USDT")]);
        let fp = fingerprint(Category::Ticker, &params);

        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fingerprint(Category::Ticker, &params));
    }
}
