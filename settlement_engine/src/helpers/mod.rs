mod order_number;
mod password;
mod subdomain;

pub use order_number::format_order_number;
pub use password::{hash_password, verify_password, PasswordHashError};
pub use subdomain::subdomain_candidate;

use rand::Rng;

/// Generates a random correlation id for a new payment intent, handed to the gateway before the
/// intent row exists.
pub fn new_correlation_id() -> String {
    let nonce: u64 = rand::thread_rng().gen();
    format!("gsp-{nonce:016x}")
}

/// Generates a random redeem code in the form `GSP-XXXX-XXXX-XXXX`. Ambiguous characters (0/O,
/// 1/I) are excluded since these codes are typed in by humans.
pub fn new_redeem_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let mut group = || -> String {
        (0..4).map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])).collect()
    };
    format!("GSP-{}-{}-{}", group(), group(), group())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn correlation_ids_are_unique_enough() {
        let a = new_correlation_id();
        let b = new_correlation_id();
        assert!(a.starts_with("gsp-"));
        assert_ne!(a, b);
    }

    #[test]
    fn redeem_codes_have_the_expected_shape() {
        for _ in 0..50 {
            let code = new_redeem_code();
            assert_eq!(code.len(), 18);
            assert!(code.starts_with("GSP-"));
            assert!(!code.contains('0') && !code.contains('O') && !code.contains('1') && !code.contains('I'));
        }
    }
}
