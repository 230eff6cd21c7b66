use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{RngCore, rngs::OsRng};

/// Shareable referral code: 6 random bytes, base64url without padding,
/// which comes out as exactly 8 characters, upper-cased for readability.
pub fn make_referral_code() -> String {
    let mut bytes = [0u8; 6];
    OsRng.fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(bytes).to_uppercase()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::make_referral_code;

    #[test]
    fn test_length() {
        assert_eq!(make_referral_code().len(), 8);
    }

    #[test]
    fn test_url_safe_alphabet() {
        for _ in 0..50 {
            let code = make_referral_code();
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_'),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn test_codes_vary() {
        let codes: HashSet<String> = (0..100).map(|_| make_referral_code()).collect();

        assert_eq!(codes.len(), 100);
    }
}
