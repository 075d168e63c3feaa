use sha2::{Digest, Sha256};

/// Compare a presented key against the configured secret without leaking
/// the length of the matching prefix through timing.
pub fn verify_auth_key(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_match() {
        assert!(verify_auth_key("s3cret!@#", "s3cret!@#"));
    }

    #[test]
    fn rejects_mismatches() {
        assert!(!verify_auth_key("wrong", "s3cret"));
        assert!(!verify_auth_key("s3cre", "s3cret"));
        assert!(!verify_auth_key("s3cret ", "s3cret"));
        assert!(!verify_auth_key("", "s3cret"));
    }
}
