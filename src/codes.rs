use uuid::Uuid;

pub const RESERVATION_PREFIX: &str = "DIN";
pub const BILL_PREFIX: &str = "CUE";
pub const MAX_CODE_ATTEMPTS: usize = 100;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

/// `PREFIX-XXXXXX` drawn from the random bytes of a v4 UUID.
pub fn random_code(prefix: &str) -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let suffix: String = bytes
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
        .collect();
    format!("{prefix}-{suffix}")
}

pub fn is_well_formed(code: &str, prefix: &str) -> bool {
    match code.split_once('-') {
        Some((p, suffix)) => {
            p == prefix
                && suffix.len() == SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_prefix_and_alphabet() {
        for _ in 0..200 {
            let code = random_code(RESERVATION_PREFIX);
            assert!(is_well_formed(&code, RESERVATION_PREFIX), "{code}");
            assert!(!is_well_formed(&code, BILL_PREFIX));
        }
    }

    #[test]
    fn codes_rarely_collide() {
        let codes: HashSet<String> = (0..1000).map(|_| random_code(BILL_PREFIX)).collect();
        assert!(codes.len() > 995);
    }

    #[test]
    fn malformed_codes() {
        assert!(!is_well_formed("DIN-abc123", RESERVATION_PREFIX));
        assert!(!is_well_formed("DIN-ABC12", RESERVATION_PREFIX));
        assert!(!is_well_formed("DINABC123", RESERVATION_PREFIX));
    }
}
