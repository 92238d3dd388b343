//! Policy reference codes shown on the ban page (`PR-XXXXXXXX`)

use rand::Rng;

pub const POLICY_REFERENCE_PREFIX: &str = "PR-";

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 8;
const MIN_CODE_LEN: usize = 4;
const MAX_CODE_LEN: usize = 12;

/// Postgres regex equivalent of [`is_valid_policy_reference`]
pub const POLICY_REFERENCE_PATTERN: &str = "^PR-[A-Z0-9]{4,12}$";

/// Generate a random policy reference
pub fn generate_policy_reference() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{POLICY_REFERENCE_PREFIX}{code}")
}

/// `PR-` followed by 4-12 uppercase alphanumerics
pub fn is_valid_policy_reference(reference: &str) -> bool {
    reference
        .strip_prefix(POLICY_REFERENCE_PREFIX)
        .is_some_and(|code| {
            (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
                && code
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        })
}
