//! Node and edge id generation.

use jiff::Timestamp;
use uuid::Uuid;

/// Prefix used for ids of nodes dropped onto the canvas.
pub const DEFAULT_ID_PREFIX: &str = "node";

const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a fresh id of the form `{prefix}_{unix_millis}_{suffix}`.
///
/// The suffix is nine random lowercase alphanumerics.
pub fn generate_id(prefix: &str) -> String {
    let millis = Timestamp::now().as_millisecond();
    format!("{prefix}_{millis}_{}", random_suffix())
}

fn random_suffix() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(char::from(ALPHABET[(bits % 36) as usize]));
        bits /= 36;
    }
    suffix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id(DEFAULT_ID_PREFIX);
        let parts: Vec<_> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "node");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 9);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id("edge"), generate_id("edge"));
    }
}
