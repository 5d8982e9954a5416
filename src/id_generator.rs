//! Identifier generation for funnel documents
//! Ids look like "button-1718000000000-K3F9Q": the prefix names what was created,
//! followed by the creation time in milliseconds and a short base-36 random suffix

use chrono::Utc;
use std::collections::HashSet;
use ulid::Ulid;

const CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J',
    'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Number of base-36 digits in the random suffix
const SUFFIX_LEN: usize = 5;

/// Generate a new id of the form `prefix-timestamp-suffix`
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    // 80 random bits from a fresh ULID, truncated to what the suffix can hold
    let suffix = encode(Ulid::new().random() as u64, SUFFIX_LEN);
    format!("{}-{}-{}", prefix, millis, suffix)
}

/// Generate an id that does not collide with any id in `taken`
pub fn unique_id(prefix: &str, taken: &HashSet<String>) -> String {
    loop {
        let id = generate_id(prefix);
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// Encode a number to a fixed-length base-36 alphanumeric string
fn encode(mut num: u64, length: usize) -> String {
    let base = CHARS.len() as u64;
    let mut result = Vec::with_capacity(length);

    for _ in 0..length {
        let digit = (num % base) as usize;
        result.push(CHARS[digit]);
        num /= base;
    }

    result.reverse();
    result.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(0, 2), "00");
        assert_eq!(encode(35, 2), "0Z");
        assert_eq!(encode(36, 2), "10");
        // Digits beyond the requested length are dropped
        assert_eq!(encode(36 * 36, 2), "00");
    }

    #[test]
    fn test_id_shape() {
        let id = generate_id("button");
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "button");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }

    #[test]
    fn test_kebab_prefix_is_kept() {
        let id = generate_id("option-list");
        assert!(id.starts_with("option-list-"));
    }

    #[test]
    fn test_ids_differ_within_same_millisecond() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id("text")).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_unique_id_avoids_taken() {
        let mut taken = HashSet::new();
        for _ in 0..50 {
            let id = unique_id("page", &taken);
            assert!(!taken.contains(&id));
            taken.insert(id);
        }
        assert_eq!(taken.len(), 50);
    }
}
