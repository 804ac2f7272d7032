use sha2::{Digest, Sha256};

/// Stable pseudonym for log lines: lowercase hex SHA-256 of the id.
pub fn anonymize_user_id(user_id: &str) -> String {
    hex::encode(Sha256::digest(user_id.as_bytes()))
}

/// Whether the consent flags allow keeping data for analytics.
pub fn should_retain_data(consent_flags: &serde_json::Value) -> bool {
    consent_flags
        .get("analytics")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymize_known_digest() {
        assert_eq!(
            anonymize_user_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_anonymize_is_stable_and_distinct() {
        let a = anonymize_user_id("user-1");
        assert_eq!(a, anonymize_user_id("user-1"));
        assert_ne!(a, anonymize_user_id("user-2"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_should_retain_data() {
        assert!(should_retain_data(&serde_json::json!({"analytics": true})));
        assert!(!should_retain_data(&serde_json::json!({"analytics": false})));
        assert!(!should_retain_data(&serde_json::json!({})));
    }
}
