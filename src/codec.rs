//! Value Codec
//!
//! JSON encoding between caller types and the strings stores hold.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Encodes a value into its stored string form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a stored string, rejecting anything that does not parse as `T`.
pub fn decode<T: DeserializeOwned>(data: &str) -> Result<T> {
    Ok(serde_json::from_str(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u64,
        name: String,
        tags: Vec<String>,
        manager: Option<Box<Profile>>,
    }

    #[test]
    fn test_struct_roundtrip() {
        let profile = Profile {
            id: 7,
            name: "Ada".to_string(),
            tags: vec!["admin".to_string()],
            manager: Some(Box::new(Profile {
                id: 1,
                name: "Grace".to_string(),
                tags: vec![],
                manager: None,
            })),
        };

        let encoded = encode(&profile).unwrap();
        let decoded: Profile = decode(&encoded).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn test_map_roundtrip() {
        let mut scores = HashMap::new();
        scores.insert("a".to_string(), 1.5f64);
        scores.insert("b".to_string(), -2.0f64);

        let decoded: HashMap<String, f64> = decode(&encode(&scores).unwrap()).unwrap();
        assert_eq!(decoded, scores);
    }

    #[test]
    fn test_encoding_is_json() {
        assert_eq!(encode(&vec![1, 2, 3]).unwrap(), "[1,2,3]");
        assert_eq!(encode("hi").unwrap(), "\"hi\"");
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        let result = decode::<Profile>("{\"id\": 7");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let result = decode::<u64>("\"not a number\"");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_encode_rejects_non_string_map_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");

        let result = encode(&map);
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
