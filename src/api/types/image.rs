//! Wire types for the image endpoint

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryKey, Decision, DomainError, ImageIdentity, ImagePayload};

/// Body of a successful `GET /image/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageResponse {
    Reuse {
        #[serde(alias = "resuse_similar")]
        reuse_similar: ImageIdentity,
    },
    Payload {
        id: ImageIdentity,
        category: CategoryKey,
        /// Base64-encoded image bytes
        image_data: String,
    },
}

impl ImageResponse {
    pub fn from_domain(decision: &Decision) -> Self {
        match decision {
            Decision::Reuse { existing } => Self::Reuse {
                reuse_similar: existing.clone(),
            },
            Decision::Fetch(payload) => Self::Payload {
                id: payload.id.clone(),
                category: payload.category.clone(),
                image_data: STANDARD.encode(&payload.data),
            },
        }
    }

    pub fn into_domain(self) -> Result<Decision, DomainError> {
        match self {
            Self::Reuse { reuse_similar } => Ok(Decision::Reuse {
                existing: reuse_similar,
            }),
            Self::Payload {
                id,
                category,
                image_data,
            } => {
                let data = STANDARD.decode(image_data.as_bytes()).map_err(|e| {
                    DomainError::protocol(format!("Invalid base64 image data for {}: {}", id, e))
                })?;
                Ok(Decision::Fetch(ImagePayload::new(id, category, data)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuse_wire_format() {
        let response = ImageResponse::from_domain(&Decision::Reuse {
            existing: ImageIdentity::from_parts(1, 1),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"reuse_similar": "1_1"}));
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = ImagePayload::new(
            ImageIdentity::from_parts(2, 1),
            CategoryKey::new("shop", "shoes"),
            b"hello".to_vec(),
        );
        let json = serde_json::to_value(ImageResponse::from_domain(&Decision::Fetch(payload))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "2_1",
                "category": "shop - shoes",
                "image_data": "aGVsbG8="
            })
        );
    }

    #[test]
    fn test_decode_payload() {
        let response: ImageResponse = serde_json::from_str(
            r#"{"id": "2_1", "category": "shop - shoes", "image_data": "aGVsbG8="}"#,
        )
        .unwrap();

        match response.into_domain().unwrap() {
            Decision::Fetch(payload) => {
                assert_eq!(payload.data.as_ref(), b"hello");
                assert_eq!(payload.category, CategoryKey::new("shop", "shoes"));
            }
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_legacy_reuse_key() {
        let response: ImageResponse = serde_json::from_str(r#"{"resuse_similar": "1_1"}"#).unwrap();
        assert_eq!(
            response.into_domain().unwrap(),
            Decision::Reuse {
                existing: ImageIdentity::from_parts(1, 1)
            }
        );
    }

    #[test]
    fn test_decode_bad_base64_is_protocol_error() {
        let response = ImageResponse::Payload {
            id: ImageIdentity::from_parts(2, 1),
            category: CategoryKey::new("shop", "shoes"),
            image_data: "!!!".to_string(),
        };
        assert!(matches!(
            response.into_domain(),
            Err(DomainError::Protocol { .. })
        ));
    }
}
