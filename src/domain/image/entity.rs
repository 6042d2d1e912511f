//! Image identity and category types

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Whether `value` can stand as a single file-system path segment
fn is_path_segment(value: &str) -> bool {
    value != "." && value != ".." && !value.contains(['/', '\\', '\0'])
}

/// Image identifier in the form `{article}_{image}`
///
/// Ordering is the plain string ordering of the serialized form, which is
/// what reuse tie-breaks rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageIdentity(String);

impl ImageIdentity {
    /// Create an identity after validating the `{article}_{image}` shape
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        match id.rsplit_once('_') {
            Some((article, image)) if !article.is_empty() && !image.is_empty() => {
                if is_path_segment(&id) {
                    Ok(Self(id))
                } else {
                    Err(DomainError::validation(format!(
                        "Image id '{}' contains path separators",
                        id
                    )))
                }
            }
            _ => Err(DomainError::validation(format!(
                "Image id '{}' must look like '{{article}}_{{image}}'",
                id
            ))),
        }
    }

    /// Build an identity from its two components
    pub fn from_parts(article: impl fmt::Display, image: impl fmt::Display) -> Self {
        Self(format!("{}_{}", article, image))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Article part; images sharing it are views of the same article
    pub fn article(&self) -> &str {
        self.0.rsplit_once('_').map(|(a, _)| a).unwrap_or(&self.0)
    }

    pub fn image_number(&self) -> &str {
        self.0.rsplit_once('_').map(|(_, i)| i).unwrap_or("")
    }

    pub fn same_article(&self, other: &ImageIdentity) -> bool {
        self.article() == other.article()
    }
}

impl TryFrom<String> for ImageIdentity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageIdentity> for String {
    fn from(id: ImageIdentity) -> Self {
        id.0
    }
}

impl FromStr for ImageIdentity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const CATEGORY_SEPARATOR: &str = " - ";

/// Category partition `(website, category)`, serialized as `"{website} - {category}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryKey {
    website: String,
    category: String,
}

impl CategoryKey {
    pub fn new(website: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            category: category.into(),
        }
    }

    /// Parse the `"{website} - {category}"` form
    ///
    /// Both parts name directories on disk, so `.`, `..` and path
    /// separators are rejected.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.split_once(CATEGORY_SEPARATOR) {
            Some((website, category)) if !website.trim().is_empty() && !category.trim().is_empty() => {
                let (website, category) = (website.trim(), category.trim());
                if !is_path_segment(website) || !is_path_segment(category) {
                    return Err(DomainError::validation(format!(
                        "Category '{}' must not contain '.', '..' or path separators",
                        value
                    )));
                }
                Ok(Self::new(website, category))
            }
            _ => Err(DomainError::validation(format!(
                "Category '{}' must look like '{{website}}{}{{category}}'",
                value, CATEGORY_SEPARATOR
            ))),
        }
    }

    pub fn website(&self) -> &str {
        &self.website
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl TryFrom<String> for CategoryKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        key.to_string()
    }
}

impl FromStr for CategoryKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.website, CATEGORY_SEPARATOR, self.category)
    }
}

/// Raw image bytes served for a fetch decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub id: ImageIdentity,
    pub category: CategoryKey,
    pub data: Bytes,
}

impl ImagePayload {
    pub fn new(id: ImageIdentity, category: CategoryKey, data: impl Into<Bytes>) -> Self {
        Self {
            id,
            category,
            data: data.into(),
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_identity_parts() {
        let id = ImageIdentity::new("1260_3").unwrap();
        assert_eq!(id.article(), "1260");
        assert_eq!(id.image_number(), "3");
        assert_eq!(id.to_string(), "1260_3");
    }

    #[test]
    fn test_image_identity_splits_on_last_underscore() {
        let id = ImageIdentity::new("image_1260").unwrap();
        assert_eq!(id.article(), "image");

        let id = ImageIdentity::new("big_shoe_2").unwrap();
        assert_eq!(id.article(), "big_shoe");
        assert_eq!(id.image_number(), "2");
    }

    #[test]
    fn test_image_identity_rejects_malformed() {
        assert!(ImageIdentity::new("1260").is_err());
        assert!(ImageIdentity::new("_3").is_err());
        assert!(ImageIdentity::new("1260_").is_err());
    }

    #[test]
    fn test_image_identity_rejects_path_separators() {
        for raw in ["../secret_1", "a/b_1", "a\\b_1", "..\\x_1", "x_1/.."] {
            let err = ImageIdentity::new(raw).unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }), "{} accepted", raw);
        }
        assert!(ImageIdentity::new("..x_1").is_ok());
    }

    #[test]
    fn test_same_article() {
        let a = ImageIdentity::from_parts(7, 1);
        let b = ImageIdentity::from_parts(7, 2);
        let c = ImageIdentity::from_parts(8, 1);
        assert!(a.same_article(&b));
        assert!(!a.same_article(&c));
    }

    #[test]
    fn test_image_identity_ordering_is_string_ordering() {
        let mut ids = vec![
            ImageIdentity::new("2_1").unwrap(),
            ImageIdentity::new("10_1").unwrap(),
            ImageIdentity::new("1_2").unwrap(),
        ];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(sorted, vec!["10_1", "1_2", "2_1"]);
    }

    #[test]
    fn test_image_identity_serde() {
        let id = ImageIdentity::new("4_5").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"4_5\"");

        let parsed: ImageIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<ImageIdentity>("\"nope\"").is_err());
    }

    #[test]
    fn test_category_key_parse() {
        let key = CategoryKey::parse("zalando - sneakers").unwrap();
        assert_eq!(key.website(), "zalando");
        assert_eq!(key.category(), "sneakers");
        assert_eq!(key.to_string(), "zalando - sneakers");
    }

    #[test]
    fn test_category_key_keeps_separator_inside_category() {
        let key = CategoryKey::parse("shop - men - shirts").unwrap();
        assert_eq!(key.website(), "shop");
        assert_eq!(key.category(), "men - shirts");
    }

    #[test]
    fn test_category_key_rejects_malformed() {
        assert!(CategoryKey::parse("sneakers").is_err());
        assert!(CategoryKey::parse(" - sneakers").is_err());
    }

    #[test]
    fn test_category_key_rejects_path_components() {
        for raw in [".. - ..", ". - shoes", "shop - ..", "shop - ../../etc", "a/b - shoes", "shop - x\\y"] {
            let err = CategoryKey::parse(raw).unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }), "{} accepted", raw);
        }
        assert!(serde_json::from_str::<CategoryKey>("\".. - ..\"").is_err());
    }

    #[test]
    fn test_payload_byte_size() {
        let payload = ImagePayload::new(
            ImageIdentity::from_parts(1, 1),
            CategoryKey::new("shop", "hats"),
            vec![0u8; 42],
        );
        assert_eq!(payload.byte_size(), 42);
    }
}
