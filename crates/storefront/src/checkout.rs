//! Checkout session metadata payload.
//!
//! The metadata attached to a Stripe checkout session is the only channel
//! by which the webhook later learns what was purchased, so it is treated as
//! a versioned wire format: explicit version key, schema-validated line
//! entries, and hard rejection of anything malformed instead of trusting it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stride_core::ProductId;

/// Current payload version.
pub const METADATA_VERSION: u32 = 1;

/// Metadata key carrying the payload version.
const VERSION_KEY: &str = "v";

/// Metadata key carrying the JSON-encoded line entries.
const PRODUCTS_KEY: &str = "products";

/// Errors raised when an inbound metadata payload fails validation.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No `products` entry on the session metadata.
    #[error("metadata has no products entry")]
    MissingProducts,

    /// The version key is present but not a number.
    #[error("metadata version is not a number: {0}")]
    InvalidVersion(String),

    /// The payload version is newer than this build understands.
    #[error("unsupported metadata version: {0}")]
    UnsupportedVersion(u32),

    /// The products entry is not valid JSON of the expected shape.
    #[error("malformed products payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload parsed but describes nothing purchasable.
    #[error("metadata products list is empty")]
    Empty,

    /// A line carried a zero quantity.
    #[error("line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// One purchased line as carried through session metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataLine {
    /// Product document id. Accepts the legacy `_id` spelling on input.
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub quantity: u32,
}

/// The versioned checkout metadata payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub version: u32,
    pub lines: Vec<MetadataLine>,
}

impl CheckoutMetadata {
    /// Build a current-version payload from purchased lines.
    #[must_use]
    pub const fn new(lines: Vec<MetadataLine>) -> Self {
        Self {
            version: METADATA_VERSION,
            lines,
        }
    }

    /// Encode as metadata entries for the session-create request.
    ///
    /// # Errors
    ///
    /// Returns an error if the line list cannot be serialized.
    pub fn to_entries(&self) -> Result<Vec<(String, String)>, serde_json::Error> {
        Ok(vec![
            (VERSION_KEY.to_string(), self.version.to_string()),
            (PRODUCTS_KEY.to_string(), serde_json::to_string(&self.lines)?),
        ])
    }

    /// Parse and validate the metadata map from a webhook session object.
    ///
    /// A missing version key is treated as version 1: sessions created
    /// before the key was introduced are still honored, but their line
    /// entries must pass the same schema validation.
    ///
    /// # Errors
    ///
    /// Returns a [`MetadataError`] describing the first validation failure.
    pub fn parse(metadata: &HashMap<String, String>) -> Result<Self, MetadataError> {
        let version = match metadata.get(VERSION_KEY) {
            None => METADATA_VERSION,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| MetadataError::InvalidVersion(raw.clone()))?,
        };

        if version != METADATA_VERSION {
            return Err(MetadataError::UnsupportedVersion(version));
        }

        let raw_products = metadata
            .get(PRODUCTS_KEY)
            .ok_or(MetadataError::MissingProducts)?;

        let lines: Vec<MetadataLine> = serde_json::from_str(raw_products)?;

        if lines.is_empty() {
            return Err(MetadataError::Empty);
        }

        if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
            return Err(MetadataError::ZeroQuantity(line.id.clone()));
        }

        Ok(Self { version, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_round_trip() {
        let payload = CheckoutMetadata::new(vec![
            MetadataLine {
                id: ProductId::new("p1"),
                quantity: 2,
            },
            MetadataLine {
                id: ProductId::new("p2"),
                quantity: 1,
            },
        ]);

        let entries = payload.to_entries().expect("encode");
        let as_map: HashMap<String, String> = entries.into_iter().collect();
        let parsed = CheckoutMetadata::parse(&as_map).expect("parse");

        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_parse_accepts_legacy_id_spelling() {
        let metadata = map(&[("products", r#"[{"_id":"p1","quantity":2}]"#)]);
        let parsed = CheckoutMetadata::parse(&metadata).expect("parse");

        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.lines[0].id.as_str(), "p1");
        assert_eq!(parsed.lines[0].quantity, 2);
    }

    #[test]
    fn test_parse_rejects_missing_products() {
        let metadata = map(&[("v", "1")]);
        assert!(matches!(
            CheckoutMetadata::parse(&metadata),
            Err(MetadataError::MissingProducts)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let metadata = map(&[("products", "not json")]);
        assert!(matches!(
            CheckoutMetadata::parse(&metadata),
            Err(MetadataError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let metadata = map(&[("products", r#"[{"quantity":2}]"#)]);
        assert!(matches!(
            CheckoutMetadata::parse(&metadata),
            Err(MetadataError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unsupported_version() {
        let metadata = map(&[("v", "2"), ("products", r#"[{"id":"p1","quantity":1}]"#)]);
        assert!(matches!(
            CheckoutMetadata::parse(&metadata),
            Err(MetadataError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_list() {
        let metadata = map(&[("products", "[]")]);
        assert!(matches!(
            CheckoutMetadata::parse(&metadata),
            Err(MetadataError::Empty)
        ));
    }

    #[test]
    fn test_parse_rejects_zero_quantity() {
        let metadata = map(&[("products", r#"[{"id":"p1","quantity":0}]"#)]);
        assert!(matches!(
            CheckoutMetadata::parse(&metadata),
            Err(MetadataError::ZeroQuantity(_))
        ));
    }
}
