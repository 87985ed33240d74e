//! Item data model
//!
//! An item is identified by the stable identifier embedded in its detail URL.
//! [`ItemLink`]s are produced during pagination; [`ItemRecord`]s are produced
//! by extracting a link's detail page.

use serde::Serialize;
use std::fmt;

/// Stable identifier extracted from an item's detail URL
///
/// Used as the deduplication key and as the primary key of the output record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An item discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLink {
    /// Identifier embedded in the URL
    pub id: ItemId,

    /// Absolute URL of the item's detail page
    pub url: String,
}

impl ItemLink {
    pub fn new(id: ItemId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    /// Last non-empty path segment of the URL
    pub fn slug(&self) -> &str {
        crate::url::slug_of(&self.url)
    }
}

/// Kind of catalog offer an item represents
///
/// Serialized with the labels the downstream feed generator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ItemType {
    #[serde(rename = "Vuelo")]
    Flight,
    #[serde(rename = "Hotel")]
    Hotel,
    #[serde(rename = "Paquete")]
    Package,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::Hotel => "Hotel",
            Self::Package => "Package",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of extracting one item's detail page
///
/// Field names on the wire follow the keys the downstream feed generator reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub description: String,
    /// Canonical detail URL
    pub link: String,
    pub image_link: Option<String>,
    pub price: Option<f64>,
    pub region: String,
    pub slug: String,
}
