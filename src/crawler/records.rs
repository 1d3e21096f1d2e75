//! Records produced by the two crawl topologies

use crate::crawler::document::CardFields;
use crate::crawler::price::NormalizedPrice;
use serde::{Deserialize, Serialize};

/// A third-party-sold product found by the detail fan-out crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: NormalizedPrice,
    /// The detail page the product was read from
    pub source_link: String,
}

/// A seller's listing card found by the paginated crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub price: String,
    pub seller: String,
    pub link: Option<String>,
}

impl ListingRecord {
    /// Builds a record from card fields, or None when the card has no seller
    pub fn from_card(card: CardFields) -> Option<Self> {
        if card.seller.is_empty() {
            return None;
        }

        Some(Self {
            title: card.title,
            price: card.price,
            seller: card.seller,
            link: card.link,
        })
    }
}

/// Records that carry a seller identity
pub trait SellerKeyed {
    fn seller_key(&self) -> &str;
}

impl SellerKeyed for ListingRecord {
    fn seller_key(&self) -> &str {
        &self.seller
    }
}
