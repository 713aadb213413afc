use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SELLER: &str = "Amazon";

/// One seller's listing as scraped from the offer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub price: String,
    pub condition: String,
    pub seller: String,
}

impl Offer {
    /// Builds an offer, rewriting an empty seller to [`DEFAULT_SELLER`].
    pub fn new(price: String, condition: String, seller: String) -> Self {
        Self {
            price,
            condition,
            seller: normalize_seller(seller),
        }
    }
}

/// Amazon-fulfilled offers render the seller as a logo with no text.
pub fn normalize_seller(seller: String) -> String {
    if seller.is_empty() {
        DEFAULT_SELLER.to_string()
    } else {
        seller
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-------- Amazon Offer ----------")?;
        writeln!(f, "Price: {}", self.price)?;
        writeln!(f, "Condition: {}", self.condition)?;
        writeln!(f, "Seller: {}", self.seller)?;
        write!(f, "--------------------------------")
    }
}

/// Wire form of an offer sent to the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlRecord {
    pub price: String,
    pub condition: String,
    pub seller: String,
}

impl From<&Offer> for CrawlRecord {
    fn from(offer: &Offer) -> Self {
        Self {
            price: offer.price.clone(),
            condition: offer.condition.clone(),
            seller: normalize_seller(offer.seller.clone()),
        }
    }
}

impl CrawlRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
