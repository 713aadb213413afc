use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::models::Offer;

const OFFER_SELECTOR: &str = "div.olpOffer";
const CONDITION_SELECTOR: &str = "span.olpCondition";
const PRICE_SELECTOR: &str = "span.olpOfferPrice";
const SELLER_SELECTOR: &str = "h3.olpSellerName";

const WANTED_CONDITION: &str = "New";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector {
        selector: &'static str,
        message: String,
    },

    #[error("offer #{offer_index} has no `{field}` element")]
    MissingField {
        field: &'static str,
        offer_index: usize,
    },
}

struct OfferSelectors {
    offer: Selector,
    condition: Selector,
    price: Selector,
    seller: Selector,
}

impl OfferSelectors {
    fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            offer: selector(OFFER_SELECTOR)?,
            condition: selector(CONDITION_SELECTOR)?,
            price: selector(PRICE_SELECTOR)?,
            seller: selector(SELLER_SELECTOR)?,
        })
    }
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css,
        message: e.to_string(),
    })
}

/// Pulls every "New" offer out of an offer-listing page, in document order.
///
/// Any offer missing its condition, or a "New" offer missing its price or
/// seller, fails the whole extraction.
pub fn parse_offers(html: &str) -> Result<Vec<Offer>, ExtractError> {
    let doc = Html::parse_document(html);
    let selectors = OfferSelectors::new()?;

    let mut offers = Vec::new();
    for (offer_index, element) in doc.select(&selectors.offer).enumerate() {
        let condition = field_text(element, &selectors.condition, CONDITION_SELECTOR, offer_index)?;
        if condition != WANTED_CONDITION {
            debug!(offer_index, %condition, "skipping offer");
            continue;
        }

        let price = field_text(element, &selectors.price, PRICE_SELECTOR, offer_index)?;
        let seller = field_text(element, &selectors.seller, SELLER_SELECTOR, offer_index)?;
        offers.push(Offer::new(price, condition, seller));
    }

    Ok(offers)
}

fn field_text(
    offer: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
    offer_index: usize,
) -> Result<String, ExtractError> {
    offer
        .select(selector)
        .next()
        .map(element_text)
        .ok_or(ExtractError::MissingField { field, offer_index })
}

/// Descendant text with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer_block(price: &str, condition: &str, seller: &str) -> String {
        format!(
            r#"<div class="a-row a-spacing-mini olpOffer" role="row">
                 <div class="a-column olpPriceColumn">
                   <span class="a-size-large a-color-price olpOfferPrice a-text-bold">
                     {price}
                   </span>
                 </div>
                 <div class="a-column olpConditionColumn">
                   <span class="a-size-medium olpCondition a-text-bold">
                     {condition}
                   </span>
                 </div>
                 <div class="a-column olpSellerColumn">
                   <h3 class="a-spacing-none olpSellerName">{seller}</h3>
                 </div>
               </div>"#
        )
    }

    fn page(blocks: &[String]) -> String {
        format!(
            "<html><body><div id=\"olpOfferList\">{}</div></body></html>",
            blocks.concat()
        )
    }

    #[test]
    fn keeps_only_new_offers_in_document_order() {
        let html = page(&[
            offer_block("$19.99", "New", r#"<span><a href="/s">Gadget Barn</a></span>"#),
            offer_block("$9.50", "Used - Good", "Thrift Co"),
            offer_block("$21.00", "New", r#"<img alt="Amazon.com" src="logo.png">"#),
        ]);

        let offers = parse_offers(&html).unwrap();

        assert_eq!(
            offers,
            vec![
                Offer::new("$19.99".into(), "New".into(), "Gadget Barn".into()),
                Offer::new("$21.00".into(), "New".into(), "Amazon".into()),
            ]
        );
    }

    #[test]
    fn no_new_offers_yields_nothing() {
        let html = page(&[
            offer_block("$9.50", "Used - Good", "Thrift Co"),
            offer_block("$8.00", "Used - Acceptable", "Thrift Co"),
        ]);
        assert!(parse_offers(&html).unwrap().is_empty());
        assert!(parse_offers("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn condition_must_match_exactly() {
        let html = page(&[offer_block("$1.00", "new", "Lowercase Inc")]);
        assert!(parse_offers(&html).unwrap().is_empty());
    }

    #[test]
    fn missing_seller_on_new_offer_is_fatal() {
        let html = page(&[
            offer_block("$19.99", "New", "Gadget Barn"),
            r#"<div class="olpOffer">
                 <span class="olpOfferPrice">$3.00</span>
                 <span class="olpCondition">New</span>
               </div>"#
                .to_string(),
        ]);

        match parse_offers(&html) {
            Err(ExtractError::MissingField { field, offer_index }) => {
                assert_eq!(field, SELLER_SELECTOR);
                assert_eq!(offer_index, 1);
            }
            other => panic!("expected missing seller, got {other:?}"),
        }
    }

    #[test]
    fn missing_condition_is_fatal_even_before_filtering() {
        let html = page(&[r#"<div class="olpOffer"><span class="olpOfferPrice">$3.00</span></div>"#
            .to_string()]);
        assert!(matches!(
            parse_offers(&html),
            Err(ExtractError::MissingField { field: CONDITION_SELECTOR, offer_index: 0 })
        ));
    }

    #[test]
    fn used_offer_without_price_is_skipped_not_fatal() {
        let html = page(&[r#"<div class="olpOffer"><span class="olpCondition">Used</span></div>"#
            .to_string()]);
        assert!(parse_offers(&html).unwrap().is_empty());
    }
}
