//! Field extraction from loaded HTML documents
//!
//! This module turns a fetched page into raw field records:
//! - Detail-page product fields (name, price text, seller-info link)
//! - Listing cards (seller, title, price, link), lazily and in document order
//! - Detail links on a merchant listing page
//! - The paginator's next-page link
//!
//! Nothing here fails on missing fields: absent text becomes `""` and absent
//! attributes become `None`, leaving filtering to the crawlers.

use crate::config::{CardSelectors, DetailSelectors};
use crate::url::resolve_href;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed page together with the URL it was fetched from
pub struct Document {
    html: Html,
    url: Url,
}

/// Compiled selectors for merchant listing and detail pages
#[derive(Debug, Clone)]
pub struct DetailScheme {
    product_link: Selector,
    name: Selector,
    price_new: Selector,
    price_regular: Selector,
    seller_link: Selector,
}

/// Compiled selectors for listing cards and the paginator
#[derive(Debug, Clone)]
pub struct CardScheme {
    card: Selector,
    seller: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    next_page: Selector,
    next_page_label: Option<String>,
}

/// Raw fields of one product detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub name: String,
    /// Discounted price text if present, otherwise the regular price text
    pub price_text: String,
    /// The page's declared seller-info link, resolved to an absolute URL
    pub seller_link: Option<String>,
}

/// Raw fields of one listing card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    /// Empty string when the card shows no seller
    pub seller: String,
    pub title: String,
    pub price: String,
    pub link: Option<String>,
}

fn compile(field: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}

impl DetailScheme {
    pub fn compile(selectors: &DetailSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            product_link: compile("product-link", &selectors.product_link)?,
            name: compile("name", &selectors.name)?,
            price_new: compile("price-new", &selectors.price_new)?,
            price_regular: compile("price-regular", &selectors.price_regular)?,
            seller_link: compile("seller-link", &selectors.seller_link)?,
        })
    }
}

impl CardScheme {
    pub fn compile(selectors: &CardSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            card: compile("card", &selectors.card)?,
            seller: compile("seller", &selectors.seller)?,
            title: compile("title", &selectors.title)?,
            price: compile("price", &selectors.price)?,
            link: compile("link", &selectors.link)?,
            next_page: compile("next-page", &selectors.next_page)?,
            next_page_label: selectors
                .next_page_label
                .as_ref()
                .map(|label| label.trim().to_string()),
        })
    }
}

impl Document {
    /// Parses an HTML body fetched from `url`
    pub fn parse(body: &str, url: &Url) -> Self {
        Self {
            html: Html::parse_document(body),
            url: url.clone(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Detail-page links from a merchant listing page, in document order
    pub fn product_links(&self, scheme: &DetailScheme) -> Vec<String> {
        self.html
            .select(&scheme.product_link)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_href(href, &self.url))
            .collect()
    }

    /// Product fields of a detail page
    ///
    /// The discounted price selector wins; the regular price is only read
    /// when the discounted one yields no text.
    pub fn detail_fields(&self, scheme: &DetailScheme) -> DetailFields {
        let name = self.text(&scheme.name);

        let mut price_text = self.text(&scheme.price_new);
        if price_text.is_empty() {
            price_text = self.text(&scheme.price_regular);
        }

        let seller_link = self
            .html
            .select(&scheme.seller_link)
            .next()
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| resolve_href(href, &self.url));

        DetailFields {
            name,
            price_text,
            seller_link,
        }
    }

    /// Listing cards in document order
    ///
    /// The iterator borrows the document and yields each card once.
    pub fn cards<'a>(&'a self, scheme: &'a CardScheme) -> impl Iterator<Item = CardFields> + 'a {
        self.html.select(&scheme.card).map(move |card| CardFields {
            seller: text_within(card, &scheme.seller),
            title: text_within(card, &scheme.title),
            price: text_within(card, &scheme.price),
            link: card
                .select(&scheme.link)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .and_then(|href| resolve_href(href, &self.url)),
        })
    }

    /// The paginator's next-page link, if the page has one
    ///
    /// With a configured label, only a control whose text, `title` or
    /// `aria-label` equals that label counts.
    pub fn next_page(&self, scheme: &CardScheme) -> Option<String> {
        self.html
            .select(&scheme.next_page)
            .filter(|control| match &scheme.next_page_label {
                Some(label) => has_label(*control, label),
                None => true,
            })
            .find_map(href_of)
            .and_then(|href| resolve_href(&href, &self.url))
    }

    /// Concatenated, trimmed text of every element matching `selector`
    fn text(&self, selector: &Selector) -> String {
        self.html
            .select(selector)
            .flat_map(|element| element.text())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

fn text_within(root: ElementRef<'_>, selector: &Selector) -> String {
    root.select(selector)
        .flat_map(|element| element.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn has_label(control: ElementRef<'_>, label: &str) -> bool {
    let text = control.text().collect::<String>();
    if text.trim() == label {
        return true;
    }

    ["title", "aria-label"]
        .iter()
        .filter_map(|attr| control.value().attr(attr))
        .any(|value| value.trim() == label)
}

/// The control's own href, or the first anchor inside it
fn href_of(control: ElementRef<'_>) -> Option<String> {
    if let Some(href) = control.value().attr("href") {
        return Some(href.to_string());
    }

    let anchor = Selector::parse("a[href]").ok()?;
    control
        .select(&anchor)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::to_string)
}
