//! Extraction ruleset for ZonaProp results pages.
//!
//! Listings are read from the page's embedded state when it is present (see
//! [`preloaded`](super::preloaded)), otherwise from the rendered listing
//! blocks (cards). Either way each field has its own rule. A rule either
//! fills its field or reports it missing; rules never see each other's
//! output, so a malformed field cannot take the rest of the listing down
//! with it.

use crate::models::{ListingRecord, Price, PropertyType};
use crate::scrapers::error::ParseError;
use crate::scrapers::preloaded;
use crate::scrapers::types::{MissingFieldWarning, PageResult, SearchQuery};
use chrono::{DateTime, Utc};
use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

struct Selectors {
    body: Selector,
    card: Selector,
    card_link: Selector,
    price: Selector,
    expenses: Selector,
    address: Selector,
    location: Selector,
    features: Selector,
    publisher: Selector,
    publisher_logo: Selector,
    next_page: Selector,
    heading: Selector,
    no_results: Selector,
}

pub(super) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    body: selector("body"),
    card: selector(r#"[data-qa="posting PROPERTY"], [data-qa="posting DEVELOPMENT"]"#),
    card_link: selector(r#"a[href*="/propiedades/"]"#),
    price: selector(r#"[data-qa="POSTING_CARD_PRICE"]"#),
    expenses: selector(r#"[data-qa="expensas"]"#),
    address: selector(r#"[data-qa="POSTING_CARD_ADDRESS"], .postingAddress"#),
    location: selector(r#"[data-qa="POSTING_CARD_LOCATION"]"#),
    features: selector(r#"[data-qa="POSTING_CARD_FEATURES"] span"#),
    publisher: selector(r#"[data-qa="POSTING_CARD_PUBLISHER"]"#),
    publisher_logo: selector("img[alt]"),
    next_page: selector(r#"a[data-qa="PAGING_NEXT"], link[rel="next"], a[rel="next"]"#),
    heading: selector("h1"),
    no_results: selector(r#"[data-qa="NO_RESULTS"]"#),
});

/// One listing block together with the page it was found on
struct Card<'a> {
    el: ElementRef<'a>,
    page_url: &'a Url,
}

impl Card<'_> {
    fn text_of(&self, selector: &Selector) -> Option<String> {
        self.el.select(selector).map(collapse_text).find(|t| !t.is_empty())
    }

    fn href(&self) -> Option<&str> {
        self.el
            .value()
            .attr("data-to-posting")
            .filter(|h| !h.trim().is_empty())
            .or_else(|| {
                self.el
                    .select(&SELECTORS.card_link)
                    .find_map(|a| a.value().attr("href"))
            })
    }

    fn feature(&self, kind: FeatureKind) -> Option<f64> {
        self.el
            .select(&SELECTORS.features)
            .map(collapse_text)
            .filter_map(|t| parse_feature(&t))
            .find(|(k, _)| *k == kind)
            .map(|(_, value)| value)
    }
}

/// Fields of a listing as the rules find them
#[derive(Debug, Default)]
pub(super) struct ListingDraft {
    pub url: Option<String>,
    pub posting_id: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub price: Option<Price>,
    pub expenses: Option<Price>,
    pub total_area_m2: Option<f64>,
    pub covered_area_m2: Option<f64>,
    pub rooms: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub agency: Option<String>,
    pub publisher_id: Option<String>,
    pub antiquity: Option<u32>,
    pub garages: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operation: Option<String>,
    pub raw_data: Option<serde_json::Value>,
}

/// A draft and the fields its rules could not find
pub(super) type Extracted = (ListingDraft, Vec<&'static str>);

/// Fills one field of the draft, returns whether the field was found
struct CardRule {
    field: &'static str,
    apply: fn(&Card<'_>, &mut ListingDraft) -> bool,
}

const CARD_RULES: &[CardRule] = &[
    CardRule { field: "url", apply: rule_url },
    CardRule { field: "posting_id", apply: rule_posting_id },
    CardRule { field: "address", apply: rule_address },
    CardRule { field: "location", apply: rule_location },
    CardRule { field: "price", apply: rule_price },
    CardRule { field: "expenses", apply: rule_expenses },
    CardRule { field: "total_area_m2", apply: rule_total_area },
    CardRule { field: "covered_area_m2", apply: rule_covered_area },
    CardRule { field: "rooms", apply: rule_rooms },
    CardRule { field: "bedrooms", apply: rule_bedrooms },
    CardRule { field: "bathrooms", apply: rule_bathrooms },
    CardRule { field: "garages", apply: rule_garages },
    CardRule { field: "property_type", apply: rule_property_type },
    CardRule { field: "agency", apply: rule_agency },
];

fn rule_url(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.url = card.href().and_then(|h| resolve(card.page_url, h));
    draft.url.is_some()
}

fn rule_posting_id(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.posting_id = card
        .el
        .value()
        .attr("data-id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    draft.posting_id.is_some()
}

fn rule_address(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.address = card.text_of(&SELECTORS.address);
    draft.address.is_some()
}

fn rule_location(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.location = card.text_of(&SELECTORS.location);
    draft.location.is_some()
}

fn rule_price(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.price = card
        .el
        .select(&SELECTORS.price)
        .find_map(|el| Price::parse(&collapse_text(el)));
    draft.price.is_some()
}

fn rule_expenses(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.expenses = card
        .el
        .select(&SELECTORS.expenses)
        .find_map(|el| Price::parse(&collapse_text(el)));
    draft.expenses.is_some()
}

fn rule_total_area(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.total_area_m2 = card.feature(FeatureKind::TotalArea);
    draft.total_area_m2.is_some()
}

fn rule_covered_area(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.covered_area_m2 = card.feature(FeatureKind::CoveredArea);
    draft.covered_area_m2.is_some()
}

fn rule_rooms(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.rooms = card.feature(FeatureKind::Rooms).map(|v| v as u32);
    draft.rooms.is_some()
}

fn rule_bedrooms(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.bedrooms = card.feature(FeatureKind::Bedrooms).map(|v| v as u32);
    draft.bedrooms.is_some()
}

fn rule_bathrooms(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.bathrooms = card.feature(FeatureKind::Bathrooms).map(|v| v as u32);
    draft.bathrooms.is_some()
}

fn rule_garages(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.garages = card.feature(FeatureKind::Garages).map(|v| v as u32);
    draft.garages.is_some()
}

fn rule_property_type(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.property_type = card.href().and_then(property_type_from_posting_url);
    draft.property_type.is_some()
}

fn rule_agency(card: &Card<'_>, draft: &mut ListingDraft) -> bool {
    draft.agency = card.el.select(&SELECTORS.publisher).find_map(|publisher| {
        publisher
            .select(&SELECTORS.publisher_logo)
            .find_map(|img| img.value().attr("alt"))
            .map(|alt| alt.trim().to_string())
            .filter(|alt| !alt.is_empty())
            .or_else(|| Some(collapse_text(publisher)).filter(|t| !t.is_empty()))
    });
    draft.agency.is_some()
}

/// Posting URLs name the type, e.g. `/propiedades/clasificado/alclapin-departamento-...`
pub(super) fn property_type_from_posting_url(href: &str) -> Option<PropertyType> {
    href.rsplit('/')
        .next()
        .unwrap_or_default()
        .split('-')
        .find_map(PropertyType::from_posting_word)
}

pub(super) fn resolve(page_url: &Url, href: &str) -> Option<String> {
    page_url.join(href.trim()).ok().map(|u| u.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureKind {
    TotalArea,
    CoveredArea,
    Rooms,
    Bedrooms,
    Bathrooms,
    Garages,
}

/// Read one feature chip: `120 m² tot.`, `90 m² cub.`, `3 amb.`, `2 dorm.`, `1 baño`, `1 coch.`
fn parse_feature(text: &str) -> Option<(FeatureKind, f64)> {
    let lower = text.to_lowercase();
    let kind = if lower.contains("m²") || lower.contains("m2") {
        if lower.contains("cub") {
            FeatureKind::CoveredArea
        } else {
            FeatureKind::TotalArea
        }
    } else if lower.contains("amb") {
        FeatureKind::Rooms
    } else if lower.contains("dorm") {
        FeatureKind::Bedrooms
    } else if lower.contains("baño") || lower.contains("bano") {
        FeatureKind::Bathrooms
    } else if lower.contains("coch") {
        FeatureKind::Garages
    } else {
        return None;
    };
    leading_number(&lower).map(|n| (kind, n))
}

/// First number in the text, `.` as thousands separator and `,` as decimal mark
pub(super) fn leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let raw: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    raw.trim_end_matches('.').parse().ok()
}

fn collapse_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn apply_card_rules(card: &Card<'_>) -> Extracted {
    let mut draft = ListingDraft::default();
    let missing = CARD_RULES
        .iter()
        .filter(|rule| !(rule.apply)(card, &mut draft))
        .map(|rule| rule.field)
        .collect();
    (draft, missing)
}

impl ListingDraft {
    /// `None` when the listing had no URL
    fn into_record(self, query: &SearchQuery, scraped_at: DateTime<Utc>) -> Option<ListingRecord> {
        Some(ListingRecord {
            url: self.url?,
            posting_id: self.posting_id,
            address: self.address,
            location: self.location,
            price: self.price,
            expenses: self.expenses,
            total_area_m2: self.total_area_m2,
            covered_area_m2: self.covered_area_m2,
            rooms: self.rooms,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            property_type: self.property_type.or_else(|| query.single_property_type()),
            transaction_type: query.transaction_type,
            agency: self.agency,
            publisher_id: self.publisher_id,
            antiquity: self.antiquity,
            garages: self.garages,
            latitude: self.latitude,
            longitude: self.longitude,
            operation: self.operation,
            scraped_at,
            raw_data: self.raw_data,
        })
    }
}

/// Extract every listing of a results page and locate the next page.
///
/// A page with no listings is a [`ParseError`] unless the site marks it as
/// an empty search.
pub fn parse_page(
    html: &str,
    page_url: &Url,
    query: &SearchQuery,
) -> Result<PageResult, ParseError> {
    let document = Html::parse_document(html);
    let scraped_at = Utc::now();

    let listings: Vec<Extracted> = match preloaded::postings(&document) {
        Some(postings) => {
            debug!("Found {} postings in embedded state on {}", postings.len(), page_url);
            postings
                .into_iter()
                .map(|posting| preloaded::apply_rules(posting, page_url))
                .collect()
        }
        None => {
            let cards: Vec<_> = document.select(&SELECTORS.card).collect();
            debug!("Found {} listing blocks on {}", cards.len(), page_url);
            cards
                .into_iter()
                .map(|el| apply_card_rules(&Card { el, page_url }))
                .collect()
        }
    };

    if listings.is_empty() && document.select(&SELECTORS.no_results).next().is_none() {
        return Err(ParseError::NoListings { url: page_url.to_string() });
    }

    let mut result = PageResult {
        next_page: next_page_in(&document, page_url)?,
        total_results: total_results_in(&document),
        ..PageResult::default()
    };

    for (idx, (draft, missing)) in listings.into_iter().enumerate() {
        let Some(record) = draft.into_record(query, scraped_at) else {
            warn!("Dropping listing {} on {}: no listing URL", idx, page_url);
            result.dropped += 1;
            continue;
        };

        for field in missing {
            result.warnings.push(MissingFieldWarning {
                field,
                listing_url: record.url.clone(),
            });
        }
        result.records.push(record);
    }

    Ok(result)
}

/// A document with nothing in its body, which is how a geo-blocked or
/// emptied response looks once a parser or browser has wrapped it.
pub fn is_blank_document(html: &str) -> bool {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&SELECTORS.body).next() else {
        return true;
    };
    body.children().all(|node| match node.value() {
        Node::Text(text) => text.trim().is_empty(),
        Node::Comment(_) => true,
        _ => false,
    })
}

/// Next-page link of a page, read without extracting listings
pub fn next_page_link(html: &str, page_url: &Url) -> Result<Option<Url>, ParseError> {
    next_page_in(&Html::parse_document(html), page_url)
}

fn next_page_in(document: &Html, page_url: &Url) -> Result<Option<Url>, ParseError> {
    let Some(link) = document.select(&SELECTORS.next_page).next() else {
        return Ok(None);
    };
    if link.value().attr("disabled").is_some() {
        return Ok(None);
    }
    let href = link.value().attr("href").map(str::trim).unwrap_or_default();
    if href.is_empty() || href.starts_with('#') {
        return Ok(None);
    }
    page_url.join(href).map(Some).map_err(|_| ParseError::BadNextLink {
        url: page_url.to_string(),
        href: href.to_string(),
    })
}

/// Heading such as `1.234 Departamentos en alquiler`
fn total_results_in(document: &Html) -> Option<u64> {
    let heading = collapse_text(document.select(&SELECTORS.heading).next()?);
    heading.split_whitespace().find_map(|word| {
        if word.chars().all(|c| c.is_ascii_digit() || c == '.') {
            word.replace('.', "").parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Currency, TransactionType};

    pub(crate) fn card_html(href: Option<&str>, body: &str) -> String {
        let href = href
            .map(|h| format!(r#" data-to-posting="{}""#, h))
            .unwrap_or_default();
        format!(r#"<div data-qa="posting PROPERTY"{}>{}</div>"#, href, body)
    }

    pub(crate) fn full_card(n: usize) -> String {
        card_html(
            Some(&format!(
                "/propiedades/clasificado/alclapin-departamento-palermo-{}.html",
                n
            )),
            &format!(
                r#"<div data-qa="POSTING_CARD_PRICE">USD {n}00.000</div>
                <div data-qa="expensas">+ $ 45.000 Expensas</div>
                <div data-qa="POSTING_CARD_ADDRESS">Av. Santa Fe {n}</div>
                <h2 data-qa="POSTING_CARD_LOCATION">Palermo, Capital Federal</h2>
                <h3 data-qa="POSTING_CARD_FEATURES">
                    <span>120 m² tot.</span><span>95 m² cub.</span>
                    <span>3 amb.</span><span>2 dorm.</span><span>1 baño</span>
                    <span>1 coch.</span>
                </h3>
                <div data-qa="POSTING_CARD_PUBLISHER">
                    <img alt="Inmobiliaria Sur" src="x.png">
                </div>"#
            ),
        )
    }

    pub(crate) fn page_html(cards: &[String], next: Option<&str>) -> String {
        let next = next
            .map(|n| format!(r#"<a data-qa="PAGING_NEXT" href="{}">Siguiente</a>"#, n))
            .unwrap_or_default();
        format!(
            "<html><body><h1>1.234 Departamentos en alquiler</h1>{}{}</body></html>",
            cards.join("\n"),
            next
        )
    }

    fn page_url() -> Url {
        Url::parse("https://www.zonaprop.com.ar/departamentos-alquiler.html").unwrap()
    }

    fn parse(html: &str) -> PageResult {
        parse_page(html, &page_url(), &SearchQuery::default()).unwrap()
    }

    #[test]
    fn extracts_every_field_of_a_complete_card() {
        let page = parse(&page_html(&[full_card(1)], None));

        assert_eq!(page.records.len(), 1);
        assert!(page.warnings.iter().all(|w| w.field == "posting_id"));
        let record = &page.records[0];
        assert_eq!(
            record.url,
            "https://www.zonaprop.com.ar/propiedades/clasificado/\
             alclapin-departamento-palermo-1.html"
        );
        assert_eq!(record.price, Some(Price { amount: 100_000, currency: Currency::Usd }));
        assert_eq!(record.expenses, Some(Price { amount: 45_000, currency: Currency::Ars }));
        assert_eq!(record.address.as_deref(), Some("Av. Santa Fe 1"));
        assert_eq!(record.location.as_deref(), Some("Palermo, Capital Federal"));
        assert_eq!(record.total_area_m2, Some(120.0));
        assert_eq!(record.covered_area_m2, Some(95.0));
        assert_eq!(record.rooms, Some(3));
        assert_eq!(record.bedrooms, Some(2));
        assert_eq!(record.bathrooms, Some(1));
        assert_eq!(record.garages, Some(1));
        assert_eq!(record.property_type, Some(PropertyType::Apartment));
        assert_eq!(record.transaction_type, TransactionType::Rental);
        assert_eq!(record.agency.as_deref(), Some("Inmobiliaria Sur"));
        assert_eq!(record.raw_data, None);
        assert_eq!(page.total_results, Some(1234));
    }

    #[test]
    fn n_cards_with_urls_yield_n_records_in_order() {
        let cards: Vec<_> = (1..=4).map(full_card).collect();
        let page = parse(&page_html(&cards, None));

        assert_eq!(page.records.len(), 4);
        assert_eq!(page.dropped, 0);
        for (i, record) in page.records.iter().enumerate() {
            assert!(record.url.ends_with(&format!("palermo-{}.html", i + 1)));
        }
    }

    #[test]
    fn missing_field_is_empty_and_others_survive() {
        let card = card_html(
            Some("/propiedades/casa-en-venta-99.html"),
            r#"<div data-qa="POSTING_CARD_PRICE">Consultar precio</div>
               <div data-qa="POSTING_CARD_ADDRESS">Calle 12</div>
               <h3 data-qa="POSTING_CARD_FEATURES"><span>2 baños</span></h3>"#,
        );
        let page = parse(&page_html(&[card], None));

        let record = &page.records[0];
        assert_eq!(record.price, None);
        assert_eq!(record.address.as_deref(), Some("Calle 12"));
        assert_eq!(record.bathrooms, Some(2));
        assert_eq!(record.rooms, None);
        assert_eq!(record.property_type, Some(PropertyType::House));
        assert!(page.warnings.iter().any(|w| w.field == "price"));
        assert!(!page.warnings.iter().any(|w| w.field == "address"));
    }

    #[test]
    fn card_without_url_is_dropped() {
        let cards = vec![full_card(1), card_html(None, "<div>sin link</div>"), full_card(3)];
        let page = parse(&page_html(&cards, None));

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.dropped, 1);
    }

    #[test]
    fn falls_back_to_inner_link_for_url() {
        let card = r#"<div data-qa="posting PROPERTY" data-id="4455">
            <a href="https://www.zonaprop.com.ar/propiedades/ph-en-boedo-4455.html">ver</a></div>"#;
        let page = parse(&page_html(&[card.to_string()], None));

        let record = &page.records[0];
        assert_eq!(record.url, "https://www.zonaprop.com.ar/propiedades/ph-en-boedo-4455.html");
        assert_eq!(record.posting_id.as_deref(), Some("4455"));
        assert_eq!(record.property_type, Some(PropertyType::Ph));
    }

    #[test]
    fn property_type_falls_back_to_single_type_query() {
        let card = card_html(Some("/propiedades/unidad-en-nunez-7.html"), "");
        let page = parse(&page_html(&[card.clone()], None));
        assert_eq!(page.records[0].property_type, Some(PropertyType::Apartment));

        let mixed = SearchQuery::build(
            vec![PropertyType::House, PropertyType::Ph],
            TransactionType::Sale,
            None,
        )
        .unwrap();
        let page = parse_page(&page_html(&[card], None), &page_url(), &mixed).unwrap();
        assert_eq!(page.records[0].property_type, None);
        assert_eq!(page.records[0].transaction_type, TransactionType::Sale);
    }

    #[test]
    fn next_page_comes_from_the_link() {
        let html = page_html(&[full_card(1)], Some("/departamentos-alquiler-pagina-2.html"));
        assert_eq!(
            parse(&html).next_page.unwrap().as_str(),
            "https://www.zonaprop.com.ar/departamentos-alquiler-pagina-2.html"
        );
    }

    #[test]
    fn no_link_or_disabled_link_means_last_page() {
        let html = page_html(&[full_card(1)], None);
        assert!(parse(&html).next_page.is_none());

        let html = format!(
            r#"<html><body>{}<a data-qa="PAGING_NEXT" disabled href="/x.html">›</a>
            </body></html>"#,
            full_card(1)
        );
        assert!(parse(&html).next_page.is_none());
    }

    #[test]
    fn page_without_listings_is_a_parse_error() {
        let html =
            r#"<html><body><div class="captcha">Verificá que sos humano</div></body></html>"#;
        let err = parse_page(html, &page_url(), &SearchQuery::default()).unwrap_err();
        assert!(matches!(err, ParseError::NoListings { .. }));
    }

    #[test]
    fn empty_search_marker_is_not_an_error() {
        let html = r#"<html><body><h1>0 Departamentos</h1>
            <div data-qa="NO_RESULTS">Sin resultados</div></body></html>"#;
        let page = parse(html);
        assert!(page.records.is_empty());
        assert!(page.next_page.is_none());
        assert_eq!(page.total_results, Some(0));
    }

    #[test]
    fn next_link_survives_unreadable_cards() {
        let html = r#"<html><body>
            <a data-qa="PAGING_NEXT" href="departamentos-alquiler-pagina-4.html">Siguiente</a>
            </body></html>"#;
        let url =
            Url::parse("https://www.zonaprop.com.ar/departamentos-alquiler-pagina-3.html").unwrap();
        assert!(parse_page(html, &url, &SearchQuery::default()).is_err());
        assert_eq!(
            next_page_link(html, &url).unwrap().unwrap().as_str(),
            "https://www.zonaprop.com.ar/departamentos-alquiler-pagina-4.html"
        );
    }

    #[test]
    fn embedded_state_wins_over_cards() {
        let html = format!(
            r#"<html><head>{}</head><body>{}</body></html>"#,
            preloaded::tests::state_script(&[preloaded::tests::posting(7)]),
            full_card(1)
        );
        let page = parse(&html);

        assert_eq!(page.records.len(), 1);
        assert!(page.records[0].url.ends_with("-7.html"));
        assert!(page.records[0].raw_data.is_some());
    }

    #[test]
    fn broken_embedded_state_falls_back_to_cards() {
        let html = format!(
            r#"<html><head><script id="preloadedData">window.__PRELOADED_STATE__ = {{"listStore": ;
            </script></head><body>{}</body></html>"#,
            full_card(1)
        );
        let page = parse(&html);

        assert_eq!(page.records.len(), 1);
        assert!(page.records[0].url.ends_with("palermo-1.html"));
    }

    #[test]
    fn blank_documents() {
        assert!(is_blank_document("<html><head></head><body></body></html>"));
        assert!(is_blank_document("<html><body>\n  <!-- cf --> </body></html>"));
        assert!(is_blank_document(""));
        assert!(!is_blank_document("<html><body>Access denied</body></html>"));
        assert!(!is_blank_document(&page_html(&[full_card(1)], None)));
    }

    #[test]
    fn reads_feature_chips() {
        assert_eq!(parse_feature("1.200 m² tot."), Some((FeatureKind::TotalArea, 1200.0)));
        assert_eq!(parse_feature("45,5 m² cub."), Some((FeatureKind::CoveredArea, 45.5)));
        assert_eq!(parse_feature("4 amb."), Some((FeatureKind::Rooms, 4.0)));
        assert_eq!(parse_feature("3 dorm."), Some((FeatureKind::Bedrooms, 3.0)));
        assert_eq!(parse_feature("2 baños"), Some((FeatureKind::Bathrooms, 2.0)));
        assert_eq!(parse_feature("1 coch."), Some((FeatureKind::Garages, 1.0)));
        assert_eq!(parse_feature("Apto profesional"), None);
        assert_eq!(parse_feature("amb."), None);
    }
}
