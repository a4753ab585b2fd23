//! Listings from the state object ZonaProp embeds in its results pages.
//!
//! The page ships `<script id="preloadedData">window.__PRELOADED_STATE__ = {...};`
//! with the postings under `listStore.listPostings`. That object carries
//! fields the cards never show (publisher id, building age, coordinates),
//! so it is read first and the card rules only run when it is absent.

use crate::models::{Currency, Price, PropertyType};
use crate::scrapers::zonaprop::{
    leading_number, property_type_from_posting_url, resolve, selector, Extracted, ListingDraft,
};
use reqwest::Url;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

const STATE_MARKER: &str = "window.__PRELOADED_STATE__";
const STATE_END: &str = "window.__SITE_DATA__";
const POSTINGS_POINTER: &str = "/listStore/listPostings";

static STATE_SCRIPT: LazyLock<Selector> = LazyLock::new(|| selector("script#preloadedData"));

/// Postings of the page, `None` when the page has no usable state
pub(super) fn postings(document: &Html) -> Option<Vec<Value>> {
    let script = document.select(&STATE_SCRIPT).next()?;
    let text: String = script.text().collect();
    let mut state = match parse_state(&text)? {
        Ok(state) => state,
        Err(e) => {
            warn!("Embedded page state is not valid JSON, reading listing blocks: {}", e);
            return None;
        }
    };
    match state.pointer_mut(POSTINGS_POINTER).map(Value::take) {
        Some(Value::Array(postings)) if !postings.is_empty() => Some(postings),
        _ => None,
    }
}

fn parse_state(script: &str) -> Option<serde_json::Result<Value>> {
    let start = script.find(STATE_MARKER)? + STATE_MARKER.len();
    let rest = script[start..].trim_start().strip_prefix('=')?;
    let json = match rest.find(STATE_END) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(serde_json::from_str(json.trim().trim_end_matches(';')))
}

/// One posting object together with the page it was found on
struct Posting<'a> {
    value: &'a Value,
    page_url: &'a Url,
}

impl Posting<'_> {
    fn str_at(&self, pointer: &str) -> Option<String> {
        let text = match self.value.pointer(pointer)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(text).filter(|t| !t.is_empty())
    }

    fn number_at(&self, pointer: &str) -> Option<f64> {
        match self.value.pointer(pointer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => leading_number(s),
            _ => None,
        }
    }

    fn feature(&self, code: &str) -> Option<f64> {
        self.number_at(&format!("/mainFeatures/{}/value", code))
    }

    fn price_at(&self, pointer: &str) -> Option<Price> {
        let price = self.value.pointer(pointer)?;
        let currency = price
            .get("currency")
            .and_then(Value::as_str)
            .and_then(Currency::from_code)?;
        let amount = price.get("amount").and_then(Value::as_u64).or_else(|| {
            price
                .get("formattedAmount")
                .and_then(Value::as_str)
                .and_then(|text| {
                    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
                    digits.parse().ok()
                })
        })?;
        Some(Price { amount, currency })
    }
}

struct JsonRule {
    field: &'static str,
    apply: fn(&Posting<'_>, &mut ListingDraft) -> bool,
}

const JSON_RULES: &[JsonRule] = &[
    JsonRule { field: "url", apply: rule_url },
    JsonRule { field: "posting_id", apply: rule_posting_id },
    JsonRule { field: "address", apply: rule_address },
    JsonRule { field: "location", apply: rule_location },
    JsonRule { field: "price", apply: rule_price },
    JsonRule { field: "expenses", apply: rule_expenses },
    JsonRule { field: "total_area_m2", apply: rule_total_area },
    JsonRule { field: "covered_area_m2", apply: rule_covered_area },
    JsonRule { field: "rooms", apply: rule_rooms },
    JsonRule { field: "bedrooms", apply: rule_bedrooms },
    JsonRule { field: "bathrooms", apply: rule_bathrooms },
    JsonRule { field: "antiquity", apply: rule_antiquity },
    JsonRule { field: "garages", apply: rule_garages },
    JsonRule { field: "property_type", apply: rule_property_type },
    JsonRule { field: "agency", apply: rule_agency },
    JsonRule { field: "publisher_id", apply: rule_publisher_id },
    JsonRule { field: "latitude", apply: rule_latitude },
    JsonRule { field: "longitude", apply: rule_longitude },
    JsonRule { field: "operation", apply: rule_operation },
];

// mainFeatures codes
const TOTAL_AREA: &str = "CFT100";
const COVERED_AREA: &str = "CFT101";
const ROOMS: &str = "CFT1";
const BEDROOMS: &str = "CFT2";
const BATHROOMS: &str = "CFT3";
const ANTIQUITY: &str = "CFT5";
const GARAGES: &str = "CFT7";

const GEOLOCATION: &str = "/postingLocation/postingGeolocation/geolocation";

fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    *slot = value;
    slot.is_some()
}

fn count(value: Option<f64>) -> Option<u32> {
    value.filter(|v| *v >= 0.0).map(|v| v as u32)
}

fn rule_url(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    let url = posting
        .str_at("/url")
        .and_then(|href| resolve(posting.page_url, &href));
    set(&mut draft.url, url)
}

fn rule_posting_id(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.posting_id, posting.str_at("/postingId"))
}

fn rule_address(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.address, posting.str_at("/postingLocation/address/name"))
}

/// Neighbourhood and its parent, e.g. `Palermo, Capital Federal`
fn rule_location(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    let parts: Vec<String> = [
        "/postingLocation/location/name",
        "/postingLocation/location/parent/name",
    ]
    .iter()
    .filter_map(|pointer| posting.str_at(pointer))
    .collect();
    set(&mut draft.location, Some(parts.join(", ")).filter(|l| !l.is_empty()))
}

fn rule_price(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.price, posting.price_at("/priceOperationTypes/0/prices/0"))
}

fn rule_expenses(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.expenses, posting.price_at("/expenses"))
}

fn rule_total_area(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.total_area_m2, posting.feature(TOTAL_AREA))
}

fn rule_covered_area(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.covered_area_m2, posting.feature(COVERED_AREA))
}

fn rule_rooms(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.rooms, count(posting.feature(ROOMS)))
}

fn rule_bedrooms(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.bedrooms, count(posting.feature(BEDROOMS)))
}

fn rule_bathrooms(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.bathrooms, count(posting.feature(BATHROOMS)))
}

/// Building age in years
fn rule_antiquity(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.antiquity, count(posting.feature(ANTIQUITY)))
}

fn rule_garages(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.garages, count(posting.feature(GARAGES)))
}

fn rule_agency(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.agency, posting.str_at("/publisher/name"))
}

fn rule_publisher_id(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.publisher_id, posting.str_at("/publisher/publisherId"))
}

fn rule_latitude(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.latitude, posting.number_at(&format!("{GEOLOCATION}/latitude")))
}

fn rule_longitude(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    set(&mut draft.longitude, posting.number_at(&format!("{GEOLOCATION}/longitude")))
}

fn rule_operation(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    let operation = posting.str_at("/priceOperationTypes/0/operationType/name");
    set(&mut draft.operation, operation)
}

/// `realEstateType.name` is e.g. `Departamento` or `Local comercial`
fn rule_property_type(posting: &Posting<'_>, draft: &mut ListingDraft) -> bool {
    let property_type = posting
        .str_at("/realEstateType/name")
        .and_then(|name| {
            name.split_whitespace()
                .next()
                .and_then(PropertyType::from_posting_word)
        })
        .or_else(|| {
            posting
                .str_at("/url")
                .and_then(|href| property_type_from_posting_url(&href))
        });
    set(&mut draft.property_type, property_type)
}

/// Run every rule against one posting; the posting itself is kept as raw data
pub(super) fn apply_rules(value: Value, page_url: &Url) -> Extracted {
    let mut draft = ListingDraft::default();
    let posting = Posting { value: &value, page_url };
    let missing = JSON_RULES
        .iter()
        .filter(|rule| !(rule.apply)(&posting, &mut draft))
        .map(|rule| rule.field)
        .collect();
    draft.raw_data = Some(value);
    (draft, missing)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn posting(n: usize) -> Value {
        json!({
            "postingId": format!("{}", 50_000 + n),
            "url": format!("/propiedades/clasificado/alclapin-departamento-en-palermo-{}.html", n),
            "priceOperationTypes": [{
                "operationType": { "name": "Alquiler" },
                "prices": [{ "amount": 900_000, "currency": "$", "formattedAmount": "900.000" }]
            }],
            "expenses": { "amount": 120_000, "currency": "$", "formattedAmount": "120.000" },
            "mainFeatures": {
                "CFT100": { "label": "Superficie total", "value": "75" },
                "CFT101": { "label": "Superficie cubierta", "value": "68" },
                "CFT1": { "label": "Ambientes", "value": "3" },
                "CFT2": { "label": "Dormitorios", "value": "2" },
                "CFT3": { "label": "Baños", "value": "1" },
                "CFT5": { "label": "Antigüedad", "value": "40" }
            },
            "publisher": { "publisherId": "778899", "name": "Inmobiliaria Norte" },
            "realEstateType": { "name": "Departamento" },
            "postingLocation": {
                "address": { "name": "Gorriti 4800" },
                "location": { "name": "Palermo", "parent": { "name": "Capital Federal" } },
                "postingGeolocation": {
                    "geolocation": { "latitude": -34.5889, "longitude": -58.4312 }
                }
            }
        })
    }

    pub(crate) fn state_script(postings: &[Value]) -> String {
        let state = json!({ "listStore": { "listPostings": postings } });
        format!(
            "<script id=\"preloadedData\">\n\t\t\t{} = {};\n\t\t\t{} = {{}};\n\t\t</script>",
            STATE_MARKER, state, STATE_END
        )
    }

    fn page_url() -> Url {
        Url::parse("https://www.zonaprop.com.ar/departamentos-alquiler.html").unwrap()
    }

    fn document(postings: &[Value]) -> Html {
        Html::parse_document(&format!(
            "<html><head>{}</head><body></body></html>",
            state_script(postings)
        ))
    }

    #[test]
    fn reads_postings_between_the_state_markers() {
        let found = postings(&document(&[posting(1), posting(2)])).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1]["postingId"], "50002");
    }

    #[test]
    fn no_script_or_no_postings_means_no_state() {
        assert!(postings(&Html::parse_document("<html><body></body></html>")).is_none());
        assert!(postings(&document(&[])).is_none());
    }

    #[test]
    fn invalid_state_is_ignored() {
        let html = Html::parse_document(
            r#"<script id="preloadedData">window.__PRELOADED_STATE__ = {"listStore": </script>"#,
        );
        assert!(postings(&html).is_none());
    }

    #[test]
    fn extracts_columns_only_the_state_has() {
        let (draft, missing) = apply_rules(posting(3), &page_url());

        assert_eq!(missing, vec!["garages"]);
        assert_eq!(
            draft.url.as_deref(),
            Some(
                "https://www.zonaprop.com.ar/propiedades/clasificado/\
                 alclapin-departamento-en-palermo-3.html"
            )
        );
        assert_eq!(draft.posting_id.as_deref(), Some("50003"));
        assert_eq!(draft.price, Some(Price { amount: 900_000, currency: Currency::Ars }));
        assert_eq!(draft.expenses, Some(Price { amount: 120_000, currency: Currency::Ars }));
        assert_eq!(draft.address.as_deref(), Some("Gorriti 4800"));
        assert_eq!(draft.location.as_deref(), Some("Palermo, Capital Federal"));
        assert_eq!(draft.total_area_m2, Some(75.0));
        assert_eq!(draft.covered_area_m2, Some(68.0));
        assert_eq!(draft.rooms, Some(3));
        assert_eq!(draft.bedrooms, Some(2));
        assert_eq!(draft.bathrooms, Some(1));
        assert_eq!(draft.antiquity, Some(40));
        assert_eq!(draft.property_type, Some(PropertyType::Apartment));
        assert_eq!(draft.agency.as_deref(), Some("Inmobiliaria Norte"));
        assert_eq!(draft.publisher_id.as_deref(), Some("778899"));
        assert_eq!(draft.latitude, Some(-34.5889));
        assert_eq!(draft.longitude, Some(-58.4312));
        assert_eq!(draft.operation.as_deref(), Some("Alquiler"));
        assert_eq!(draft.raw_data, Some(posting(3)));
    }

    #[test]
    fn price_falls_back_to_formatted_amount() {
        let mut value = posting(4);
        value["priceOperationTypes"][0]["prices"][0] =
            json!({ "currency": "USD", "formattedAmount": "USD 185.000" });
        value["realEstateType"]["name"] = json!("Local comercial");

        let (draft, _) = apply_rules(value, &page_url());
        assert_eq!(draft.price, Some(Price { amount: 185_000, currency: Currency::Usd }));
        assert_eq!(draft.property_type, Some(PropertyType::Commercial));
    }

    #[test]
    fn posting_without_url_has_no_url() {
        let mut value = posting(5);
        value["url"] = Value::Null;

        let (draft, missing) = apply_rules(value, &page_url());
        assert_eq!(draft.url, None);
        assert!(missing.contains(&"url"));
    }
}
