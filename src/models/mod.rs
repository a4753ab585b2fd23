use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of property a search page or listing refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Land,
    Commercial,
    Ph,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Commercial,
        PropertyType::Ph,
    ];

    /// Slug used in ZonaProp search URLs and on the command line
    pub fn slug(self) -> &'static str {
        match self {
            PropertyType::Apartment => "departamentos",
            PropertyType::House => "casas",
            PropertyType::Land => "terrenos",
            PropertyType::Commercial => "locales-comerciales",
            PropertyType::Ph => "ph",
        }
    }

    /// Name written to the CSV output
    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
            PropertyType::Ph => "ph",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    /// Singular word a posting URL uses for this type, e.g. `departamento`
    fn posting_words(self) -> &'static [&'static str] {
        match self {
            PropertyType::Apartment => &["departamento", "departamentos"],
            PropertyType::House => &["casa", "casas"],
            PropertyType::Land => &["terreno", "terrenos", "lote"],
            PropertyType::Commercial => &["local", "locales"],
            PropertyType::Ph => &["ph"],
        }
    }

    /// Guess the type from a single hyphen-separated token of a posting URL
    pub fn from_posting_word(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.posting_words().contains(&word.as_str()))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(&s.trim().to_ascii_lowercase()).ok_or_else(|| {
            let valid: Vec<_> = Self::ALL.iter().map(|t| t.slug()).collect();
            format!("unknown property type '{}', expected one of: {}", s, valid.join(", "))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Sale,
    Rental,
}

impl TransactionType {
    pub fn slug(self) -> &'static str {
        match self {
            TransactionType::Sale => "venta",
            TransactionType::Rental => "alquiler",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Rental => "rental",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "venta" => Ok(TransactionType::Sale),
            "alquiler" => Ok(TransactionType::Rental),
            other => Err(format!(
                "unknown transaction type '{}', expected venta or alquiler",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "ARS")]
    Ars,
}

impl Currency {
    /// Currency as the site's embedded data names it: `USD`, `U$S`, `ARS` or `$`
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" | "U$S" => Some(Currency::Usd),
            "ARS" | "$" => Some(Currency::Ars),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ars => "ARS",
        }
    }
}

/// Amount as shown on the card, in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: u64,
    pub currency: Currency,
}

impl Price {
    /// Parse card text such as `USD 120.000`, `$ 450.000` or `+ $ 45.000 Expensas`.
    ///
    /// ZonaProp formats amounts with `.` as the thousands separator. Text
    /// without a currency marker or without digits (`Consultar precio`)
    /// yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let upper = text.to_ascii_uppercase();
        let (currency, marker) = if let Some(pos) = upper.find("USD") {
            (Currency::Usd, pos + 3)
        } else if let Some(pos) = upper.find("U$S") {
            (Currency::Usd, pos + 3)
        } else if let Some(pos) = upper.find('$') {
            (Currency::Ars, pos + 1)
        } else {
            return None;
        };

        let digits: String = upper[marker..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .filter(char::is_ascii_digit)
            .collect();
        let amount = digits.parse().ok()?;

        Some(Self { amount, currency })
    }
}

/// One listing scraped from a results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub url: String,
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
    pub transaction_type: TransactionType,
    pub agency: Option<String>,
    pub publisher_id: Option<String>,
    /// Building age in years
    pub antiquity: Option<u32>,
    pub garages: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Operation name as published, e.g. `Alquiler`
    pub operation: Option<String>,
    pub scraped_at: DateTime<Utc>,
    /// Posting object from the page's embedded state, when the page had one
    pub raw_data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dollar_prices_with_thousands_dots() {
        assert_eq!(
            Price::parse("USD 120.000"),
            Some(Price { amount: 120_000, currency: Currency::Usd })
        );
        assert_eq!(
            Price::parse("U$S 1.250.000"),
            Some(Price { amount: 1_250_000, currency: Currency::Usd })
        );
    }

    #[test]
    fn parses_peso_prices_and_expenses() {
        assert_eq!(
            Price::parse("$ 450.000"),
            Some(Price { amount: 450_000, currency: Currency::Ars })
        );
        assert_eq!(
            Price::parse("+ $ 45.000 Expensas"),
            Some(Price { amount: 45_000, currency: Currency::Ars })
        );
    }

    #[test]
    fn price_on_request_is_missing() {
        assert_eq!(Price::parse("Consultar precio"), None);
        assert_eq!(Price::parse("USD"), None);
        assert_eq!(Price::parse(""), None);
    }

    #[test]
    fn currency_codes_from_embedded_data() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("$"), Some(Currency::Ars));
        assert_eq!(Currency::from_code("ars"), Some(Currency::Ars));
        assert_eq!(Currency::from_code("EUR"), None);
    }

    #[test]
    fn property_type_slugs() {
        assert_eq!("casas".parse::<PropertyType>(), Ok(PropertyType::House));
        assert_eq!(
            "locales-comerciales".parse::<PropertyType>(),
            Ok(PropertyType::Commercial)
        );
        assert!("castillos".parse::<PropertyType>().is_err());
        assert_eq!(
            PropertyType::from_posting_word("Departamento"),
            Some(PropertyType::Apartment)
        );
        assert_eq!(PropertyType::from_posting_word("palermo"), None);
    }

    #[test]
    fn transaction_type_slugs() {
        assert_eq!("venta".parse::<TransactionType>(), Ok(TransactionType::Sale));
        assert_eq!("Alquiler".parse::<TransactionType>(), Ok(TransactionType::Rental));
        assert!("permuta".parse::<TransactionType>().is_err());
    }
}
