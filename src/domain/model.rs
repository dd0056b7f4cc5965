use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One dated price point attached to a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PriceHistory {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
}

impl PriceHistory {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

/// A property candidate as returned by the search backend.
///
/// Every field is optional on the wire. Missing values fall back to their
/// empty default, so an absent `isActive` reads as inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Listing {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub zip_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub property_type: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub listing_price: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub market_value: f64,
    #[serde(deserialize_with = "lenient_u32")]
    pub bedrooms: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub bathrooms: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub living_area_sqft: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub lot_size_sqft: u64,
    #[serde(deserialize_with = "lenient_string")]
    pub image_url: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub investment_score: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub price_history: Vec<PriceHistory>,
    #[serde(deserialize_with = "lenient_string")]
    pub philosophy: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
}

impl Listing {
    /// `(marketValue - listingPrice) / marketValue`.
    ///
    /// `None` when the market value is zero, negative or not finite; such
    /// listings never pass a discount threshold.
    pub fn discount(&self) -> Option<f64> {
        if !self.market_value.is_finite() || self.market_value <= 0.0 {
            return None;
        }
        let discount = (self.market_value - self.listing_price) / self.market_value;
        discount.is_finite().then_some(discount)
    }

    pub fn meets_discount(&self, threshold: f64) -> bool {
        self.discount().is_some_and(|d| d >= threshold)
    }

    /// Price history sorted newest first, capped at `limit` entries.
    /// Entries with unparseable dates sort last.
    pub fn recent_price_history(&self, limit: usize) -> Vec<&PriceHistory> {
        let mut entries: Vec<&PriceHistory> = self.price_history.iter().collect();
        entries.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
        entries.truncate(limit);
        entries
    }

    pub fn is_vacant_land(&self) -> bool {
        self.property_type.to_ascii_lowercase().contains("land")
    }
}

/// A structured-output request for the search backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPrompt {
    pub system_instruction: String,
    pub user_prompt: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(u64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Loose::Int(v) => Some(*v as f64),
            Loose::Float(v) => Some(*v),
            Loose::Text(s) => s.trim().replace([',', '$'], "").parse().ok(),
            Loose::Bool(_) => None,
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).unwrap_or_default())
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or_default())
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = lenient_u64(deserializer)?;
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Text(s)) => s,
        Some(Loose::Int(v)) => v.to_string(),
        Some(Loose::Float(v)) => v.to_string(),
        Some(Loose::Bool(v)) => v.to_string(),
        None => String::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(listing_price: f64, market_value: f64) -> Listing {
        Listing {
            listing_price,
            market_value,
            ..Listing::default()
        }
    }

    #[test]
    fn test_discount_is_derived_from_prices() {
        let l = listing(300_000.0, 400_000.0);
        assert_eq!(l.discount(), Some(0.25));
        assert!(l.meets_discount(0.2));
        assert!(!l.meets_discount(0.3));
    }

    #[test]
    fn test_zero_market_value_has_no_discount() {
        let l = listing(100_000.0, 0.0);
        assert_eq!(l.discount(), None);
        assert!(!l.meets_discount(0.1));
    }

    #[test]
    fn test_overpriced_listing_never_meets_threshold() {
        let l = listing(500_000.0, 400_000.0);
        assert!(l.discount().unwrap() < 0.0);
        assert!(!l.meets_discount(0.1));
    }

    #[test]
    fn test_deserialize_external_schema() {
        let value = json!({
            "id": "p-1",
            "address": "1 Main St",
            "city": "Beverly Hills",
            "state": "CA",
            "zipCode": "90210",
            "propertyType": "Residential",
            "listingPrice": 360000,
            "marketValue": 450000.0,
            "bedrooms": 3.0,
            "bathrooms": 2.5,
            "livingAreaSqft": "1,850",
            "lotSizeSqft": 174240,
            "imageUrl": "https://img.example.com/1.jpg",
            "investmentScore": 88,
            "priceHistory": [{"date": "2024-01-05", "price": 380000}],
            "philosophy": "Priced below comparable sales.",
            "isActive": true
        });

        let l: Listing = serde_json::from_value(value).unwrap();
        assert_eq!(l.zip_code, "90210");
        assert_eq!(l.listing_price, 360_000.0);
        assert_eq!(l.bedrooms, 3);
        assert_eq!(l.bathrooms, 2.5);
        assert_eq!(l.living_area_sqft, 1850);
        assert_eq!(l.lot_size_sqft, 174_240);
        assert_eq!(l.investment_score, 88);
        assert_eq!(l.price_history.len(), 1);
        assert!(l.is_active);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let l: Listing = serde_json::from_value(json!({
            "id": 7,
            "zipCode": null,
            "address": null,
            "priceHistory": null,
            "isActive": null
        })).unwrap();
        assert_eq!(l.id, "7");
        assert_eq!(l.zip_code, "");
        assert!(l.price_history.is_empty());
        assert!(!l.is_active);
    }

    #[test]
    fn test_recent_price_history_sorts_by_date() {
        let l = Listing {
            price_history: vec![
                PriceHistory { date: "2023-03-01".into(), price: 1.0 },
                PriceHistory { date: "not a date".into(), price: 0.0 },
                PriceHistory { date: "2024-07-15".into(), price: 3.0 },
                PriceHistory { date: "2023-11-20".into(), price: 2.0 },
            ],
            ..Listing::default()
        };

        let recent = l.recent_price_history(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, "2024-07-15");
        assert_eq!(recent[1].date, "2023-11-20");
        assert_eq!(l.recent_price_history(10).last().unwrap().date, "not a date");
    }
}
