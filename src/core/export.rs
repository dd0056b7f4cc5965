use crate::domain::model::Listing;
use crate::domain::ports::Storage;
use crate::utils::error::{GemsError, Result};
use crate::utils::format::{format_currency, format_percent, sqft_to_acres};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_PREFIX: &str = "real-estate-gems";

pub fn report_file_name(postal_code: &str) -> String {
    format!("{}-{}.zip", REPORT_PREFIX, postal_code)
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    rank: usize,
    id: &'a str,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    zip_code: &'a str,
    property_type: &'a str,
    listing_price: String,
    market_value: String,
    discount: String,
    investment_score: u32,
    bedrooms: u32,
    bathrooms: f64,
    living_area_sqft: u64,
    lot_acres: String,
    latest_price_change: String,
    philosophy: &'a str,
}

impl<'a> ReportRow<'a> {
    fn new(rank: usize, listing: &'a Listing) -> Self {
        let latest_price_change = listing
            .recent_price_history(1)
            .first()
            .map(|h| format!("{} {}", h.date, format_currency(h.price)))
            .unwrap_or_default();

        Self {
            rank,
            id: &listing.id,
            address: &listing.address,
            city: &listing.city,
            state: &listing.state,
            zip_code: &listing.zip_code,
            property_type: &listing.property_type,
            listing_price: format_currency(listing.listing_price),
            market_value: format_currency(listing.market_value),
            discount: listing.discount().map(format_percent).unwrap_or_default(),
            investment_score: listing.investment_score,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            living_area_sqft: listing.living_area_sqft,
            lot_acres: sqft_to_acres(listing.lot_size_sqft),
            latest_price_change,
            philosophy: &listing.philosophy,
        }
    }
}

/// Writes the currently visible listings to a report bundle.
pub struct ReportExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn export(&self, postal_code: &str, listings: &[Listing]) -> Result<String> {
        if listings.is_empty() {
            return Err(GemsError::validation(
                "export",
                postal_code,
                "There are no listings to export.",
            ));
        }

        let file_name = report_file_name(postal_code);
        tracing::info!("💾 Exporting {} listings to {}", listings.len(), file_name);

        let csv_data = {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for (index, listing) in listings.iter().enumerate() {
                writer.serialize(ReportRow::new(index + 1, listing))?;
            }
            writer
                .into_inner()
                .map_err(|e| GemsError::Io(e.into_error()))?
        };

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("listings.csv", FileOptions::default())?;
            zip.write_all(&csv_data)?;

            zip.start_file::<_, ()>("listings.json", FileOptions::default())?;
            let json_data = serde_json::to_string_pretty(listings)?;
            zip.write_all(json_data.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&file_name, &zip_data).await?;

        Ok(file_name)
    }
}
