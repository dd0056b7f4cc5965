use crate::core::prompt::MAX_PRICE_HISTORY;
use crate::core::session::ViewSnapshot;
use crate::core::view::DiscountLevel;
use crate::domain::model::Listing;
use crate::utils::format::{format_currency, format_percent, sqft_to_acres};
use std::io::Write;

pub fn render_snapshot<W: Write>(snapshot: &ViewSnapshot, out: &mut W) -> std::io::Result<()> {
    if snapshot.loading {
        if let Some(zip) = &snapshot.postal_code {
            writeln!(out, "Analyzing listings for ZIP code {}...", zip)?;
        }
        return Ok(());
    }

    if let Some(error) = &snapshot.error {
        writeln!(out, "AN ERROR OCCURRED")?;
        writeln!(out, "  {}", error)?;
        return Ok(());
    }

    let Some(zip) = &snapshot.postal_code else {
        writeln!(out, "Ready to discover value? Enter a ZIP code to start: search <zip>")?;
        return Ok(());
    };

    if snapshot.active_count > 0 {
        let levels: Vec<String> = DiscountLevel::ALL
            .iter()
            .map(|level| {
                if *level == snapshot.discount {
                    format!("[{}]", level)
                } else {
                    level.to_string()
                }
            })
            .collect();
        writeln!(out, "Minimum discount: {}", levels.join(" "))?;
    }

    if snapshot.visible.is_empty() {
        writeln!(
            out,
            "No listings in {} match a discount of at least {}.",
            zip, snapshot.discount
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "Showing {} of {} listings in {} (≥ {} below market value)",
        snapshot.visible.len(),
        snapshot.filtered_count,
        zip,
        snapshot.discount
    )?;

    for (index, listing) in snapshot.visible.iter().enumerate() {
        let expanded = snapshot.selected.as_deref() == Some(listing.id.as_str());
        render_listing(index + 1, listing, expanded, out)?;
    }

    if snapshot.has_more {
        writeln!(out, "Type `more` to load more gems.")?;
    }
    Ok(())
}

pub fn render_listing<W: Write>(
    rank: usize,
    listing: &Listing,
    expanded: bool,
    out: &mut W,
) -> std::io::Result<()> {
    let discount = listing
        .discount()
        .map(format_percent)
        .unwrap_or_else(|| "n/a".to_string());

    writeln!(
        out,
        "{:>2}. [{}] {}, {}, {} {}",
        rank, listing.investment_score, listing.address, listing.city, listing.state, listing.zip_code
    )?;
    writeln!(
        out,
        "    {} | {} listed, {} value, {} discount",
        listing.property_type,
        format_currency(listing.listing_price),
        format_currency(listing.market_value),
        discount
    )?;

    if !expanded {
        return Ok(());
    }

    if listing.is_vacant_land() {
        writeln!(out, "    Lot: {} acres", sqft_to_acres(listing.lot_size_sqft))?;
    } else {
        writeln!(
            out,
            "    {} bd | {} ba | {} sqft | lot {} acres",
            listing.bedrooms,
            listing.bathrooms,
            listing.living_area_sqft,
            sqft_to_acres(listing.lot_size_sqft)
        )?;
    }
    if !listing.philosophy.is_empty() {
        writeln!(out, "    Why: {}", listing.philosophy)?;
    }

    let history = listing.recent_price_history(MAX_PRICE_HISTORY);
    if history.is_empty() {
        writeln!(out, "    Price history: none available")?;
    } else {
        writeln!(out, "    Price history:")?;
        for entry in history {
            writeln!(out, "      {}  {}", entry.date, format_currency(entry.price))?;
        }
    }
    if !listing.image_url.is_empty() {
        writeln!(out, "    Image: {}", listing.image_url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PriceHistory;

    fn snapshot(visible: Vec<Listing>) -> ViewSnapshot {
        ViewSnapshot {
            postal_code: Some("90210".into()),
            discount: DiscountLevel::Twenty,
            active_count: visible.len(),
            filtered_count: visible.len(),
            visible,
            selected: None,
            has_more: false,
            loading: false,
            error: None,
        }
    }

    fn render(snapshot: &ViewSnapshot) -> String {
        let mut out = Vec::new();
        render_snapshot(snapshot, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_error_replaces_results() {
        let mut s = snapshot(vec![]);
        s.error = Some("Failed to fetch real estate data.".into());
        let text = render(&s);
        assert!(text.contains("AN ERROR OCCURRED"));
        assert!(!text.contains("Showing"));
    }

    #[test]
    fn test_expanded_listing_shows_details() {
        let listing = Listing {
            id: "p1".into(),
            address: "12 Elm St".into(),
            listing_price: 360_000.0,
            market_value: 480_000.0,
            investment_score: 91,
            philosophy: "Cheap relative to comps.".into(),
            price_history: vec![PriceHistory { date: "2024-02-01".into(), price: 360_000.0 }],
            is_active: true,
            ..Listing::default()
        };
        let mut s = snapshot(vec![listing]);
        assert!(!render(&s).contains("Why:"));

        s.selected = Some("p1".into());
        let text = render(&s);
        assert!(text.contains("[20%]"));
        assert!(text.contains("$360,000 listed"));
        assert!(text.contains("25.0% discount"));
        assert!(text.contains("Why: Cheap relative to comps."));
        assert!(text.contains("2024-02-01  $360,000"));
    }

    #[test]
    fn test_idle_prompt_without_search() {
        let mut s = snapshot(vec![]);
        s.postal_code = None;
        assert!(render(&s).contains("Enter a ZIP code"));
    }
}
