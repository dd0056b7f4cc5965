//! Display helpers shared by the terminal renderer and the export bundle.

const SQFT_PER_ACRE: f64 = 43_560.0;

/// Whole-dollar US currency, e.g. `$1,250,000`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

pub fn sqft_to_acres(sqft: u64) -> String {
    format!("{:.2}", sqft as f64 / SQFT_PER_ACRE)
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
