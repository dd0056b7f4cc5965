use crate::domain::model::SearchPrompt;

pub const MIN_LISTINGS: usize = 10;
pub const MAX_LISTINGS: usize = 15;
pub const MAX_PRICE_HISTORY: usize = 5;

pub const SYSTEM_INSTRUCTION: &str = "You are a real estate data API. Your entire response must be a single, valid JSON object. Do not wrap it in markdown or add any other text.";

const LISTING_SCHEMA: &str = r#"{
    "id": "string (Unique identifier)",
    "address": "string (Street address)",
    "city": "string",
    "state": "string (State abbreviation)",
    "zipCode": "string (5-digit ZIP code)",
    "propertyType": "string (e.g., 'Residential', 'Commercial', 'Vacant Land')",
    "listingPrice": "number (Current asking price in USD)",
    "marketValue": "number (Estimated fair market value, must be higher than listing price)",
    "bedrooms": "integer (Can be 0 for commercial or land)",
    "bathrooms": "number (Can be 0 for commercial or land)",
    "livingAreaSqft": "integer (Interior square footage of the building. Should be 0 for vacant land.)",
    "lotSizeSqft": "integer (Total lot size in square feet.)",
    "imageUrl": "string (A valid URL for a property image)",
    "investmentScore": "integer (1-100, based on Graham's principles)",
    "priceHistory": [ { "date": "string (YYYY-MM-DD)", "price": "number" } ],
    "philosophy": "string (2-3 sentences on why it's a good value investment)",
    "isActive": "boolean (Must be true for all results)"
  }"#;

/// Builds the structured-output request for one postal code.
pub fn build_search_prompt(postal_code: &str) -> SearchPrompt {
    let user_prompt = format!(
        r#"Primary task: Use Google Search to find {min}-{max} undervalued real estate listings in ZIP code {zip}. If you cannot find {min}, return as many as possible.
Property types: Include residential, commercial, and vacant land.
CRITICAL RULE 1: All properties MUST be actively "For Sale" on public websites (Zillow, Redfin, etc.). Set "isActive" to true for all.
CRITICAL RULE 2: DATA ACCURACY IS THE #1 PRIORITY. You must extract all numerical data with 100% precision from the source listing. There is no room for error.
- LATEST PRICE ERROR EXAMPLE TO AVOID: A property listed at $360,000 must have `listingPrice`: 360000. It must NOT be a different number like 328160. You must verify the current price from the source.
- Price Error Example to Avoid: A listing for $11,999,000 must be `listingPrice`: 11999000, NOT 1100000.
- Lot Size Error Example to Avoid: A 4-acre lot must be `lotSizeSqft`: 174240, NOT 43560.
CRITICAL RULE 3: You MUST find the price history for each property from the source listing. Find as many recent entries as you can, up to {history}. If, after exhaustive searching of the source, no history is available, you may return an empty array for `priceHistory`.
Data requirements:
- For vacant land, `livingAreaSqft` must be 0. Always provide `lotSizeSqft`.
- Focus on properties where the listing price appears to be below the general market value for similar properties in the area (this is your basis for the 'margin of safety').
Output format: Your entire response must be ONLY a single JSON object: {{ "properties": [...] }}.
The array items must strictly follow this structure: {schema}. Do not include markdown or extra text.
"#,
        min = MIN_LISTINGS,
        max = MAX_LISTINGS,
        zip = postal_code,
        history = MAX_PRICE_HISTORY,
        schema = LISTING_SCHEMA,
    );

    SearchPrompt {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        user_prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_targets_postal_code_and_output_shape() {
        let prompt = build_search_prompt("90210");

        assert!(prompt.user_prompt.contains("10-15 undervalued real estate listings in ZIP code 90210"));
        assert!(prompt.user_prompt.contains(r#"{ "properties": [...] }"#));
        assert!(prompt.user_prompt.contains("up to 5"));
        assert!(prompt.user_prompt.contains("vacant land"));
        assert!(prompt.system_instruction.contains("single, valid JSON object"));
    }

    #[test]
    fn test_prompt_warns_about_scale_errors() {
        let prompt = build_search_prompt("10001");

        assert!(prompt.user_prompt.contains("`lotSizeSqft`: 174240, NOT 43560"));
        assert!(prompt.user_prompt.contains("11999000, NOT 1100000"));
        assert!(prompt.user_prompt.contains("\"isActive\": \"boolean"));
    }
}
