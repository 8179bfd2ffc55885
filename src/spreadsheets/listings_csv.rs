use crate::domain::extract::{parse_area_sqft, parse_price};
use crate::domain::CanonicalListing;
use crate::errors::ServerError;

const BOM: &str = "\u{feff}";

/// CSV with a UTF-8 BOM so spreadsheet apps pick the right encoding for the
/// rupee sign. The header is the canonical field list.
pub fn listings_to_csv(listings: &[CanonicalListing]) -> Result<Vec<u8>, ServerError> {
    let mut out = BOM.as_bytes().to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut out);

        writer
            .write_record(CanonicalListing::FIELD_NAMES)
            .map_err(|e| ServerError::Export(format!("Failed to write header: {e}")))?;

        for listing in listings {
            writer
                .serialize(listing)
                .map_err(|e| ServerError::Export(format!("Failed to write row: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| ServerError::Export(format!("Failed to flush CSV: {e}")))?;
    }
    Ok(out)
}

/// Parses an exported CSV back into listings. Derived fields are
/// recomputed rather than trusted; any bad row fails the whole import.
pub fn listings_from_csv(bytes: &[u8]) -> Result<Vec<CanonicalListing>, ServerError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ServerError::Import(e.to_string()))?;
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut listings = Vec::new();
    for (i, row) in reader.deserialize::<CanonicalListing>().enumerate() {
        let mut listing = row.map_err(|e| ServerError::Import(format!("row {}: {e}", i + 1)))?;

        if listing.price_numeric.is_none() {
            listing.price_numeric = listing.price_text.as_deref().and_then(parse_price);
        }
        if listing.area_sqft.is_none() {
            listing.area_sqft = listing.area_text.as_deref().and_then(parse_area_sqft);
        }
        listing.recompute_derived();
        listings.push(listing);
    }
    Ok(listings)
}
