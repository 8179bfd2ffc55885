use crate::domain::CanonicalListing;
use crate::errors::ServerError;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

fn xlsx_err(what: &str) -> impl Fn(XlsxError) -> ServerError + '_ {
    move |e| ServerError::Export(format!("Failed to write {what}: {e}"))
}

/// Same columns as the CSV export; numbers stay numeric so the sheet sorts.
pub fn listings_to_xlsx(listings: &[CanonicalListing]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    // Headers
    for (col, header) in CanonicalListing::FIELD_NAMES.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(xlsx_err(header))?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;

        let text_cells: [(u16, Option<&str>); 5] = [
            (1, listing.title.as_deref()),
            (2, listing.project.as_deref()),
            (3, listing.builder.as_deref()),
            (6, listing.price_text.as_deref()),
            (8, listing.area_text.as_deref()),
        ];
        for (col, value) in text_cells {
            worksheet
                .write_string(r, col, value.unwrap_or(""))
                .map_err(xlsx_err("text cell"))?;
        }

        worksheet
            .write_string(r, 0, listing.source.label())
            .map_err(xlsx_err("source"))?;
        worksheet
            .write_boolean(r, 4, listing.is_preferred_builder)
            .map_err(xlsx_err("preferred flag"))?;
        worksheet
            .write_string(r, 5, listing.bhk.as_str())
            .map_err(xlsx_err("bhk"))?;

        let number_cells = [
            (7, listing.price_numeric),
            (9, listing.area_sqft),
            (10, listing.price_per_sqft),
        ];
        for (col, value) in number_cells {
            if let Some(n) = value {
                worksheet.write_number(r, col, n).map_err(xlsx_err("number"))?;
            }
        }

        worksheet
            .write_string(r, 11, listing.rera.as_str())
            .map_err(xlsx_err("rera"))?;

        if let Some(url) = &listing.property_url {
            worksheet.write_url(r, 12, url.as_str()).map_err(xlsx_err("url"))?;
        }
        worksheet
            .write_string(r, 13, listing.description.as_deref().unwrap_or(""))
            .map_err(xlsx_err("description"))?;
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::Export(format!("Failed to save workbook: {e}")))
}
