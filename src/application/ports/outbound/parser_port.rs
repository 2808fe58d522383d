/// Extracts monster identifiers from listing-page markup.
///
/// The pipeline treats the markup format as opaque; whatever implements this
/// decides what counts as a listing row.
pub trait ListingParserPort: Send + Sync {
    /// Return the identifiers found on one page, in document order.
    fn extract_ids(&self, html: &str) -> Vec<String>;
}
