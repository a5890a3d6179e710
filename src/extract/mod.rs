//! Structured field extraction from free-text dispatch messages.

mod driver;
mod line_scan;
pub mod patterns;
mod whole_text;

pub use driver::extract_driver_info;
pub use line_scan::extract_by_lines;
pub use whole_text::extract_whole_text;

/// Fields pulled out of one triggering event. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub vehicle_number: Option<String>,
    pub so_number: Option<String>,
    pub phone_number: Option<String>,
    pub weight: Option<String>,
    pub destination: Option<String>,
    pub driver_license: Option<String>,
    pub driver_name: Option<String>,
}

impl ExtractedRecord {
    /// Field-wise merge: a field already present on `self` wins, otherwise the
    /// fallback's value is taken.
    pub fn merge(self, fallback: ExtractedRecord) -> ExtractedRecord {
        ExtractedRecord {
            vehicle_number: self.vehicle_number.or(fallback.vehicle_number),
            so_number: self.so_number.or(fallback.so_number),
            phone_number: self.phone_number.or(fallback.phone_number),
            weight: self.weight.or(fallback.weight),
            destination: self.destination.or(fallback.destination),
            driver_license: self.driver_license.or(fallback.driver_license),
            driver_name: self.driver_name.or(fallback.driver_name),
        }
    }

    /// Replaces every field for which `newer` has a value.
    pub fn overlay(&mut self, newer: ExtractedRecord) {
        *self = newer.merge(std::mem::take(self));
    }

    pub fn is_empty(&self) -> bool {
        *self == ExtractedRecord::default()
    }
}

/// Whole-text pass with the line scan filling whatever it left absent.
pub fn extract_quoted(text: &str) -> ExtractedRecord {
    extract_whole_text(text)
        .unwrap_or_default()
        .merge(extract_by_lines(text))
}
