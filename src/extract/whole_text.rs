use super::patterns;
use super::ExtractedRecord;

/// Runs every recognizer once over the full body.
///
/// Returns `None` for an empty body, which is distinct from a record with no
/// fields. Destination comes from the first line holding a weight token; that
/// line is the only one tried.
pub fn extract_whole_text(text: &str) -> Option<ExtractedRecord> {
    if text.is_empty() {
        return None;
    }
    let destination = text
        .lines()
        .find(|line| patterns::weight(line).is_some())
        .and_then(patterns::destination_from_line);
    Some(ExtractedRecord {
        vehicle_number: patterns::vehicle_number(text).map(String::from),
        so_number: patterns::so_number(text).map(String::from),
        phone_number: patterns::phone_number(text).map(String::from),
        weight: patterns::weight(text).map(String::from),
        destination,
        ..Default::default()
    })
}
