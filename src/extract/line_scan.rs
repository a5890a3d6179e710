use super::patterns;
use super::ExtractedRecord;

/// Walks trimmed, non-empty lines and fills each field from the first line
/// that matches it.
///
/// Weight and destination are taken together: once any line has supplied a
/// weight, no later line is tried for either, even if the weight line had no
/// usable destination.
pub fn extract_by_lines(text: &str) -> ExtractedRecord {
    let mut record = ExtractedRecord::default();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if record.vehicle_number.is_none() {
            record.vehicle_number = patterns::vehicle_number(line).map(String::from);
        }
        if record.phone_number.is_none() {
            record.phone_number = patterns::phone_number(line).map(String::from);
        }
        if record.so_number.is_none() {
            record.so_number = patterns::so_number(line).map(String::from);
        }
        if record.weight.is_none() {
            if let Some(weight) = patterns::weight(line) {
                record.weight = Some(weight.to_string());
                if record.destination.is_none() {
                    record.destination = patterns::destination_from_line(line);
                }
            }
        }
    }
    record
}
