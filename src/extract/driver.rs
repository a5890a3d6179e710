use super::patterns;
use super::whole_text::extract_whole_text;
use super::ExtractedRecord;

/// Driver details carried by a `<name> - <license>` line, plus whatever
/// dispatch fields follow the license.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverInfo {
    pub driver_name: Option<String>,
    pub driver_license: Option<String>,
    pub additional: ExtractedRecord,
}

impl DriverInfo {
    pub fn is_present(&self) -> bool {
        self.driver_name.is_some() || self.driver_license.is_some()
    }
}

/// Parses the second non-empty line of a driver-info command.
///
/// Without a 4 digit license on that line nothing is returned, not even a name.
pub fn extract_driver_info(text: &str) -> DriverInfo {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let Some(driver_line) = lines.get(1) else {
        return DriverInfo::default();
    };
    let Some(license) = patterns::find_driver_license(driver_line) else {
        return DriverInfo::default();
    };

    let name = driver_line[..license.start()].trim();
    let name = name.strip_suffix('-').unwrap_or(name).trim();

    let mut rest = driver_line[license.end()..].trim().to_string();
    if lines.len() > 2 {
        rest.push('\n');
        rest.push_str(&lines[2..].join("\n"));
    }
    let additional = if rest.trim().is_empty() {
        ExtractedRecord::default()
    } else {
        extract_whole_text(&rest).unwrap_or_default()
    };

    DriverInfo {
        driver_name: (!name.is_empty()).then(|| name.to_string()),
        driver_license: Some(license.as_str().to_string()),
        additional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_license_and_trailing_phone() {
        let info = extract_driver_info("ap kara\nRamesh Kumar - 1234 extra 9123456789");
        assert_eq!(info.driver_name.as_deref(), Some("Ramesh Kumar"));
        assert_eq!(info.driver_license.as_deref(), Some("1234"));
        assert_eq!(info.additional.phone_number.as_deref(), Some("9123456789"));
        assert!(info.additional.vehicle_number.is_none());
    }

    #[test]
    fn empty_name_before_hyphen() {
        let info = extract_driver_info("ap kara\n- 1234");
        assert_eq!(info.driver_name, None);
        assert_eq!(info.driver_license.as_deref(), Some("1234"));
        assert!(info.additional.is_empty());
    }

    #[test]
    fn later_lines_feed_the_additional_record() {
        let info = extract_driver_info("ap kara\n\nSuresh-4321\nGJ5AB123\nRajkot 22 MT");
        assert_eq!(info.driver_name.as_deref(), Some("Suresh"));
        assert_eq!(info.additional.vehicle_number.as_deref(), Some("GJ5AB123"));
        assert_eq!(info.additional.weight.as_deref(), Some("22"));
        assert_eq!(info.additional.destination.as_deref(), Some("Rajkot"));
    }

    #[test]
    fn no_license_means_no_driver_fields() {
        assert!(!extract_driver_info("ap kara\nRamesh Kumar").is_present());
        assert!(!extract_driver_info("ap kara").is_present());
    }
}
