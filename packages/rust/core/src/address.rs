//! Structured address → single geocodable string.

use unifind_shared::StructuredAddress;

/// Country appended to every geocode query; listings are Irish.
pub const COUNTRY: &str = "Ireland";

/// Join the address parts and country with `", "`, dropping empty parts.
pub fn format_address(address: &StructuredAddress) -> String {
    [
        Some(address.address_line1.as_str()),
        address.address_line2.as_deref(),
        Some(address.town_city.as_str()),
        Some(address.county.as_str()),
        Some(address.eircode.as_str()),
        Some(COUNTRY),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Names of required fields that are blank.
pub fn missing_fields(address: &StructuredAddress) -> Vec<&'static str> {
    [
        ("addressLine1", &address.address_line1),
        ("townCity", &address.town_city),
        ("county", &address.county),
        ("eircode", &address.eircode),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cork() -> StructuredAddress {
        StructuredAddress {
            address_line1: "1 Main St".into(),
            address_line2: Some(String::new()),
            town_city: "Cork".into(),
            county: "Cork".into(),
            eircode: "T12ABC".into(),
        }
    }

    #[test]
    fn empty_second_line_is_omitted() {
        assert_eq!(format_address(&cork()), "1 Main St, Cork, Cork, T12ABC, Ireland");
    }

    #[test]
    fn second_line_included_in_order() {
        let address = StructuredAddress {
            address_line2: Some("Apartment 4".into()),
            ..cork()
        };
        assert_eq!(
            format_address(&address),
            "1 Main St, Apartment 4, Cork, Cork, T12ABC, Ireland"
        );
    }

    #[test]
    fn blank_parts_leave_no_double_commas() {
        let address = StructuredAddress {
            address_line1: "1 Main St".into(),
            address_line2: None,
            town_city: "  ".into(),
            county: String::new(),
            eircode: "T12ABC".into(),
        };
        let formatted = format_address(&address);
        assert_eq!(formatted, "1 Main St, T12ABC, Ireland");
        assert!(!formatted.contains(",,"));
        assert_eq!(missing_fields(&address), vec!["townCity", "county"]);
    }

    #[test]
    fn complete_address_has_no_missing_fields() {
        assert!(missing_fields(&cork()).is_empty());
    }
}
