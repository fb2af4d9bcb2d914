use crate::data::DistrictProps;
use crate::risk::{classify, RiskCategory};

/// Placeholder shown when a district has no usable name.
pub const UNKNOWN_DISTRICT: &str = "Unknown";
/// Placeholder shown when a district has no state.
pub const UNKNOWN_STATE: &str = "Unknown State";
/// Placeholder shown when a district has no risk level.
pub const RISK_NOT_AVAILABLE: &str = "Not Available";

/// District name with ordered fallback: district_name, then name, then a
/// placeholder.
pub fn district_name(props: &DistrictProps) -> &str {
    props.primary_name().unwrap_or(UNKNOWN_DISTRICT)
}

/// State name, falling back to a placeholder.
pub fn state_name(props: &DistrictProps) -> &str {
    props.state.as_deref().unwrap_or(UNKNOWN_STATE)
}

/// Raw risk level text, falling back to a placeholder.
pub fn risk_level(props: &DistrictProps) -> &str {
    props.risk_level.as_deref().unwrap_or(RISK_NOT_AVAILABLE)
}

/// Detail payload for one district. Content and absence rules are the
/// contract here; the UI decides the layout.
#[derive(Clone, Debug)]
pub struct PopupContent {
    pub title: String,
    pub state: String,
    /// Upper-cased risk level text, colored by `category` when rendered.
    pub risk_level: String,
    pub category: RiskCategory,
    /// (label, value) rows for metrics the data actually carries. Empty
    /// when elevation, rainfall, and population are all absent, in which
    /// case the UI omits the block entirely.
    pub details: Vec<(&'static str, String)>,
}

impl PopupContent {
    pub fn has_details(&self) -> bool {
        !self.details.is_empty()
    }
}

/// Build the popup payload for a district's properties.
pub fn build_popup(props: &DistrictProps) -> PopupContent {
    let mut details = Vec::new();
    if let Some(elevation) = &props.elevation {
        details.push(("Elevation", format!("{elevation} m")));
    }
    if let Some(rainfall) = &props.rainfall {
        details.push(("Annual Rainfall", format!("{rainfall} mm")));
    }
    if let Some(population) = &props.population {
        details.push(("Population", population.clone()));
    }

    PopupContent {
        title: district_name(props).to_string(),
        state: state_name(props).to_string(),
        risk_level: risk_level(props).to_uppercase(),
        category: classify(props.risk_level.as_deref().unwrap_or("")),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(
        district_name: Option<&str>,
        name: Option<&str>,
        state: Option<&str>,
        risk_level: Option<&str>,
    ) -> DistrictProps {
        DistrictProps {
            district_name: district_name.map(String::from),
            name: name.map(String::from),
            state: state.map(String::from),
            risk_level: risk_level.map(String::from),
            ..DistrictProps::default()
        }
    }

    #[test]
    fn test_name_fallback_chain() {
        let full = props(Some("Patna"), Some("patna-alt"), None, None);
        assert_eq!(build_popup(&full).title, "Patna");

        let name_only = props(None, Some("Guwahati"), None, None);
        assert_eq!(build_popup(&name_only).title, "Guwahati");

        let neither = props(None, None, None, None);
        assert_eq!(build_popup(&neither).title, UNKNOWN_DISTRICT);
    }

    #[test]
    fn test_state_and_risk_placeholders() {
        let empty = props(None, None, None, None);
        let popup = build_popup(&empty);
        assert_eq!(popup.state, UNKNOWN_STATE);
        assert_eq!(popup.risk_level, RISK_NOT_AVAILABLE.to_uppercase());
        assert_eq!(popup.category, RiskCategory::Unknown);
    }

    #[test]
    fn test_optional_block_absent_when_no_metrics() {
        let popup = build_popup(&props(Some("Patna"), None, Some("Bihar"), Some("High")));
        assert!(!popup.has_details());
        assert!(popup.details.is_empty());
    }

    #[test]
    fn test_optional_block_lists_present_metrics_only() {
        let mut p = props(Some("Jaipur"), None, Some("Rajasthan"), Some("Low"));
        p.elevation = Some("431".to_string());
        p.population = Some("3046163".to_string());

        let popup = build_popup(&p);
        assert!(popup.has_details());
        let labels: Vec<_> = popup.details.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, ["Elevation", "Population"]);
        assert_eq!(popup.details[0].1, "431 m");
    }

    #[test]
    fn test_risk_level_upper_cased_and_classified() {
        let popup = build_popup(&props(None, None, None, Some("Medium Risk")));
        assert_eq!(popup.risk_level, "MEDIUM RISK");
        assert_eq!(popup.category, RiskCategory::Medium);
    }
}
