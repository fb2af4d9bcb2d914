use ratatui::style::Color;

/// Derived risk classification for one district.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskCategory {
    High,
    Medium,
    Low,
    Unknown,
}

/// Ordered classification rules, evaluated top to bottom with first match
/// winning. "high" is tested before "medium", so a level naming both
/// classifies as High.
pub const CLASSIFY_RULES: [(&str, RiskCategory); 3] = [
    ("high", RiskCategory::High),
    ("medium", RiskCategory::Medium),
    ("low", RiskCategory::Low),
];

/// Classify a free-text risk level by case-insensitive substring match
/// against `CLASSIFY_RULES`. Anything that matches no rule is Unknown.
pub fn classify(risk_level: &str) -> RiskCategory {
    let level = risk_level.to_lowercase();
    for (needle, category) in CLASSIFY_RULES {
        if level.contains(needle) {
            return category;
        }
    }
    RiskCategory::Unknown
}

impl RiskCategory {
    /// Choropleth fill color for this category.
    pub fn fill_color(self) -> Color {
        match self {
            RiskCategory::High => Color::Rgb(0xef, 0x44, 0x44),
            RiskCategory::Medium => Color::Rgb(0xf5, 0x9e, 0x0b),
            RiskCategory::Low => Color::Rgb(0x10, 0xb9, 0x81),
            RiskCategory::Unknown => Color::Rgb(0x64, 0x74, 0x8b),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::High => "High Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::Low => "Low Risk",
            RiskCategory::Unknown => "Unknown",
        }
    }
}

/// Feature counts per known risk category. Levels matching no
/// classification rule are not tallied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RiskTally {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskTally {
    /// Recompute the full tally from scratch over a pass of risk levels.
    pub fn from_levels<'a>(levels: impl Iterator<Item = &'a str>) -> Self {
        let mut tally = Self::default();
        for level in levels {
            match classify(level) {
                RiskCategory::High => tally.high += 1,
                RiskCategory::Medium => tally.medium += 1,
                RiskCategory::Low => tally.low += 1,
                RiskCategory::Unknown => {}
            }
        }
        tally
    }

    /// Number of features whose level matched a classification rule.
    pub fn known_total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_case_and_substring() {
        assert_eq!(classify("High"), RiskCategory::High);
        assert_eq!(classify("VERY HIGH"), RiskCategory::High);
        assert_eq!(classify("Medium Risk"), RiskCategory::Medium);
        assert_eq!(classify("medium-low boundary"), RiskCategory::Medium);
        assert_eq!(classify("Low"), RiskCategory::Low);
        assert_eq!(classify("lowland"), RiskCategory::Low);
    }

    #[test]
    fn test_classify_rule_order_wins() {
        // Both substrings present: "high" is tested first.
        assert_eq!(classify("medium to high"), RiskCategory::High);
        assert_eq!(classify("High/Medium"), RiskCategory::High);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify(""), RiskCategory::Unknown);
        assert_eq!(classify("severe"), RiskCategory::Unknown);
        assert_eq!(classify("n/a"), RiskCategory::Unknown);
    }

    #[test]
    fn test_fill_colors_follow_category() {
        assert_eq!(RiskCategory::High.fill_color(), Color::Rgb(0xef, 0x44, 0x44));
        assert_eq!(RiskCategory::Medium.fill_color(), Color::Rgb(0xf5, 0x9e, 0x0b));
        assert_eq!(RiskCategory::Low.fill_color(), Color::Rgb(0x10, 0xb9, 0x81));
        assert_eq!(RiskCategory::Unknown.fill_color(), Color::Rgb(0x64, 0x74, 0x8b));
    }

    #[test]
    fn test_tally_counts_known_levels_only() {
        let levels = ["High", "medium", "Low", "severe", "", "HIGH RISK"];
        let tally = RiskTally::from_levels(levels.into_iter());
        assert_eq!(tally.high, 2);
        assert_eq!(tally.medium, 1);
        assert_eq!(tally.low, 1);

        let matched = levels
            .iter()
            .filter(|l| classify(l) != RiskCategory::Unknown)
            .count();
        assert_eq!(tally.known_total(), matched);
    }
}
