//! Grocery-aisle categories used to cluster items for display.
//!
//! Items keep their category as free text in the store. `Category` is the
//! display-side view of that text: known labels map to their variant and
//! anything else falls back to `Category::Autres`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[serde(rename = "Fruits et légumes")]
    FruitsEtLegumes,
    #[serde(rename = "Boucherie/Charcuterie")]
    BoucherieCharcuterie,
    #[serde(rename = "Poissonnerie")]
    Poissonnerie,
    #[serde(rename = "Produits laitiers")]
    ProduitsLaitiers,
    #[serde(rename = "Épicerie salée")]
    EpicerieSalee,
    #[serde(rename = "Épicerie sucrée")]
    EpicerieSucree,
    #[serde(rename = "Surgelés")]
    Surgeles,
    #[serde(rename = "Boissons")]
    Boissons,
    #[serde(rename = "Hygiène/Beauté")]
    HygieneBeaute,
    #[serde(rename = "Entretien")]
    Entretien,
    #[serde(rename = "Boulangerie")]
    Boulangerie,
    #[default]
    #[serde(rename = "Autres")]
    Autres,
}

/// Badge styling for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    /// Color family name (e.g. "green")
    pub tone: &'static str,
    /// Utility classes for the badge background and text
    pub badge_class: &'static str,
}

impl Category {
    /// All categories, in the order they are offered to the user.
    pub const ALL: [Category; 12] = [
        Category::FruitsEtLegumes,
        Category::BoucherieCharcuterie,
        Category::Poissonnerie,
        Category::ProduitsLaitiers,
        Category::EpicerieSalee,
        Category::EpicerieSucree,
        Category::Surgeles,
        Category::Boissons,
        Category::HygieneBeaute,
        Category::Entretien,
        Category::Boulangerie,
        Category::Autres,
    ];

    /// The label stored in the `category` column.
    pub fn label(&self) -> &'static str {
        match self {
            Category::FruitsEtLegumes => "Fruits et légumes",
            Category::BoucherieCharcuterie => "Boucherie/Charcuterie",
            Category::Poissonnerie => "Poissonnerie",
            Category::ProduitsLaitiers => "Produits laitiers",
            Category::EpicerieSalee => "Épicerie salée",
            Category::EpicerieSucree => "Épicerie sucrée",
            Category::Surgeles => "Surgelés",
            Category::Boissons => "Boissons",
            Category::HygieneBeaute => "Hygiène/Beauté",
            Category::Entretien => "Entretien",
            Category::Boulangerie => "Boulangerie",
            Category::Autres => "Autres",
        }
    }

    pub fn style(&self) -> CategoryStyle {
        let (tone, badge_class) = match self {
            Category::FruitsEtLegumes => ("green", "bg-green-100 text-green-800"),
            Category::BoucherieCharcuterie => ("red", "bg-red-100 text-red-800"),
            Category::Poissonnerie => ("blue", "bg-blue-100 text-blue-800"),
            Category::ProduitsLaitiers => ("yellow", "bg-yellow-100 text-yellow-800"),
            Category::EpicerieSalee => ("orange", "bg-orange-100 text-orange-800"),
            Category::EpicerieSucree => ("pink", "bg-pink-100 text-pink-800"),
            Category::Surgeles => ("cyan", "bg-cyan-100 text-cyan-800"),
            Category::Boissons => ("purple", "bg-purple-100 text-purple-800"),
            Category::HygieneBeaute => ("indigo", "bg-indigo-100 text-indigo-800"),
            Category::Entretien => ("gray", "bg-gray-100 text-gray-800"),
            Category::Boulangerie => ("amber", "bg-amber-100 text-amber-800"),
            Category::Autres => ("slate", "bg-slate-100 text-slate-800"),
        };
        CategoryStyle { tone, badge_class }
    }

    /// Maps a stored label to its category, falling back to `Autres`.
    pub fn for_display(label: &str) -> Category {
        label.parse().unwrap_or(Category::Autres)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Exact label match, or a case-insensitive match on the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .find(|c| c.label() == wanted)
            .or_else(|| {
                let lower = wanted.to_lowercase();
                Category::ALL
                    .iter()
                    .find(|c| c.label().to_lowercase() == lower)
            })
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
                format!(
                    "Invalid category '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip_for_every_category() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            Category::from_str("fruits et légumes").unwrap(),
            Category::FruitsEtLegumes
        );
        assert_eq!(Category::from_str("BOISSONS").unwrap(), Category::Boissons);
    }

    #[test]
    fn test_from_str_invalid() {
        let err = Category::from_str("Jardinage").unwrap_err();
        assert!(err.contains("Invalid category 'Jardinage'"));
    }

    #[test]
    fn test_unknown_label_falls_back_to_autres_for_display() {
        assert_eq!(Category::for_display("Jardinage"), Category::Autres);
        assert_eq!(
            Category::for_display("Jardinage").style(),
            Category::Autres.style()
        );
        assert_eq!(Category::for_display("Surgelés"), Category::Surgeles);
    }

    #[test]
    fn test_styles_are_distinct() {
        let mut tones: Vec<&str> = Category::ALL.iter().map(|c| c.style().tone).collect();
        tones.sort();
        tones.dedup();
        assert_eq!(tones.len(), 12);
    }

    #[test]
    fn test_default_is_autres() {
        assert_eq!(Category::default(), Category::Autres);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Category::EpicerieSalee).unwrap();
        assert_eq!(json, "\"Épicerie salée\"");
        let parsed: Category = serde_json::from_str("\"Hygiène/Beauté\"").unwrap();
        assert_eq!(parsed, Category::HygieneBeaute);
    }
}
