//! # Portfolio Data Model
//!
//! Strongly-typed records produced by the validation layer. A value of these
//! types only exists once every field constraint has been checked, so code
//! holding a `PortfolioItem` never has to re-validate it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// # Portfolio Item
///
/// A single validated project record, serialized with the camelCase field
/// names used on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    /// Identifier, coerced to a string (numeric ids become their decimal form).
    pub id: String,
    /// Project title, trimmed and non-empty.
    pub title: String,
    /// Absolute URL or local path of the cover image.
    pub image_url: String,
    /// Project description, trimmed, at least ten characters.
    pub description: String,
    /// Absolute URL or local path of a demo video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Public deployment URL; may be the empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    /// Absolute URL of the source repository.
    pub github_url: String,
    /// Technologies used, in display order; never empty.
    pub technologies: Vec<String>,
    /// Free-form category; see [`PortfolioCategory`] for the known ones.
    pub category: String,
    /// Whether the project is highlighted.
    #[serde(default)]
    pub featured: bool,
}

impl PortfolioItem {
    /// The category as a known [`PortfolioCategory`], if it is one.
    pub fn known_category(&self) -> Option<PortfolioCategory> {
        self.category.parse().ok()
    }
}

/// # New Portfolio Item
///
/// The creation form of [`PortfolioItem`]: same constraints, but the server
/// assigns `id`, and `featured` and `liveUrl` may be left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioItem {
    /// Identifier, if the client already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Project title, trimmed and non-empty.
    pub title: String,
    /// Absolute URL or local path of the cover image.
    pub image_url: String,
    /// Project description, trimmed, at least ten characters.
    pub description: String,
    /// Absolute URL or local path of a demo video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Public deployment URL; may be the empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    /// Absolute URL of the source repository.
    pub github_url: String,
    /// Technologies used, in display order; never empty.
    pub technologies: Vec<String>,
    /// Free-form category.
    pub category: String,
    /// Whether the project is highlighted, if specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// Categories the gallery knows how to filter on.
pub const PORTFOLIO_CATEGORIES: [&str; 6] = ["frontend", "backend", "mobile", "web", "app", "system"];

/// # Portfolio Category
///
/// The known categories. Validation accepts any non-empty category; this enum
/// only exists for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioCategory {
    /// Browser-side work.
    Frontend,
    /// Services and APIs.
    Backend,
    /// Native or hybrid mobile apps.
    Mobile,
    /// Websites.
    Web,
    /// General applications.
    App,
    /// Systems and infrastructure.
    System,
}

impl PortfolioCategory {
    /// Every known category, in display order.
    pub const ALL: [PortfolioCategory; 6] = [
        PortfolioCategory::Frontend,
        PortfolioCategory::Backend,
        PortfolioCategory::Mobile,
        PortfolioCategory::Web,
        PortfolioCategory::App,
        PortfolioCategory::System,
    ];

    /// The wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortfolioCategory::Frontend => "frontend",
            PortfolioCategory::Backend => "backend",
            PortfolioCategory::Mobile => "mobile",
            PortfolioCategory::Web => "web",
            PortfolioCategory::App => "app",
            PortfolioCategory::System => "system",
        }
    }
}

impl fmt::Display for PortfolioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of [`PORTFOLIO_CATEGORIES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown category {:?} (expected one of: {})",
            self.0,
            PORTFOLIO_CATEGORIES.join(", ")
        )
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for PortfolioCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortfolioCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// `true` when `category` is one of [`PORTFOLIO_CATEGORIES`]. Case-sensitive.
pub fn is_valid_category(category: &str) -> bool {
    PORTFOLIO_CATEGORIES.contains(&category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_round_trip_through_from_str() {
        for (name, category) in PORTFOLIO_CATEGORIES.iter().zip(PortfolioCategory::ALL) {
            assert_eq!(name.parse::<PortfolioCategory>(), Ok(category));
            assert_eq!(category.to_string(), *name);
        }
    }

    #[test]
    fn category_check_is_case_sensitive() {
        assert!(is_valid_category("backend"));
        assert!(!is_valid_category("Backend"));
        assert!(!is_valid_category("design"));
        assert!("design".parse::<PortfolioCategory>().is_err());
    }

    #[test]
    fn serializes_with_wire_names() {
        let item = PortfolioItem {
            id: "7".into(),
            title: "Tracker".into(),
            image_url: "/img/tracker.png".into(),
            description: "Expense tracker app".into(),
            video_url: None,
            live_url: Some(String::new()),
            github_url: "https://github.com/x/tracker".into(),
            technologies: vec!["Rust".into()],
            category: "app".into(),
            featured: false,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["imageUrl"], "/img/tracker.png");
        assert_eq!(json["githubUrl"], "https://github.com/x/tracker");
        assert_eq!(json["liveUrl"], "");
        assert!(json.get("videoUrl").is_none());
        assert_eq!(item.known_category(), Some(PortfolioCategory::App));
    }
}
