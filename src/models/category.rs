//! Category model.

use serde::{Deserialize, Serialize};

/// A listing category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub slug: String,
}

/// Derive a URL slug from a category name: lowercase, spaces to hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Tech News"), "tech-news");
        assert_eq!(slugify("Sports"), "sports");
        assert_eq!(slugify("Mobile App Links"), "mobile-app-links");
    }
}
