//! Listing model and mutation request shapes.

use serde::{Deserialize, Serialize};

/// A single shared link entry with metadata and an attributed author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub image: String,
    /// Referenced category id. Not validated against existing categories.
    #[serde(default)]
    pub category: String,
    /// Author profile id.
    pub author: String,
    /// Author display name, snapshotted at creation time.
    pub author_name: String,
    /// Creation time in unix milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub views: i64,
}

/// Fields a caller supplies when creating a listing. Author, timestamp and
/// view counter are stamped by the data layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

/// Partial update for an existing listing. Absent fields are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ListingPatch {
    /// Build the JSON object of just the fields being changed.
    pub fn to_fields(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        if let Some(title) = &self.title {
            fields.insert("title".to_string(), title.clone().into());
        }
        if let Some(description) = &self.description {
            fields.insert("description".to_string(), description.clone().into());
        }
        if let Some(url) = &self.url {
            fields.insert("url".to_string(), url.clone().into());
        }
        if let Some(image) = &self.image {
            fields.insert("image".to_string(), image.clone().into());
        }
        if let Some(category) = &self.category {
            fields.insert("category".to_string(), category.clone().into());
        }
        serde_json::Value::Object(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.image.is_none()
            && self.category.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_includes_set_fields() {
        let patch = ListingPatch {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let fields = patch.to_fields();
        let obj = fields.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["title"], "New title");
    }

    #[test]
    fn test_empty_patch() {
        assert!(ListingPatch::default().is_empty());
    }

    #[test]
    fn test_listing_wire_form() {
        let listing = Listing {
            id: "p1".to_string(),
            title: "WhatsApp Web".to_string(),
            description: String::new(),
            url: "https://web.whatsapp.com".to_string(),
            image: String::new(),
            category: "c1".to_string(),
            author: "u1".to_string(),
            author_name: "Sys".to_string(),
            created_at: 1700000000000,
            views: 0,
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["authorName"], "Sys");
        assert_eq!(json["createdAt"], 1700000000000i64);
    }
}
