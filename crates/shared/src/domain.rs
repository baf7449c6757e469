use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(ProductId);
id_newtype!(CategoryId);

/// A catalog entry as handed out by a product source. The session only stores
/// and forwards these; it never builds or edits one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    /// May point at a category the session has not loaded.
    pub category_id: CategoryId,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl Product {
    /// Case-insensitive substring match against name or description.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop() -> Product {
        Product {
            id: "1".into(),
            name: "Laptop".to_string(),
            description: "High-performance laptop".to_string(),
            price: 999.99,
            image_url: "https://placehold.co/600x400".to_string(),
            category_id: "electronics".into(),
            rating: 4.5,
            review_count: 120,
        }
    }

    #[test]
    fn query_matches_name_or_description_ignoring_case() {
        let product = laptop();
        assert!(product.matches_query("lap"));
        assert!(product.matches_query("PERFORMANCE"));
        assert!(!product.matches_query("phone"));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&CategoryId::new("home")).expect("json");
        assert_eq!(json, "\"home\"");
    }

    #[test]
    fn category_without_parent_omits_the_field() {
        let category = Category {
            id: "clothing".into(),
            name: "Clothing".to_string(),
            parent_id: None,
        };
        let value = serde_json::to_value(&category).expect("json");
        assert!(value.get("parent_id").is_none());
    }
}
