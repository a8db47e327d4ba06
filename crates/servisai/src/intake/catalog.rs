use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a service category (e.g. `electronics`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub active: bool,
}

impl Category {
    fn new(id: &str, name: &str, active: bool) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.to_string(),
            active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("category catalog is empty")]
    EmptyCatalog,
    #[error("category '{0}' appears more than once")]
    DuplicateCategory(CategoryId),
    #[error("default category '{0}' is not active")]
    InactiveDefault(CategoryId),
    #[error("activity feed needs at least one record")]
    EmptyActivityFeed,
}

/// Ordered, read-only list of service categories. The first entry is the
/// default for both browsing and new drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let first = categories.first().ok_or(CatalogError::EmptyCatalog)?;
        if !first.active {
            return Err(CatalogError::InactiveDefault(first.id.clone()));
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.id.clone()) {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
        }

        Ok(Self { categories })
    }

    /// Marketplace catalog as listed on the landing page.
    pub fn standard() -> Self {
        Self {
            categories: vec![
                Category::new("electronics", "Elektronika", true),
                Category::new("auto", "Automobiliai", true),
                Category::new("appliances", "Buitinė technika", true),
                Category::new("clothing", "Drabužių taisymas", true),
                Category::new("construction", "Statyba", false),
            ],
        }
    }

    pub fn default_category(&self) -> &Category {
        // `new` and `standard` both guarantee a non-empty list.
        &self.categories[0]
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn is_active(&self, id: &CategoryId) -> bool {
        self.get(id).is_some_and(|category| category.active)
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    /// Categories a visitor can pick on the intake form.
    pub fn active(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| category.active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub user: String,
    pub service: String,
    pub price: u32,
}

/// Non-empty social-proof feed rotated by the activity ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFeed {
    records: Vec<ActivityRecord>,
}

impl ActivityFeed {
    pub fn new(records: Vec<ActivityRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::EmptyActivityFeed);
        }
        Ok(Self { records })
    }

    pub fn standard() -> Self {
        let record = |user: &str, service: &str, price| ActivityRecord {
            user: user.to_string(),
            service: service.to_string(),
            price,
        };
        Self {
            records: vec![
                record("Jonas", "Audi A6 stabdžių taisymas", 120),
                record("Rūta", "iPhone 13 ekrano keitimas", 89),
                record("Mantas", "Skalbimo mašinos remontas", 65),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ActivityRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }
}

/// Simulated competing offer shown beside the intake form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceOffer {
    pub id: u32,
    pub company: String,
    pub rating: f32,
    pub reviews: u32,
    pub price: u32,
    pub response_time: String,
}

impl PriceOffer {
    pub fn mock_offers() -> Vec<Self> {
        let offer = |id, company: &str, rating, reviews, price, response_time: &str| PriceOffer {
            id,
            company: company.to_string(),
            rating,
            reviews,
            price,
            response_time: response_time.to_string(),
        };
        vec![
            offer(1, "TechFix Pro", 4.9, 234, 85, "5 min"),
            offer(2, "QuickRepair LT", 4.7, 189, 95, "12 min"),
            offer(3, "MasterService", 4.8, 312, 79, "8 min"),
        ]
    }
}
