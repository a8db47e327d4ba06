use super::catalog::{CategoryCatalog, CategoryId};

/// Category highlighted while the visitor browses the catalog.
///
/// Only active categories can be highlighted. Selecting an inactive or
/// unknown category leaves the current highlight in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelector {
    current: CategoryId,
}

impl CategorySelector {
    pub fn new(catalog: &CategoryCatalog) -> Self {
        Self {
            current: catalog.default_category().id.clone(),
        }
    }

    pub fn current(&self) -> &CategoryId {
        &self.current
    }

    /// Returns `false` when the request was ignored.
    pub fn select(&mut self, catalog: &CategoryCatalog, id: &CategoryId) -> bool {
        if !catalog.is_active(id) {
            return false;
        }
        self.current = id.clone();
        true
    }
}
