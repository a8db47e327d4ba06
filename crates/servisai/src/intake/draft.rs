use serde::{Deserialize, Serialize};

use super::catalog::CategoryId;

/// In-progress lead as the visitor composes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadDraft {
    pub category: CategoryId,
    pub description: String,
    pub zip_code: String,
}

/// Exact row shape handed to the lead gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPayload {
    pub category: CategoryId,
    pub description: String,
    pub zip_code: String,
}

/// Partial edit applied field by field; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DraftUpdate {
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LeadDraftStore {
    default_category: CategoryId,
    draft: LeadDraft,
}

impl LeadDraftStore {
    pub fn new(default_category: CategoryId) -> Self {
        let draft = LeadDraft {
            category: default_category.clone(),
            description: String::new(),
            zip_code: String::new(),
        };
        Self {
            default_category,
            draft,
        }
    }

    pub fn draft(&self) -> &LeadDraft {
        &self.draft
    }

    /// Any category is accepted here, including inactive ones.
    pub fn set_category(&mut self, category: CategoryId) {
        self.draft.category = category;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_zip_code(&mut self, zip_code: impl Into<String>) {
        self.draft.zip_code = zip_code.into();
    }

    pub fn apply(&mut self, update: DraftUpdate) {
        let DraftUpdate {
            category,
            description,
            zip_code,
        } = update;

        if let Some(category) = category {
            self.set_category(category);
        }
        if let Some(description) = description {
            self.set_description(description);
        }
        if let Some(zip_code) = zip_code {
            self.set_zip_code(zip_code);
        }
    }

    /// Both free-text fields must be non-empty. Whitespace counts as content.
    pub fn is_valid(&self) -> bool {
        !self.draft.description.is_empty() && !self.draft.zip_code.is_empty()
    }

    pub fn reset(&mut self) {
        self.draft = LeadDraft {
            category: self.default_category.clone(),
            description: String::new(),
            zip_code: String::new(),
        };
    }

    pub fn payload(&self) -> LeadPayload {
        LeadPayload {
            category: self.draft.category.clone(),
            description: self.draft.description.clone(),
            zip_code: self.draft.zip_code.clone(),
        }
    }
}
