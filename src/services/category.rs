//! Category registry
//!
//! Owns the category set and answers natural-key lookups. The natural key is
//! `(name, type)`, with the name normalized by the configured
//! [`NameMatchPolicy`]. Categories are never updated or removed.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::NameMatchPolicy;
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{seed_categories, Category, CategoryId, CategoryType};

/// In-memory category set with id and natural-key indexes
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    policy: NameMatchPolicy,
    categories: Vec<Category>,
    by_id: HashMap<CategoryId, usize>,
    by_key: HashMap<(String, CategoryType), usize>,
}

impl CategoryRegistry {
    /// Create an empty registry
    pub fn new(policy: NameMatchPolicy) -> Self {
        Self {
            policy,
            categories: Vec::new(),
            by_id: HashMap::new(),
            by_key: HashMap::new(),
        }
    }

    /// Build a registry from stored categories, in storage order
    ///
    /// When two stored categories share an id or a normalized key the first
    /// one wins the index slot; the later one is kept but unreachable by key.
    pub fn load(categories: Vec<Category>, policy: NameMatchPolicy) -> Self {
        let mut registry = Self::new(policy);
        for category in categories {
            if registry.by_id.contains_key(&category.id) {
                warn!(id = %category.id, "dropping category with duplicate id");
                continue;
            }
            let idx = registry.categories.len();
            registry.by_id.insert(category.id, idx);
            let key = registry.key(&category.name, category.kind);
            if registry.by_key.contains_key(&key) {
                warn!(name = %category.name, kind = %category.kind, "category key shadowed by an earlier entry");
            } else {
                registry.by_key.insert(key, idx);
            }
            registry.categories.push(category);
        }
        registry
    }

    /// Load stored categories, falling back to the seed set when there are none
    pub fn load_or_seed(categories: Vec<Category>, policy: NameMatchPolicy) -> Self {
        if categories.is_empty() {
            debug!("no stored categories, using seed set");
            Self::load(seed_categories(), policy)
        } else {
            Self::load(categories, policy)
        }
    }

    pub fn policy(&self) -> NameMatchPolicy {
        self.policy
    }

    fn key(&self, name: &str, kind: CategoryType) -> (String, CategoryType) {
        (self.policy.normalize(name), kind)
    }

    /// Find a category by its natural key
    pub fn find_by_key(&self, name: &str, kind: CategoryType) -> Option<&Category> {
        self.by_key
            .get(&self.key(name, kind))
            .map(|&idx| &self.categories[idx])
    }

    /// Get a category by id
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.by_id.get(&id).map(|&idx| &self.categories[idx])
    }

    /// Find a category by name or id string, trying the name as expense first
    pub fn find(&self, identifier: &str) -> Option<&Category> {
        if let Some(category) = self
            .find_by_key(identifier, CategoryType::Expense)
            .or_else(|| self.find_by_key(identifier, CategoryType::Income))
        {
            return Some(category);
        }
        identifier
            .parse::<CategoryId>()
            .ok()
            .and_then(|id| self.get(id))
    }

    /// Add a category, keeping its id and sort order
    ///
    /// # Errors
    ///
    /// Fails when the category does not validate or when its id or natural
    /// key is already taken.
    pub fn add(&mut self, category: Category) -> PocketbookResult<Category> {
        category.validate()?;

        let key = self.key(&category.name, category.kind);
        if self.by_key.contains_key(&key) {
            return Err(PocketbookError::Duplicate {
                entity_type: "Category",
                identifier: format!("{} ({})", category.name, category.kind),
            });
        }
        if self.by_id.contains_key(&category.id) {
            return Err(PocketbookError::Duplicate {
                entity_type: "Category",
                identifier: category.id.to_string(),
            });
        }

        let idx = self.categories.len();
        self.by_id.insert(category.id, idx);
        self.by_key.insert(key, idx);
        self.categories.push(category.clone());
        debug!(name = %category.name, kind = %category.kind, "added category");
        Ok(category)
    }

    /// Create a category at the end of its type's sort order
    pub fn create(&mut self, name: &str, kind: CategoryType) -> PocketbookResult<Category> {
        let next = self
            .categories
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.sort_order)
            .max()
            .map_or(0, |max| max + 1);
        self.add(Category::with_sort_order(name, kind, next))
    }

    /// Return the category with this key, creating it if absent
    ///
    /// The flag is true when the category was created.
    pub fn find_or_create(
        &mut self,
        name: &str,
        kind: CategoryType,
    ) -> PocketbookResult<(Category, bool)> {
        if let Some(existing) = self.find_by_key(name, kind) {
            return Ok((existing.clone(), false));
        }
        self.create(name, kind).map(|c| (c, true))
    }

    /// All categories in display order: expense before income, then sort order, then name
    pub fn all(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by(|a, b| {
            (a.kind == CategoryType::Income)
                .cmp(&(b.kind == CategoryType::Income))
                .then(a.sort_order.cmp(&b.sort_order))
                .then_with(|| a.name.cmp(&b.name))
        });
        categories
    }

    /// All categories in storage order
    pub fn as_slice(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
