//! Template storage abstraction.
//!
//! The extraction pipeline never touches storage; callers look templates up
//! here and hand them to the pipeline.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::models::template::Template;

/// Keyed template storage.
pub trait TemplateStore: Send + Sync {
    /// Get a template by id.
    fn get(&self, id: &str) -> Option<Template>;

    /// Insert or replace a template. Replacing refreshes `updated_at`.
    fn put(&self, template: Template);

    /// Remove a template. Returns whether it existed.
    fn delete(&self, id: &str) -> bool;

    /// All templates, ordered by id.
    fn list(&self) -> Vec<Template>;
}

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<String, Template>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `templates`.
    pub fn with_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let store = Self::new();
        for template in templates {
            store.put(template);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn get(&self, id: &str) -> Option<Template> {
        let templates = self.templates.read().ok()?;
        templates.get(id).cloned()
    }

    fn put(&self, mut template: Template) {
        let Ok(mut templates) = self.templates.write() else {
            return;
        };
        if templates.contains_key(&template.id) {
            template.updated_at = Utc::now();
        }
        templates.insert(template.id.clone(), template);
    }

    fn delete(&self, id: &str) -> bool {
        self.templates
            .write()
            .map(|mut t| t.remove(id).is_some())
            .unwrap_or(false)
    }

    fn list(&self) -> Vec<Template> {
        let Ok(templates) = self.templates.read() else {
            return Vec::new();
        };
        let mut list: Vec<Template> = templates.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_put_get_delete() {
        let store = MemoryTemplateStore::new();
        store.put(Template::new("b", "Contract"));
        store.put(Template::new("a", "Invoice"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().name, "Invoice");
        let ids: Vec<String> = store.list().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["a", "b"]);

        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_replace_refreshes_updated_at() {
        let mut template = Template::new("t", "Invoice");
        let earlier = Utc::now() - Duration::hours(1);
        template.created_at = earlier;
        template.updated_at = earlier;

        let store = MemoryTemplateStore::with_templates([template.clone()]);
        assert_eq!(store.get("t").unwrap().updated_at, earlier);

        store.put(template);
        let stored = store.get("t").unwrap();
        assert!(stored.updated_at > earlier);
        assert_eq!(stored.created_at, earlier);
    }
}
