use courier_core::Template;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::IntegrationError;

/// In-process template store keyed by template name.
///
/// Backs the integrations that have no remote template store of their own.
/// Individual operations are atomic per name; sequences of operations on the
/// same name are not, so callers serialize their own create/delete races.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: DashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `template` unless one of that name exists and `update_if_exists`
    /// is unset.
    ///
    /// Returns `true` if the template was written.
    pub fn create(&self, template: &Template, update_if_exists: bool) -> bool {
        match self.templates.entry(template.name().to_owned()) {
            Entry::Occupied(mut entry) => {
                if update_if_exists {
                    entry.insert(template.clone());
                }
                update_if_exists
            }
            Entry::Vacant(entry) => {
                entry.insert(template.clone());
                true
            }
        }
    }

    /// Replace an existing template.
    pub fn update(&self, template: &Template) -> Result<(), IntegrationError> {
        let mut existing = self
            .templates
            .get_mut(template.name())
            .ok_or_else(|| IntegrationError::TemplateNotFound(template.name().to_owned()))?;
        *existing = template.clone();
        Ok(())
    }

    /// Remove a template, returning it.
    pub fn delete(&self, name: &str) -> Result<Template, IntegrationError> {
        self.templates
            .remove(name)
            .map(|(_, template)| template)
            .ok_or_else(|| IntegrationError::TemplateNotFound(name.to_owned()))
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<Template> {
        self.templates.get(name).map(|entry| entry.value().clone())
    }

    /// Look up a template by name, failing with `TemplateNotFound`.
    pub fn require(&self, name: &str) -> Result<Template, IntegrationError> {
        self.get(name)
            .ok_or_else(|| IntegrationError::TemplateNotFound(name.to_owned()))
    }

    /// Remove every template.
    pub fn clear(&self) {
        self.templates.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
