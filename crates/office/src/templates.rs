use shared_types::{
    default_deadline_templates, AppError, DeadlineTemplate, DocumentKind, DocumentTemplate,
};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::{load_collection, save_collection, Storage, DEADLINE_TEMPLATES_KEY};

/// Lookup of document and deadline templates.
pub trait TemplateStore: Send + Sync {
    fn find_template(&self, kind: DocumentKind) -> Option<DocumentTemplate>;

    fn find_deadline_template(&self, id: &str) -> Option<DeadlineTemplate>;

    fn deadline_templates(&self) -> Vec<DeadlineTemplate>;
}

/// In-memory catalog. Entries can be added or removed at runtime, which is
/// how a stale selection in the UI ends up pointing at a missing template.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    documents: RwLock<HashMap<DocumentKind, DocumentTemplate>>,
    deadlines: RwLock<Vec<DeadlineTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the statutory deadline periods and the invitation,
    /// fee contract and minutes templates.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        for template in default_deadline_templates() {
            store.upsert_deadline_template(template);
        }
        store.upsert_template(DocumentTemplate {
            kind: DocumentKind::Davet,
            name: DocumentKind::Davet.display_name().to_string(),
            body: "Sayın {{party}}, {{fileNumber}} sayılı arabuluculuk dosyası kapsamında \
                   {{date}} tarihindeki toplantıya davetlisiniz."
                .to_string(),
        });
        store.upsert_template(DocumentTemplate {
            kind: DocumentKind::Ucret,
            name: DocumentKind::Ucret.display_name().to_string(),
            body: "{{fileNumber}} sayılı dosya için arabuluculuk ücret sözleşmesi.".to_string(),
        });
        store.upsert_template(DocumentTemplate {
            kind: DocumentKind::Tutanak,
            name: DocumentKind::Tutanak.display_name().to_string(),
            body: "{{fileNumber}} sayılı dosya son tutanağı.".to_string(),
        });
        store
    }

    /// Defaults overlaid with the deadline templates persisted under
    /// `deadlineTemplates`.
    pub fn load(storage: &dyn Storage) -> Result<Self, AppError> {
        let store = Self::with_defaults();
        let saved: Vec<DeadlineTemplate> = load_collection(storage, DEADLINE_TEMPLATES_KEY)?;
        for template in saved {
            store.upsert_deadline_template(template);
        }
        Ok(store)
    }

    /// Write the deadline catalog back as a whole collection.
    pub fn persist_deadline_templates(&self, storage: &dyn Storage) -> Result<(), AppError> {
        save_collection(storage, DEADLINE_TEMPLATES_KEY, &self.deadline_templates())
    }

    pub fn upsert_template(&self, template: DocumentTemplate) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(template.kind, template);
        }
    }

    pub fn remove_template(&self, kind: DocumentKind) -> Option<DocumentTemplate> {
        self.documents.write().ok()?.remove(&kind)
    }

    pub fn upsert_deadline_template(&self, template: DeadlineTemplate) {
        if let Ok(mut deadlines) = self.deadlines.write() {
            match deadlines.iter_mut().find(|t| t.id == template.id) {
                Some(existing) => *existing = template,
                None => deadlines.push(template),
            }
        }
    }

    pub fn remove_deadline_template(&self, id: &str) -> Option<DeadlineTemplate> {
        let mut deadlines = self.deadlines.write().ok()?;
        let pos = deadlines.iter().position(|t| t.id == id)?;
        Some(deadlines.remove(pos))
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn find_template(&self, kind: DocumentKind) -> Option<DocumentTemplate> {
        self.documents.read().ok()?.get(&kind).cloned()
    }

    fn find_deadline_template(&self, id: &str) -> Option<DeadlineTemplate> {
        self.deadlines
            .read()
            .ok()?
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    fn deadline_templates(&self) -> Vec<DeadlineTemplate> {
        self.deadlines
            .read()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}
