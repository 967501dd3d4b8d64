use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::{PlanId, SectionKey, SectionStore};
use crate::error::{WorkbookError, WorkbookResult};

/// Keeps sections in memory; everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySectionStore {
    sections: RwLock<HashMap<(PlanId, SectionKey), Value>>,
}

impl MemorySectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> WorkbookError {
    WorkbookError::Storage("section map lock poisoned".to_string())
}

impl SectionStore for MemorySectionStore {
    fn load(&self, plan: &PlanId, section: SectionKey) -> WorkbookResult<Option<Value>> {
        let sections = self.sections.read().map_err(|_| poisoned())?;
        Ok(sections.get(&(plan.clone(), section)).cloned())
    }

    fn save(&self, plan: &PlanId, section: SectionKey, document: &Value) -> WorkbookResult<()> {
        let mut sections = self.sections.write().map_err(|_| poisoned())?;
        sections.insert((plan.clone(), section), document.clone());
        Ok(())
    }
}
