//! Section storage for workbook plans.
//!
//! Each plan stores one JSON document per workbook section. The income
//! planning section is stored with its derived metrics, which are recomputed
//! on every load.

mod file_store;
mod memory_store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{IncomePlanner, IncomePlanningSection};
use crate::error::{WorkbookError, WorkbookResult};

pub use file_store::FileSectionStore;
pub use memory_store::MemorySectionStore;

const MAX_PLAN_ID_LEN: usize = 64;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKey {
    Reflection,
    Swot,
    IncomePlanning,
    Mindset,
    Accountability,
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        SectionKey::Reflection,
        SectionKey::Swot,
        SectionKey::IncomePlanning,
        SectionKey::Mindset,
        SectionKey::Accountability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Reflection => "reflection",
            SectionKey::Swot => "swot",
            SectionKey::IncomePlanning => "income-planning",
            SectionKey::Mindset => "mindset",
            SectionKey::Accountability => "accountability",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = WorkbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| WorkbookError::UnknownSection(s.to_string()))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PlanId(String);

impl PlanId {
    pub fn parse(raw: &str) -> WorkbookResult<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_PLAN_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(WorkbookError::InvalidPlanId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait SectionStore: Send + Sync {
    /// Returns `None` when the section has never been saved for this plan.
    fn load(&self, plan: &PlanId, section: SectionKey) -> WorkbookResult<Option<Value>>;

    fn save(&self, plan: &PlanId, section: SectionKey, document: &Value) -> WorkbookResult<()>;
}

/// Loads the income-planning section, falling back to a blank workbook.
pub fn load_income_planning(
    store: &dyn SectionStore,
    plan: &PlanId,
) -> WorkbookResult<IncomePlanner> {
    match store.load(plan, SectionKey::IncomePlanning)? {
        Some(document) => income_planner_from_stored(plan, document),
        None => Ok(IncomePlanner::default()),
    }
}

/// Rebuilds a planner from a stored income-planning document. A stored
/// document that no longer has the section's shape is a storage fault.
pub fn income_planner_from_stored(
    plan: &PlanId,
    document: Value,
) -> WorkbookResult<IncomePlanner> {
    let section: IncomePlanningSection = serde_json::from_value(document).map_err(|e| {
        WorkbookError::Storage(format!(
            "Corrupt {} section for plan {}: {}",
            SectionKey::IncomePlanning,
            plan,
            e
        ))
    })?;
    Ok(IncomePlanner::from_section(section))
}

pub fn save_income_planning(
    store: &dyn SectionStore,
    plan: &PlanId,
    planner: &IncomePlanner,
) -> WorkbookResult<()> {
    let document = serde_json::to_value(planner.to_section())?;
    store.save(plan, SectionKey::IncomePlanning, &document)
}
