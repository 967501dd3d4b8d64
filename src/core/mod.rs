mod catalog;
mod engine;
mod planner;
mod progress;
mod types;

pub use catalog::{BUSINESS_EXPENSE_CATEGORIES, GOAL_SLOTS, PERSONAL_EXPENSE_CATEGORIES};
pub use engine::{
    APPOINTMENTS_PER_TRANSACTION, CONVERSATIONS_PER_APPOINTMENT, REACHOUTS_PER_CONVERSATION, derive,
};
pub use planner::{IncomePlanner, InputUpdate};
pub use progress::{income_planning_progress, json_progress};
pub use types::{
    DerivedMetrics, ExpenseLineItem, GoalCategory, GoalLineItem, IncomePlanningInputs,
    IncomePlanningReport, IncomePlanningSection, LineItem, ManifestGoals, Progress,
};
