use serde::{Deserialize, Serialize};

use super::catalog::{BUSINESS_EXPENSE_CATEGORIES, GOAL_SLOTS, PERSONAL_EXPENSE_CATEGORIES};

/// One named amount in a workbook list. `amount: None` means the user has
/// not answered yet, which is different from an entered zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub amount: Option<f64>,
}

impl LineItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
        }
    }

    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
        }
    }
}

pub type ExpenseLineItem = LineItem;
pub type GoalLineItem = LineItem;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalCategory {
    Family,
    Financial,
    Personal,
    Business,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 4] = [
        GoalCategory::Family,
        GoalCategory::Financial,
        GoalCategory::Personal,
        GoalCategory::Business,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestGoals {
    pub family: Vec<GoalLineItem>,
    pub financial: Vec<GoalLineItem>,
    pub personal: Vec<GoalLineItem>,
    pub business: Vec<GoalLineItem>,
}

impl Default for ManifestGoals {
    fn default() -> Self {
        let blank = || vec![GoalLineItem::default(); GOAL_SLOTS];
        Self {
            family: blank(),
            financial: blank(),
            personal: blank(),
            business: blank(),
        }
    }
}

impl ManifestGoals {
    pub fn category(&self, category: GoalCategory) -> &[GoalLineItem] {
        match category {
            GoalCategory::Family => &self.family,
            GoalCategory::Financial => &self.financial,
            GoalCategory::Personal => &self.personal,
            GoalCategory::Business => &self.business,
        }
    }

    pub fn category_mut(&mut self, category: GoalCategory) -> &mut Vec<GoalLineItem> {
        match category {
            GoalCategory::Family => &mut self.family,
            GoalCategory::Financial => &mut self.financial,
            GoalCategory::Personal => &mut self.personal,
            GoalCategory::Business => &mut self.business,
        }
    }

    /// Every goal slot, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &GoalLineItem> {
        GoalCategory::ALL
            .into_iter()
            .flat_map(move |category| self.category(category).iter())
    }
}

/// Raw inputs of the income-planning section. Numeric fields stay `None`
/// until answered; calculation defaults are applied inside the engine only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomePlanningInputs {
    pub personal_expenses: Vec<ExpenseLineItem>,
    pub business_expenses: Vec<ExpenseLineItem>,
    pub manifest_goals: ManifestGoals,
    /// Percentage points, 25 means 25%.
    pub estimated_tax_rate: Option<f64>,
    /// Percentage the broker keeps.
    pub broker_split_percentage: Option<f64>,
    /// Flat broker cap. Zero or `None` means uncapped.
    pub broker_cap_amount: Option<f64>,
    pub average_sales_price: Option<f64>,
    /// Decimal fraction, 0.025 means 2.5%.
    pub average_commission_rate: Option<f64>,
    pub work_days_per_week: Option<f64>,
    pub weeks_off: Option<f64>,
    pub financial_reflection: String,
    pub income_why: String,
}

impl Default for IncomePlanningInputs {
    fn default() -> Self {
        Self {
            personal_expenses: PERSONAL_EXPENSE_CATEGORIES
                .iter()
                .map(|name| ExpenseLineItem::named(*name))
                .collect(),
            business_expenses: BUSINESS_EXPENSE_CATEGORIES
                .iter()
                .map(|name| ExpenseLineItem::named(*name))
                .collect(),
            manifest_goals: ManifestGoals::default(),
            estimated_tax_rate: None,
            broker_split_percentage: None,
            broker_cap_amount: None,
            average_sales_price: None,
            average_commission_rate: None,
            work_days_per_week: None,
            weeks_off: None,
            financial_reflection: String::new(),
            income_why: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub monthly_personal_total: f64,
    pub monthly_business_total: f64,
    pub combined_monthly_total: f64,
    pub annual_expenses: f64,
    pub manifest_goals_total: f64,
    pub target_take_home_income: f64,
    pub annual_taxable_income_needed: f64,
    pub gci_needed: f64,
    pub adjusted_gci_needed: f64,
    pub final_gci: f64,
    pub average_commission_per_transaction: f64,
    pub total_transactions_needed: f64,
    pub appointments_needed: f64,
    pub conversations_needed: f64,
    pub reach_outs_needed: f64,
    pub working_days: f64,
    pub daily_reach_outs: f64,
    pub daily_conversations: f64,
    pub daily_appointments: f64,
}

impl DerivedMetrics {
    /// Field name and value pairs, in pipeline order.
    pub fn fields(&self) -> [(&'static str, f64); 19] {
        [
            ("monthlyPersonalTotal", self.monthly_personal_total),
            ("monthlyBusinessTotal", self.monthly_business_total),
            ("combinedMonthlyTotal", self.combined_monthly_total),
            ("annualExpenses", self.annual_expenses),
            ("manifestGoalsTotal", self.manifest_goals_total),
            ("targetTakeHomeIncome", self.target_take_home_income),
            ("annualTaxableIncomeNeeded", self.annual_taxable_income_needed),
            ("gciNeeded", self.gci_needed),
            ("adjustedGciNeeded", self.adjusted_gci_needed),
            ("finalGci", self.final_gci),
            (
                "averageCommissionPerTransaction",
                self.average_commission_per_transaction,
            ),
            ("totalTransactionsNeeded", self.total_transactions_needed),
            ("appointmentsNeeded", self.appointments_needed),
            ("conversationsNeeded", self.conversations_needed),
            ("reachOutsNeeded", self.reach_outs_needed),
            ("workingDays", self.working_days),
            ("dailyReachOuts", self.daily_reach_outs),
            ("dailyConversations", self.daily_conversations),
            ("dailyAppointments", self.daily_appointments),
        ]
    }
}

/// Stored shape of the income-planning section. Metrics are kept for
/// display only and are recomputed whenever the section is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomePlanningSection {
    #[serde(default)]
    pub inputs: IncomePlanningInputs,
    #[serde(default)]
    pub metrics: DerivedMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub filled: usize,
    pub total: usize,
    pub percent_complete: f64,
}

/// Inputs, metrics and completion of one income-planning snapshot, as
/// returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomePlanningReport {
    pub inputs: IncomePlanningInputs,
    pub metrics: DerivedMetrics,
    pub progress: Progress,
}
