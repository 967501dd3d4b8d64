use serde::{Deserialize, Serialize};

use super::engine::derive;
use super::progress::income_planning_progress;
use super::types::{
    DerivedMetrics, GoalCategory, IncomePlanningInputs, IncomePlanningReport,
    IncomePlanningSection,
};

/// Owns one income-planning input snapshot together with the metrics derived
/// from it. Every setter builds the next snapshot, re-derives in full and
/// swaps both in one assignment, so the two never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomePlanner {
    inputs: IncomePlanningInputs,
    metrics: DerivedMetrics,
}

impl Default for IncomePlanner {
    fn default() -> Self {
        Self::new(IncomePlanningInputs::default())
    }
}

impl IncomePlanner {
    pub fn new(inputs: IncomePlanningInputs) -> Self {
        let metrics = derive(&inputs);
        Self { inputs, metrics }
    }

    /// Rebuilds a planner from a stored section. Stored metrics are ignored.
    pub fn from_section(section: IncomePlanningSection) -> Self {
        Self::new(section.inputs)
    }

    pub fn inputs(&self) -> &IncomePlanningInputs {
        &self.inputs
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn to_section(&self) -> IncomePlanningSection {
        IncomePlanningSection {
            inputs: self.inputs.clone(),
            metrics: self.metrics,
        }
    }

    pub fn report(&self) -> IncomePlanningReport {
        IncomePlanningReport {
            inputs: self.inputs.clone(),
            metrics: self.metrics,
            progress: income_planning_progress(&self.inputs),
        }
    }

    fn update(&mut self, change: impl FnOnce(&mut IncomePlanningInputs)) {
        let mut next = self.inputs.clone();
        change(&mut next);
        let metrics = derive(&next);
        tracing::trace!(final_gci = metrics.final_gci, "income planner recalculated");
        (self.inputs, self.metrics) = (next, metrics);
    }

    pub fn replace_inputs(&mut self, inputs: IncomePlanningInputs) {
        self.update(|current| *current = inputs);
    }

    pub fn set_personal_expense(&mut self, index: usize, amount: Option<f64>) {
        self.update(|inputs| {
            if let Some(item) = inputs.personal_expenses.get_mut(index) {
                item.amount = amount;
            }
        });
    }

    pub fn set_business_expense(&mut self, index: usize, amount: Option<f64>) {
        self.update(|inputs| {
            if let Some(item) = inputs.business_expenses.get_mut(index) {
                item.amount = amount;
            }
        });
    }

    pub fn set_goal_name(&mut self, category: GoalCategory, index: usize, name: String) {
        self.update(|inputs| {
            if let Some(item) = inputs.manifest_goals.category_mut(category).get_mut(index) {
                item.name = name;
            }
        });
    }

    pub fn set_goal_amount(&mut self, category: GoalCategory, index: usize, amount: Option<f64>) {
        self.update(|inputs| {
            if let Some(item) = inputs.manifest_goals.category_mut(category).get_mut(index) {
                item.amount = amount;
            }
        });
    }

    pub fn set_estimated_tax_rate(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.estimated_tax_rate = value);
    }

    pub fn set_broker_split_percentage(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.broker_split_percentage = value);
    }

    pub fn set_broker_cap_amount(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.broker_cap_amount = value);
    }

    pub fn set_average_sales_price(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.average_sales_price = value);
    }

    pub fn set_average_commission_rate(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.average_commission_rate = value);
    }

    pub fn set_work_days_per_week(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.work_days_per_week = value);
    }

    pub fn set_weeks_off(&mut self, value: Option<f64>) {
        self.update(|inputs| inputs.weeks_off = value);
    }

    pub fn set_financial_reflection(&mut self, text: String) {
        self.update(|inputs| inputs.financial_reflection = text);
    }

    pub fn set_income_why(&mut self, text: String) {
        self.update(|inputs| inputs.income_why = text);
    }

    pub fn apply(&mut self, update: InputUpdate) {
        match update {
            InputUpdate::PersonalExpense { index, amount } => {
                self.set_personal_expense(index, amount)
            }
            InputUpdate::BusinessExpense { index, amount } => {
                self.set_business_expense(index, amount)
            }
            InputUpdate::GoalName {
                category,
                index,
                name,
            } => self.set_goal_name(category, index, name),
            InputUpdate::GoalAmount {
                category,
                index,
                amount,
            } => self.set_goal_amount(category, index, amount),
            InputUpdate::EstimatedTaxRate { value } => self.set_estimated_tax_rate(value),
            InputUpdate::BrokerSplitPercentage { value } => self.set_broker_split_percentage(value),
            InputUpdate::BrokerCapAmount { value } => self.set_broker_cap_amount(value),
            InputUpdate::AverageSalesPrice { value } => self.set_average_sales_price(value),
            InputUpdate::AverageCommissionRate { value } => {
                self.set_average_commission_rate(value)
            }
            InputUpdate::WorkDaysPerWeek { value } => self.set_work_days_per_week(value),
            InputUpdate::WeeksOff { value } => self.set_weeks_off(value),
            InputUpdate::FinancialReflection { text } => self.set_financial_reflection(text),
            InputUpdate::IncomeWhy { text } => self.set_income_why(text),
        }
    }
}

/// A single-field edit, as sent by the wizard on every keystroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputUpdate {
    PersonalExpense {
        index: usize,
        amount: Option<f64>,
    },
    BusinessExpense {
        index: usize,
        amount: Option<f64>,
    },
    GoalName {
        category: GoalCategory,
        index: usize,
        name: String,
    },
    GoalAmount {
        category: GoalCategory,
        index: usize,
        amount: Option<f64>,
    },
    EstimatedTaxRate {
        value: Option<f64>,
    },
    BrokerSplitPercentage {
        value: Option<f64>,
    },
    BrokerCapAmount {
        value: Option<f64>,
    },
    AverageSalesPrice {
        value: Option<f64>,
    },
    AverageCommissionRate {
        value: Option<f64>,
    },
    WorkDaysPerWeek {
        value: Option<f64>,
    },
    WeeksOff {
        value: Option<f64>,
    },
    FinancialReflection {
        text: String,
    },
    IncomeWhy {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_example() -> IncomePlanner {
        let mut planner = IncomePlanner::default();
        planner.set_personal_expense(0, Some(3_000.0));
        planner.set_business_expense(0, Some(500.0));
        planner.set_estimated_tax_rate(Some(25.0));
        planner.set_broker_split_percentage(Some(30.0));
        planner.set_average_sales_price(Some(350_000.0));
        planner.set_average_commission_rate(Some(0.025));
        planner.set_work_days_per_week(Some(5.0));
        planner.set_weeks_off(Some(2.0));
        planner
    }

    #[test]
    fn setters_recompute_metrics_after_every_change() {
        let mut planner = worked_example();
        assert_eq!(planner.metrics().final_gci, 80_000.0);
        assert_eq!(planner.metrics().total_transactions_needed, 10.0);

        planner.set_broker_cap_amount(Some(20_000.0));
        assert_eq!(planner.metrics().final_gci, 76_000.0);

        planner.set_broker_cap_amount(None);
        assert_eq!(planner.metrics().final_gci, 80_000.0);
    }

    #[test]
    fn metrics_always_match_a_fresh_derivation() {
        let mut planner = worked_example();
        planner.set_goal_amount(GoalCategory::Family, 2, Some(12_000.0));
        planner.set_weeks_off(Some(6.0));
        planner.set_financial_reflection("Closed 8 deals last year".to_string());

        assert_eq!(*planner.metrics(), derive(planner.inputs()));
    }

    #[test]
    fn setter_replaces_only_the_addressed_slot() {
        let mut planner = worked_example();
        let before = planner.inputs().clone();

        planner.set_personal_expense(3, Some(120.0));

        let after = planner.inputs();
        assert_eq!(after.personal_expenses[3].amount, Some(120.0));
        assert_eq!(after.personal_expenses[3].name, before.personal_expenses[3].name);
        for (index, item) in after.personal_expenses.iter().enumerate() {
            if index != 3 {
                assert_eq!(item, &before.personal_expenses[index]);
            }
        }
        assert_eq!(after.business_expenses, before.business_expenses);
        assert_eq!(after.manifest_goals, before.manifest_goals);
    }

    #[test]
    fn clearing_a_value_keeps_it_unanswered() {
        let mut planner = worked_example();
        planner.set_personal_expense(0, None);

        assert_eq!(planner.inputs().personal_expenses[0].amount, None);
        assert_eq!(planner.metrics().monthly_personal_total, 0.0);
    }

    #[test]
    fn out_of_range_index_leaves_inputs_unchanged() {
        let mut planner = worked_example();
        let before = planner.clone();

        planner.set_business_expense(99, Some(1.0));
        planner.set_goal_amount(GoalCategory::Business, 5, Some(1.0));

        assert_eq!(planner, before);
    }

    #[test]
    fn setters_accept_out_of_range_values() {
        let mut planner = worked_example();
        planner.set_estimated_tax_rate(Some(150.0));
        planner.set_personal_expense(1, Some(-200.0));

        assert_eq!(planner.inputs().estimated_tax_rate, Some(150.0));
        assert_eq!(planner.metrics().annual_taxable_income_needed, 0.0);
    }

    #[test]
    fn from_section_ignores_stale_metrics() {
        let planner = worked_example();
        let mut section = planner.to_section();
        section.metrics.final_gci = 1.0;

        let restored = IncomePlanner::from_section(section);
        assert_eq!(restored.metrics().final_gci, 80_000.0);
    }

    #[test]
    fn apply_dispatches_updates_parsed_from_json() {
        let mut planner = worked_example();
        let updates = [
            r#"{"field": "brokerCapAmount", "value": 20000}"#,
            r#"{"field": "goalName", "category": "family", "index": 0, "name": "Disney trip"}"#,
            r#"{"field": "goalAmount", "category": "family", "index": 0, "amount": 7500}"#,
            r#"{"field": "weeksOff", "value": null}"#,
        ];
        for json in updates {
            let update: InputUpdate = serde_json::from_str(json).expect("update should parse");
            planner.apply(update);
        }

        let inputs = planner.inputs();
        assert_eq!(inputs.broker_cap_amount, Some(20_000.0));
        assert_eq!(inputs.manifest_goals.family[0].name, "Disney trip");
        assert_eq!(inputs.manifest_goals.family[0].amount, Some(7_500.0));
        assert_eq!(inputs.weeks_off, None);
        assert_eq!(planner.metrics().manifest_goals_total, 7_500.0);
        assert_eq!(planner.metrics().working_days, 260.0);
    }

    #[test]
    fn report_counts_answers_without_touching_metrics() {
        let planner = worked_example();
        let report = planner.report();

        assert_eq!(report.metrics, *planner.metrics());
        assert_eq!(report.progress.filled, 8);
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains("\"finalGci\":80000.0"));
        assert!(json.contains("\"percentComplete\""));
    }

    #[test]
    fn unknown_update_field_is_rejected() {
        let err = serde_json::from_str::<InputUpdate>(r#"{"field": "salary", "value": 1}"#);
        assert!(err.is_err());
    }
}
