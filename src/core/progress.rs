use serde_json::Value;

use super::types::{GoalCategory, IncomePlanningInputs, LineItem, Progress};

fn text_filled(text: &str) -> bool {
    !text.trim().is_empty()
}

fn number_filled(value: Option<f64>) -> bool {
    value.is_some()
}

impl Progress {
    pub fn from_counts(filled: usize, total: usize) -> Self {
        let percent_complete = if total > 0 {
            filled as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            filled,
            total,
            percent_complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.filled == self.total
    }
}

// Expense names come from the catalog, so only the amount is a user answer.
fn expense_answers(items: &[LineItem]) -> impl Iterator<Item = bool> + '_ {
    items.iter().map(|item| number_filled(item.amount))
}

fn goal_answers(items: &[LineItem]) -> impl Iterator<Item = bool> + '_ {
    items
        .iter()
        .flat_map(|item| [text_filled(&item.name), number_filled(item.amount)])
}

/// Completion of the income-planning section: every expense amount, every
/// goal name and amount, the scalar inputs and both narratives.
pub fn income_planning_progress(inputs: &IncomePlanningInputs) -> Progress {
    let scalars = [
        number_filled(inputs.estimated_tax_rate),
        number_filled(inputs.broker_split_percentage),
        number_filled(inputs.broker_cap_amount),
        number_filled(inputs.average_sales_price),
        number_filled(inputs.average_commission_rate),
        number_filled(inputs.work_days_per_week),
        number_filled(inputs.weeks_off),
        text_filled(&inputs.financial_reflection),
        text_filled(&inputs.income_why),
    ];

    let answers = expense_answers(&inputs.personal_expenses)
        .chain(expense_answers(&inputs.business_expenses))
        .chain(
            GoalCategory::ALL
                .into_iter()
                .flat_map(move |category| goal_answers(inputs.manifest_goals.category(category))),
        )
        .chain(scalars);

    let (filled, total) = answers.fold((0, 0), |(filled, total), answered| {
        (filled + usize::from(answered), total + 1)
    });
    Progress::from_counts(filled, total)
}

/// Completion of a free-form section document. Every leaf counts once:
/// strings when non-blank, numbers and booleans always, `null` never.
pub fn json_progress(document: &Value) -> Progress {
    let mut filled = 0;
    let mut total = 0;
    count_leaves(document, &mut filled, &mut total);
    Progress::from_counts(filled, total)
}

fn count_leaves(value: &Value, filled: &mut usize, total: &mut usize) {
    match value {
        Value::Array(items) => {
            for item in items {
                count_leaves(item, filled, total);
            }
        }
        Value::Object(fields) => {
            for field in fields.values() {
                count_leaves(field, filled, total);
            }
        }
        leaf => {
            *total += 1;
            let answered = match leaf {
                Value::String(text) => text_filled(text),
                Value::Null => false,
                _ => true,
            };
            if answered {
                *filled += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{
        BUSINESS_EXPENSE_CATEGORIES, GOAL_SLOTS, PERSONAL_EXPENSE_CATEGORIES,
    };
    use serde_json::json;

    fn blank_total() -> usize {
        PERSONAL_EXPENSE_CATEGORIES.len()
            + BUSINESS_EXPENSE_CATEGORIES.len()
            + GoalCategory::ALL.len() * GOAL_SLOTS * 2
            + 9
    }

    #[test]
    fn blank_workbook_has_nothing_filled() {
        let progress = income_planning_progress(&IncomePlanningInputs::default());
        assert_eq!(progress.filled, 0);
        assert_eq!(progress.total, blank_total());
        assert_eq!(progress.percent_complete, 0.0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn zero_counts_as_answered_but_blank_text_does_not() {
        let mut inputs = IncomePlanningInputs::default();
        inputs.personal_expenses[0].amount = Some(0.0);
        inputs.weeks_off = Some(0.0);
        inputs.income_why = "   ".to_string();
        inputs.manifest_goals.personal[1].name = " New car ".to_string();

        let progress = income_planning_progress(&inputs);
        assert_eq!(progress.filled, 3);
    }

    #[test]
    fn percent_complete_tracks_filled_share() {
        let progress = Progress::from_counts(1, 4);
        assert_eq!(progress.percent_complete, 25.0);
        assert_eq!(Progress::from_counts(0, 0).percent_complete, 0.0);
    }

    #[test]
    fn json_progress_counts_nested_leaves() {
        let swot = json!({
            "strengths": ["Local network", "  ", null],
            "weaknesses": [],
            "opportunities": {"primary": "New construction", "notes": ""},
            "threats": [{"name": "Rates", "severity": 3, "reviewed": false}]
        });

        let progress = json_progress(&swot);
        assert_eq!(progress.total, 8);
        assert_eq!(progress.filled, 5);
    }
}
