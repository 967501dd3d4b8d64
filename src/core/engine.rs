use super::types::{DerivedMetrics, ExpenseLineItem, IncomePlanningInputs};

pub const APPOINTMENTS_PER_TRANSACTION: f64 = 5.0;
pub const CONVERSATIONS_PER_APPOINTMENT: f64 = 16.0;
pub const REACHOUTS_PER_CONVERSATION: f64 = 12.5;

const MONTHS_PER_YEAR: f64 = 12.0;
const WEEKS_PER_YEAR: f64 = 52.0;
const DEFAULT_WORK_DAYS_PER_WEEK: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
struct ExpenseTotals {
    personal: f64,
    business: f64,
}

impl ExpenseTotals {
    fn combined(self) -> f64 {
        self.personal + self.business
    }
}

#[derive(Debug, Clone, Copy)]
struct GciTargets {
    gci_needed: f64,
    adjusted_gci_needed: f64,
    final_gci: f64,
}

#[derive(Debug, Clone, Copy)]
struct ActivityTargets {
    appointments: f64,
    conversations: f64,
    reach_outs: f64,
}

/// Reads an optional input, falling back to `default` for unanswered or
/// non-finite values.
fn value_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Divides only when the divisor is strictly positive; otherwise zero.
fn guarded_div(numerator: f64, divisor: f64) -> f64 {
    if divisor > 0.0 {
        finite_or_zero(numerator / divisor)
    } else {
        0.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn sum_amounts<'a>(items: impl IntoIterator<Item = &'a ExpenseLineItem>) -> f64 {
    items
        .into_iter()
        .map(|item| value_or(item.amount, 0.0))
        .sum()
}

fn expense_totals(inputs: &IncomePlanningInputs) -> ExpenseTotals {
    ExpenseTotals {
        personal: finite_or_zero(sum_amounts(&inputs.personal_expenses)),
        business: finite_or_zero(sum_amounts(&inputs.business_expenses)),
    }
}

fn taxable_income_needed(target_take_home_income: f64, estimated_tax_rate: Option<f64>) -> f64 {
    let tax_multiplier = 1.0 - value_or(estimated_tax_rate, 0.0) / 100.0;
    guarded_div(target_take_home_income, tax_multiplier)
}

// A capped broker turns the requirement into cap + taxable income; the
// percentage split no longer applies once a cap exists.
fn gci_targets(inputs: &IncomePlanningInputs, annual_taxable_income_needed: f64) -> GciTargets {
    let agent_share = 1.0 - value_or(inputs.broker_split_percentage, 0.0) / 100.0;
    let gci_needed = guarded_div(annual_taxable_income_needed, agent_share);
    let broker_cap = value_or(inputs.broker_cap_amount, 0.0);

    let adjusted_gci_needed = if broker_cap > 0.0 {
        finite_or_zero(broker_cap + annual_taxable_income_needed)
    } else {
        gci_needed
    };
    let final_gci = if broker_cap > 0.0 {
        adjusted_gci_needed
    } else {
        gci_needed
    };

    GciTargets {
        gci_needed,
        adjusted_gci_needed,
        final_gci,
    }
}

fn transactions_needed(final_gci: f64, average_commission_per_transaction: f64) -> f64 {
    if average_commission_per_transaction > 0.0 {
        finite_or_zero((final_gci / average_commission_per_transaction).ceil())
    } else {
        0.0
    }
}

fn activity_targets(total_transactions_needed: f64) -> ActivityTargets {
    let appointments = total_transactions_needed * APPOINTMENTS_PER_TRANSACTION;
    let conversations = appointments * CONVERSATIONS_PER_APPOINTMENT;
    let reach_outs = conversations * REACHOUTS_PER_CONVERSATION;
    ActivityTargets {
        appointments: finite_or_zero(appointments),
        conversations: finite_or_zero(conversations),
        reach_outs: finite_or_zero(reach_outs),
    }
}

fn working_days(inputs: &IncomePlanningInputs) -> f64 {
    let days_per_week = value_or(inputs.work_days_per_week, DEFAULT_WORK_DAYS_PER_WEEK);
    let weeks_off = value_or(inputs.weeks_off, 0.0);
    finite_or_zero(days_per_week * WEEKS_PER_YEAR - days_per_week * weeks_off)
}

/// Runs the income-planning pipeline. Stages run in a fixed order because
/// later rounding depends on the exact values produced before it. Every
/// field of the result is finite.
pub fn derive(inputs: &IncomePlanningInputs) -> DerivedMetrics {
    let expenses = expense_totals(inputs);
    let combined_monthly_total = finite_or_zero(expenses.combined());
    let annual_expenses = finite_or_zero(combined_monthly_total * MONTHS_PER_YEAR);

    let manifest_goals_total = finite_or_zero(sum_amounts(inputs.manifest_goals.iter()));
    let target_take_home_income = finite_or_zero(annual_expenses + manifest_goals_total);

    let annual_taxable_income_needed =
        taxable_income_needed(target_take_home_income, inputs.estimated_tax_rate);
    let gci = gci_targets(inputs, annual_taxable_income_needed);

    let average_commission_per_transaction = finite_or_zero(
        value_or(inputs.average_sales_price, 0.0) * value_or(inputs.average_commission_rate, 0.0),
    );
    let total_transactions_needed =
        transactions_needed(gci.final_gci, average_commission_per_transaction);
    let activity = activity_targets(total_transactions_needed);

    let working_days = working_days(inputs);

    DerivedMetrics {
        monthly_personal_total: expenses.personal,
        monthly_business_total: expenses.business,
        combined_monthly_total,
        annual_expenses,
        manifest_goals_total,
        target_take_home_income,
        annual_taxable_income_needed,
        gci_needed: gci.gci_needed,
        adjusted_gci_needed: gci.adjusted_gci_needed,
        final_gci: gci.final_gci,
        average_commission_per_transaction,
        total_transactions_needed,
        appointments_needed: activity.appointments,
        conversations_needed: activity.conversations,
        reach_outs_needed: activity.reach_outs,
        working_days,
        daily_reach_outs: guarded_div(activity.reach_outs, working_days),
        daily_conversations: guarded_div(activity.conversations, working_days),
        daily_appointments: guarded_div(activity.appointments, working_days),
    }
}
