//! Fixed category lists of a blank workbook.

pub const PERSONAL_EXPENSE_CATEGORIES: [&str; 20] = [
    "Mortgage / Rent",
    "Property Tax",
    "Home Insurance",
    "Utilities",
    "Phone",
    "Internet / Cable",
    "Groceries",
    "Dining Out",
    "Car Payment",
    "Car Insurance",
    "Fuel",
    "Health Insurance",
    "Medical / Dental",
    "Childcare",
    "Education",
    "Debt Payments",
    "Savings / Investments",
    "Subscriptions",
    "Entertainment",
    "Miscellaneous",
];

/// Annual business costs (license renewals, association dues, errors and
/// omissions insurance) are entered already divided by 12.
pub const BUSINESS_EXPENSE_CATEGORIES: [&str; 13] = [
    "MLS Dues",
    "Association Dues",
    "License Renewal",
    "E&O Insurance",
    "Desk Fee",
    "Marketing",
    "Lead Generation",
    "CRM / Software",
    "Website",
    "Business Phone",
    "Vehicle / Mileage",
    "Education / Coaching",
    "Client Gifts",
];

pub const GOAL_SLOTS: usize = 5;
