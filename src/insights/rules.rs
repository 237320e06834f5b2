use crate::{insights::FinancialProfile, money::format_currency};

const EXCELLENT_SAVINGS_RATE: f64 = 0.2;
const GOOD_SAVINGS_RATE: f64 = 0.1;

/// What an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    /// Money coming in versus going out.
    Trend,
    Savings,
    /// A single spending category.
    Category,
}

impl InsightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InsightKind::Trend => "trend",
            InsightKind::Savings => "savings",
            InsightKind::Category => "category",
        }
    }
}

/// A short observation about the user's finances.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

fn trend_insight(profile: &FinancialProfile) -> Insight {
    let flow = profile.net_monthly_flow();

    if flow > 0.0 {
        Insight {
            kind: InsightKind::Trend,
            title: "Positive Financial Trend".to_owned(),
            description: format!(
                "You bring in {} more than you spend each month on average.",
                format_currency(flow)
            ),
            recommendation: "Consider putting the difference towards a savings goal.".to_owned(),
        }
    } else {
        Insight {
            kind: InsightKind::Trend,
            title: "Financial Caution Advised".to_owned(),
            description: format!(
                "You spend {} more than you bring in each month on average.",
                format_currency(flow.abs())
            ),
            recommendation: "Review and cut back your spending to improve your cash flow."
                .to_owned(),
        }
    }
}

fn savings_insight(profile: &FinancialProfile) -> Insight {
    let percentage = profile.savings_rate * 100.0;

    if profile.savings_rate > EXCELLENT_SAVINGS_RATE {
        Insight {
            kind: InsightKind::Savings,
            title: "Excellent Savings Performance".to_owned(),
            description: format!("Your savings rate of {percentage:.1}% is exceptional."),
            recommendation: "Keep up this habit and consider long term goals for your savings."
                .to_owned(),
        }
    } else if profile.savings_rate > GOOD_SAVINGS_RATE {
        Insight {
            kind: InsightKind::Savings,
            title: "Good Savings Discipline".to_owned(),
            description: format!("Your savings rate of {percentage:.1}% is above average."),
            recommendation: "Try to gradually increase your savings rate to 20%.".to_owned(),
        }
    } else {
        Insight {
            kind: InsightKind::Savings,
            title: "Savings Opportunity".to_owned(),
            description: format!(
                "Your savings rate of {percentage:.1}% has room for improvement."
            ),
            recommendation: "Aim to save at least 10-15% of your income.".to_owned(),
        }
    }
}

fn top_category_insight(profile: &FinancialProfile) -> Option<Insight> {
    let (name, total) = profile.expense_totals.first()?;

    Some(Insight {
        kind: InsightKind::Category,
        title: format!("Most Spent on {name}"),
        description: format!("You have spent {} on {name}.", format_currency(*total)),
        recommendation: format!("Set a budget for {name} to keep this spending in check."),
    })
}

/// Turn `profile` into insights on cash flow, savings rate and the largest
/// spending category, in that order.
pub fn generate_insights(profile: &FinancialProfile) -> Vec<Insight> {
    let mut insights = vec![trend_insight(profile), savings_insight(profile)];
    insights.extend(top_category_insight(profile));
    insights
}

#[cfg(test)]
mod tests {
    use crate::insights::{FinancialProfile, InsightKind};

    use super::generate_insights;

    fn profile(income: f64, expenses: f64) -> FinancialProfile {
        FinancialProfile {
            avg_monthly_income: income,
            avg_monthly_expenses: expenses,
            savings_rate: if income > 0.0 {
                (income - expenses) / income
            } else {
                0.0
            },
            expense_totals: vec![("Food".to_owned(), expenses)],
            transaction_count: 10,
        }
    }

    #[test]
    fn positive_flow_with_excellent_savings() {
        let insights = generate_insights(&profile(1000.0, 700.0));

        let titles: Vec<_> = insights.iter().map(|insight| insight.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Positive Financial Trend",
                "Excellent Savings Performance",
                "Most Spent on Food"
            ]
        );
        assert_eq!(
            insights[0].description,
            "You bring in ₱300.00 more than you spend each month on average."
        );
        assert_eq!(insights[1].description, "Your savings rate of 30.0% is exceptional.");
    }

    #[test]
    fn good_savings_between_ten_and_twenty_percent() {
        let insights = generate_insights(&profile(1000.0, 850.0));

        assert_eq!(insights[1].kind, InsightKind::Savings);
        assert_eq!(insights[1].title, "Good Savings Discipline");
    }

    #[test]
    fn exactly_twenty_percent_is_only_good() {
        let insights = generate_insights(&profile(1000.0, 800.0));

        assert_eq!(insights[1].title, "Good Savings Discipline");
    }

    #[test]
    fn negative_flow_advises_caution() {
        let insights = generate_insights(&profile(1000.0, 1500.0));

        assert_eq!(insights[0].title, "Financial Caution Advised");
        assert_eq!(
            insights[0].description,
            "You spend ₱500.00 more than you bring in each month on average."
        );
        assert_eq!(insights[1].title, "Savings Opportunity");
    }

    #[test]
    fn no_category_insight_without_expenses() {
        let profile = FinancialProfile {
            expense_totals: Vec::new(),
            ..profile(1000.0, 0.0)
        };

        let insights = generate_insights(&profile);

        assert_eq!(insights.len(), 2);
        assert!(
            insights
                .iter()
                .all(|insight| insight.kind != InsightKind::Category)
        );
    }
}
