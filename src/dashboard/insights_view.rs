//! Renders the insights section of the dashboard.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BADGE_STYLE, CARD_STYLE, LINK_STYLE, WARNING_BADGE_STYLE},
    insights::{DataQuality, Insight, MINIMUM_DAYS, MINIMUM_TRANSACTIONS},
};

fn insight_card(insight: &Insight) -> Markup {
    html! {
        li class=(CARD_STYLE) data-insight-kind=(insight.kind.as_str())
        {
            div class="flex justify-between items-start gap-2 mb-1"
            {
                h3 class="font-semibold" { (insight.title) }
                span class=(BADGE_STYLE) { (insight.kind.as_str()) }
            }

            p class="text-sm" { (insight.description) }
            p class="text-sm text-gray-600 dark:text-gray-300 mt-1" { (insight.recommendation) }
        }
    }
}

/// The insights section, or an explanation of how much more history is
/// needed when `quality` is not sufficient.
pub(super) fn insights_section(quality: &DataQuality, insights: &[Insight]) -> Markup {
    html! {
        section id="insights" class="w-full space-y-4"
        {
            h2 class="text-lg font-semibold" { "Insights" }

            @if quality.is_sufficient() {
                @if !quality.warnings.is_empty() {
                    ul id="insight-warnings" class="space-y-1"
                    {
                        @for warning in &quality.warnings {
                            li class=(WARNING_BADGE_STYLE) { (warning) }
                        }
                    }
                }

                ul class="grid gap-4 md:grid-cols-3"
                {
                    @for insight in insights {
                        (insight_card(insight))
                    }
                }
            } @else {
                p data-insufficient-data
                {
                    "Insights appear once you have at least " (MINIMUM_TRANSACTIONS)
                    " transactions over " (MINIMUM_DAYS) " days. You have "
                    (quality.transaction_count) " over " (quality.days_spanned) " days. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Record a transaction"
                    }
                    "."
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::insights::{DataQuality, Insight, InsightKind};

    use super::insights_section;

    fn quality(transaction_count: usize, days_spanned: i64, warnings: Vec<String>) -> DataQuality {
        DataQuality {
            transaction_count,
            days_spanned,
            income_transactions: 1,
            expense_transactions: transaction_count.saturating_sub(1),
            warnings,
        }
    }

    #[test]
    fn shows_insights_with_warnings() {
        let insights = vec![Insight {
            kind: InsightKind::Savings,
            title: "Good Savings Discipline".to_owned(),
            description: "Your savings rate of 15.0% is above average.".to_owned(),
            recommendation: "Try to gradually increase your savings rate to 20%.".to_owned(),
        }];
        let quality = quality(10, 12, vec!["Only 10 transactions recorded.".to_owned()]);

        let html = Html::parse_fragment(&insights_section(&quality, &insights).into_string());

        let cards = html
            .select(&Selector::parse("li[data-insight-kind=savings] h3").unwrap())
            .map(|title| title.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(cards, vec!["Good Savings Discipline"]);
        assert_eq!(
            html.select(&Selector::parse("#insight-warnings li").unwrap())
                .count(),
            1
        );
    }

    #[test]
    fn explains_insufficient_data() {
        let quality = quality(3, 2, Vec::new());

        let html = Html::parse_fragment(&insights_section(&quality, &[]).into_string());

        let message = html
            .select(&Selector::parse("p[data-insufficient-data]").unwrap())
            .next()
            .expect("no insufficient data message")
            .text()
            .collect::<String>();
        assert!(message.contains("You have 3 over 2 days."), "got {message}");
        assert_eq!(html.select(&Selector::parse("li").unwrap()).count(), 0);
    }
}
