use axum::{body::Body, response::Response};
use scraper::Selector;

use crate::test_utils::{assert_valid_html, parse_html_fragment};

/// Assert that `response` is an alert whose headline is `expected_message`.
pub(crate) async fn assert_alert_message(response: Response<Body>, expected_message: &str) {
    let html = parse_html_fragment(response).await;
    assert_valid_html(&html);

    let message = html
        .select(&Selector::parse("#alert-container p.text-sm.font-medium").unwrap())
        .next()
        .expect("No alert message found")
        .text()
        .collect::<String>();

    assert_eq!(message.trim(), expected_message);
}
