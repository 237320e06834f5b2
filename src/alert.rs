//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element that [crate::html::base]
//! places at the bottom of every page. Forms target this container with
//! `hx-target-error` so that failed requests show up as an alert.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message shown to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    Success {
        /// The headline of the alert.
        message: String,
    },
    /// An error message with details on how to fix it.
    Error {
        /// The headline of the alert.
        message: String,
        /// What went wrong and what the user can do about it.
        details: String,
    },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details, is_error) = match self {
            Alert::Success { message } => (message, None, false),
            Alert::Error { message, details } => (message, Some(details), true),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 rounded-lg border text-red-800 border-red-300 \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 rounded-lg border text-green-800 border-green-300 \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="text-sm font-medium" { (message) }

                        @if let Some(details) = details
                        {
                            @if !details.is_empty()
                            {
                                p class="mt-1 text-sm" { (details) }
                            }
                        }
                    }

                    button
                        type="button"
                        class="ms-3 text-sm font-medium hover:underline"
                        aria-label="Dismiss"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "✕"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
