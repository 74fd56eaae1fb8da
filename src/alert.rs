//! Alert partials for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element of the base layout
//! via htmx's `hx-target-error` so that a failed form submission leaves the
//! form contents untouched.

use maud::{Markup, html};

/// Alert message types for styling.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AlertKind {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling.
pub struct AlertTemplate<'a> {
    kind: AlertKind,
    message: &'a str,
    details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert.
    #[allow(dead_code)]
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            kind: AlertKind::Success,
            message,
            details,
        }
    }

    /// Create a new error alert.
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            kind: AlertKind::Error,
            message,
            details,
        }
    }

    /// Render the alert as markup for the alert container.
    pub fn into_markup(self) -> Markup {
        let (container_style, heading_style) = match self.kind {
            AlertKind::Success => (
                "p-4 mb-4 rounded-lg bg-green-50 dark:bg-gray-800",
                "text-green-800 dark:text-green-400",
            ),
            AlertKind::Error => (
                "p-4 mb-4 rounded-lg bg-red-50 dark:bg-gray-800",
                "text-red-800 dark:text-red-400",
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class={"flex items-center justify-between font-medium " (heading_style)}
                    {
                        span { (self.message) }

                        button
                            type="button"
                            class="ms-2 -my-1.5 rounded-lg p-1.5 inline-flex h-8 w-8 hover:bg-red-100 dark:hover:bg-gray-700"
                            aria-label="Close"
                            onclick="this.closest('[role=alert]').remove()"
                        {
                            "✕"
                        }
                    }

                    @if !self.details.is_empty() {
                        div class="mt-2 text-sm text-gray-700 dark:text-gray-300"
                        {
                            (self.details)
                        }
                    }
                }
            }
        }
    }
}

impl From<AlertTemplate<'_>> for Markup {
    fn from(template: AlertTemplate<'_>) -> Self {
        template.into_markup()
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::AlertTemplate;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup = AlertTemplate::error("Could not delete transaction", "It is too old.")
            .into_markup()
            .into_string();

        let html = Html::parse_fragment(&markup);
        let alert_selector = Selector::parse("[role=alert]").unwrap();
        let alert = html.select(&alert_selector).next().expect("want an alert");
        let text = alert.text().collect::<String>();

        assert!(text.contains("Could not delete transaction"));
        assert!(text.contains("It is too old."));
    }

    #[test]
    fn alert_swaps_into_alert_container() {
        let markup = AlertTemplate::success("Saved", "")
            .into_markup()
            .into_string();

        let html = Html::parse_fragment(&markup);
        let container_selector = Selector::parse("#alert-container[hx-swap-oob]").unwrap();

        assert!(
            html.select(&container_selector).next().is_some(),
            "want the alert wrapped in an out-of-band alert container, got {markup}"
        );
    }
}
