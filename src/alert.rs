//! Error messages shown to the user after a failed htmx request.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element that [crate::html::base]
//! renders at the bottom of every page.

use maud::{Markup, html};

/// A message to display in the alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_html(self) -> Markup {
        let Alert::Error { message, details } = self;

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    class="p-4 text-sm text-red-800 rounded-lg bg-red-50 \
                        dark:bg-gray-800 dark:text-red-400 border border-red-300 \
                        dark:border-red-800 shadow"
                    role="alert"
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        div
                        {
                            p class="font-semibold" { (message) }

                            @if !details.is_empty() {
                                p class="mt-1" { (details) }
                            }
                        }

                        button
                            type="button"
                            aria-label="Dismiss"
                            class="font-bold"
                            onclick="document.getElementById('alert-container').classList.add('hidden')"
                        {
                            "×"
                        }
                    }
                }
            }
        }
    }
}
