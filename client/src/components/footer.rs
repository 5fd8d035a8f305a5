//! Site footer.

use leptos::prelude::*;

use crate::config::PublicConfig;

pub const CONTACT_EMAIL: &str = "hello@northbridge.academy";

#[component]
pub fn Footer() -> impl IntoView {
    let site_name = use_context::<PublicConfig>().unwrap_or_default().site_name;
    let copyright = format!("© {site_name}. All rights reserved.");
    let mailto = format!("mailto:{CONTACT_EMAIL}");
    view! {
        <footer class="footer">
            <p class="footer__contact">
                "Questions? Write to " <a href=mailto>{CONTACT_EMAIL}</a>
            </p>
            <p class="footer__copyright">{copyright}</p>
        </footer>
    }
}
