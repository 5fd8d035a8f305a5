//! Landing page composed of the marketing sections.

use leptos::prelude::*;

use crate::components::features::Features;
use crate::components::hero::Hero;
use crate::components::stats::Stats;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <main class="home-page">
            <Hero />
            <Stats />
            <Features />
        </main>
    }
}
