//! Headline figures shown under the hero.

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

pub const STATS: &[Stat] = &[
    Stat { value: "12+", label: "Years teaching" },
    Stat { value: "4,800", label: "Students enrolled" },
    Stat { value: "60", label: "Qualified teachers" },
    Stat { value: "6", label: "Branches" },
];

#[component]
pub fn Stats() -> impl IntoView {
    view! {
        <section class="stats">
            {STATS
                .iter()
                .map(|stat| {
                    view! {
                        <div class="stats__item">
                            <span class="stats__value">{stat.value}</span>
                            <span class="stats__label">{stat.label}</span>
                        </div>
                    }
                })
                .collect_view()}
        </section>
    }
}
