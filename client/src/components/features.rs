//! Feature cards describing the academy's offer.

#[cfg(test)]
#[path = "features_test.rs"]
mod features_test;

use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    /// Single glyph rendered in the card badge.
    pub icon: &'static str,
}

pub const FEATURES: &[Feature] = &[
    Feature {
        title: "Small groups",
        description: "No more than ten students per class, so every lesson has room for questions.",
        icon: "👥",
    },
    Feature {
        title: "Certified teachers",
        description: "Every teacher holds a recognised qualification and trains with us each term.",
        icon: "🎓",
    },
    Feature {
        title: "Flexible schedule",
        description: "Morning, evening and weekend groups, plus private lessons on request.",
        icon: "🗓",
    },
    Feature {
        title: "Exam preparation",
        description: "Dedicated tracks for international exams with regular mock tests.",
        icon: "📝",
    },
    Feature {
        title: "Student portal",
        description: "Timetables, homework and progress reports in one place.",
        icon: "💻",
    },
    Feature {
        title: "Branches nearby",
        description: "Six branches across the city, all with the same programme.",
        icon: "📍",
    },
];

#[component]
pub fn Features() -> impl IntoView {
    view! {
        <section class="features">
            <h2 class="features__title">"Why study with us"</h2>
            <div class="features__grid">
                {FEATURES
                    .iter()
                    .map(|feature| {
                        view! {
                            <article class="feature-card">
                                <span class="feature-card__icon" aria-hidden="true">{feature.icon}</span>
                                <h3 class="feature-card__title">{feature.title}</h3>
                                <p class="feature-card__text">{feature.description}</p>
                            </article>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}
