//! Landing hero with headline and calls to action.

use leptos::prelude::*;

pub const HEADLINE: &str = "Learn with teachers who know your name";
pub const SUBHEADLINE: &str =
    "Small classes, flexible schedules and courses from first steps to exam preparation, at a branch near you.";

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <section class="hero">
            <div class="hero__inner">
                <h1 class="hero__title">{HEADLINE}</h1>
                <p class="hero__subtitle">{SUBHEADLINE}</p>
                <div class="hero__actions">
                    <a class="button button--primary" href="/login">"Get started"</a>
                    <a class="button button--ghost" href="/team">"Meet the team"</a>
                </div>
            </div>
        </section>
    }
}
