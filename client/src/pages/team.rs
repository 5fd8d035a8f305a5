//! Team page listing staff from the BaaS `team_members` table.
//!
//! SYSTEM CONTEXT
//! ==============
//! The fetch runs in the browser after hydration; the server renders the
//! loading state.

use leptos::prelude::*;

use crate::components::team_card::TeamCard;
use crate::state::team::TeamState;

#[component]
pub fn TeamPage() -> impl IntoView {
    let team = RwSignal::new(TeamState::default());

    #[cfg(feature = "hydrate")]
    {
        use crate::config::PublicConfig;
        use crate::net::baas::{Endpoints, fetch_team_members};

        let config = use_context::<PublicConfig>().unwrap_or_else(PublicConfig::from_document);
        leptos::task::spawn_local(async move {
            let result = if config.is_configured() {
                fetch_team_members(&Endpoints::new(&config)).await
            } else {
                Err(session::ProviderError::Unavailable("BaaS is not configured"))
            };
            if let Err(e) = &result {
                log::warn!("team fetch failed: {e}");
            }
            team.try_update(|s| s.finish(result));
        });
    }

    let body = move || {
        let state = team.get();
        if state.loading {
            return view! { <p class="team-page__status">"Loading the team..."</p> }.into_any();
        }
        if let Some(error) = state.error {
            return view! {
                <p class="team-page__status team-page__status--error">
                    {format!("Could not load the team: {error}")}
                </p>
            }
            .into_any();
        }
        if state.members.is_empty() {
            return view! { <p class="team-page__status">"No team members to show yet."</p> }.into_any();
        }
        view! {
            <div class="team-page__grid">
                {state.members.into_iter().map(|member| view! { <TeamCard member=member /> }).collect_view()}
            </div>
        }
        .into_any()
    };

    view! {
        <main class="team-page">
            <h1 class="team-page__title">"Meet our team"</h1>
            {body}
        </main>
    }
}
