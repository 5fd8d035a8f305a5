//! Card for one member of the team listing.

use leptos::prelude::*;

use crate::net::types::TeamMember;

/// Photo with an initials fallback, name, position and optional bio.
#[component]
pub fn TeamCard(member: TeamMember) -> impl IntoView {
    let initials = member.initials();
    let alt = member.name.clone();
    let photo = match member.photo_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => view! { <img class="team-card__photo" src=url alt=alt /> }.into_any(),
        None => view! { <span class="team-card__initials" aria-hidden="true">{initials}</span> }.into_any(),
    };
    view! {
        <article class="team-card">
            {photo}
            <h3 class="team-card__name">{member.name}</h3>
            <p class="team-card__position">{member.position}</p>
            {member.bio.map(|bio| view! { <p class="team-card__bio">{bio}</p> })}
        </article>
    }
}
