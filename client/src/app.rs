//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::{footer::Footer, navbar::Navbar};
use crate::config::{META_BAAS_ANON_KEY, META_BAAS_URL, META_SITE_NAME, PublicConfig};
use crate::pages::{home::HomePage, login::LoginPage, portal::PortalPage, team::TeamPage};
use crate::state::auth::AuthProvider;

/// HTML shell rendered on the server for SSR + hydration.
///
/// The public configuration is written into `<meta>` tags so the hydrated
/// client can rebuild it with [`PublicConfig::from_document`].
pub fn shell(options: LeptosOptions, config: PublicConfig) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <meta name=META_BAAS_URL content={config.baas_url}/>
                <meta name=META_BAAS_ANON_KEY content={config.baas_anon_key}/>
                <meta name=META_SITE_NAME content={config.site_name}/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the site configuration and the auth context, then sets up
/// client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = use_context::<PublicConfig>().unwrap_or_else(PublicConfig::from_document);
    let title = config.site_name.clone();
    provide_context(config);

    view! {
        <Stylesheet id="leptos" href="/pkg/academy.css"/>
        <Title text=title/>

        <AuthProvider>
            <Router>
                <Navbar/>
                <Routes fallback=|| view! { <main class="not-found">"Page not found."</main> }>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("team") view=TeamPage/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("portal") view=PortalPage/>
                </Routes>
                <Footer/>
            </Router>
        </AuthProvider>
    }
}
