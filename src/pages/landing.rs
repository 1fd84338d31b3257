//! Landing route: runs the bootstrap and renders the welcome view.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the unauthenticated entry point. Nothing renders until the
//! bootstrap decides; a redirect decision navigates away and leaves the view
//! empty, a render decision shows the welcome card and sets the document head.

use leptos::prelude::*;
use leptos_meta::{Meta, Title};
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::AppContext;
use crate::bootstrap::{BootstrapDecision, LandingData, LandingMeta};
use crate::util::i18n::{Catalog, Translate};

/// Options for bootstrap navigations: replace the landing entry in history so
/// "back" does not bounce through the redirect again.
#[cfg_attr(not(feature = "csr"), allow(dead_code))]
fn redirect_options() -> NavigateOptions {
    NavigateOptions { replace: true, ..NavigateOptions::default() }
}

#[cfg(feature = "csr")]
async fn run_landing_load<F>(ctx: AppContext, navigate: F) -> BootstrapDecision
where
    F: Fn(&str, NavigateOptions),
{
    use std::sync::Arc;

    use crate::app::ROUTED_PATHS;
    use crate::bootstrap::Bootstrap;
    use crate::net::fetch::GlooFetcher;
    use crate::util::auto_login::{AutoLoginChannel, WindowMessageBus};
    use crate::util::navigation::{LocationNavigator, NavigationTarget, Navigator, navigation_target};

    let fetcher = GlooFetcher::new(ctx.config.fetch_timeout_ms);
    let channel = Arc::new(AutoLoginChannel::new(
        ctx.session.clone(),
        ctx.config.auto_login.clone(),
        ctx.config.login_path.as_str(),
        WindowMessageBus::own_origin(),
        LocationNavigator,
        ctx.handoff.clone(),
    ));
    channel.watch();
    let navigator = move |status: u16, location: &str| match navigation_target(location, ROUTED_PATHS) {
        NavigationTarget::Router => navigate(location, redirect_options()),
        NavigationTarget::Location => LocationNavigator.redirect(status, location),
    };

    Bootstrap::new(&ctx.config, &ctx.server_config)
        .with_auto_login(&WindowMessageBus, channel)
        .run(&fetcher, &Catalog::english(), &navigator)
        .await
}

#[cfg(not(feature = "csr"))]
#[allow(clippy::unused_async)]
async fn run_landing_load<F>(_ctx: AppContext, _navigate: F) -> BootstrapDecision
where
    F: Fn(&str, NavigateOptions),
{
    BootstrapDecision::Render(LandingData { meta: crate::bootstrap::landing_meta(&Catalog::english()) })
}

/// Landing page: bootstraps, then either redirects or shows the welcome card.
#[component]
pub fn LandingPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let navigate = use_navigate();
    let register_path = ctx.config.register_path.clone();

    let load = LocalResource::new(move || run_landing_load(ctx.clone(), navigate.clone()));

    view! {
        <Suspense fallback=|| ()>
            {move || {
                let register_path = register_path.clone();
                load.get()
                    .and_then(|decision| decision.landing().cloned())
                    .map(|data| view! { <LandingView data=data register_path=register_path/> })
            }}
        </Suspense>
    }
}

#[component]
fn LandingView(data: LandingData, register_path: String) -> impl IntoView {
    let LandingMeta { title, description } = data.meta;
    let getting_started = Catalog::english().translate("getting_started");

    view! {
        <Title text=title.clone()/>
        <Meta name="description" content=description.clone()/>
        <main class="landing-page">
            <div class="landing-card">
                <h1>{title}</h1>
                <p class="landing-card__subtitle">{description}</p>
                <a class="landing-button" href=register_path>
                    {getting_started}
                </a>
            </div>
        </main>
    }
}
