use std::sync::Arc;

use anyhow::Context;
use clientaimap::gateway::{AuthGateway, MemoryGateway, ProfileGateway, SupabaseClient};
use clientaimap::onboarding::OnboardingServices;
use clientaimap::saved::SavedBusinessStore;
use clientaimap::search::categories::{self, CATEGORIES};
use clientaimap::search::scoring::ScoreBand;
use clientaimap::search::{
    BusinessSearch, GooglePlacesClient, IpApiLocator, NoDeviceLocation, OriginResolver,
    PlacesVerifier, SearchOutcome, SearchRequest,
};
use clientaimap::session::{FileStore, SessionRepository, SessionStore};
use clientaimap::{AppShell, Config};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type Gateways = (Arc<dyn AuthGateway>, Arc<dyn ProfileGateway>);

fn build_gateways(config: &Config) -> anyhow::Result<Gateways> {
    match (&config.supabase_url, &config.supabase_anon_key) {
        (Some(url), Some(key)) => {
            let client = Arc::new(SupabaseClient::new(url, key, config.timings.http)?);
            let auth: Arc<dyn AuthGateway> = client.clone();
            let profiles: Arc<dyn ProfileGateway> = client;
            Ok((auth, profiles))
        }
        _ => {
            warn!("Supabase not configured, using in-memory backend");
            let memory = Arc::new(MemoryGateway::new());
            let auth: Arc<dyn AuthGateway> = memory.clone();
            let profiles: Arc<dyn ProfileGateway> = memory;
            Ok((auth, profiles))
        }
    }
}

/// Category tags, plus the redirect URL passed with `--oauth-callback <url>`
fn parse_args(mut args: impl Iterator<Item = String>) -> (Vec<String>, Option<String>) {
    let mut selected = Vec::new();
    let mut callback = None;
    while let Some(arg) = args.next() {
        if arg == "--oauth-callback" {
            callback = args.next();
        } else {
            selected.push(arg);
        }
    }
    (selected, callback)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🗺️  ClientAIMap - Local Business Finder");
    info!("========================================");

    let (selected, callback) = parse_args(std::env::args().skip(1));

    let config = Config::from_env();
    for issue in config.issues() {
        warn!("{} ({})", issue.message, issue.key);
        warn!("  → {}", issue.remediation);
    }

    let store = FileStore::new(&config.storage_dir)
        .await
        .context("Failed to open session storage")?;
    let sessions = SessionStore::new(SessionRepository::new(Arc::new(store)), config.session_ttl);

    let (auth, profiles) = build_gateways(&config)?;
    let places = Arc::new(GooglePlacesClient::new(
        config.google_maps_api_key.clone(),
        config.timings.http,
    )?);

    let services = OnboardingServices::new(auth, profiles.clone(), sessions, &config.timings)
        .with_verifier(Arc::new(PlacesVerifier::new(places.clone())))
        .with_oauth_redirect(config.oauth_redirect.clone());
    let mut app = AppShell::new(services);

    let view = match &callback {
        Some(url) => app.handle_oauth_callback(url).await,
        None => app.resolve_start_view().await,
    };
    info!("Start view: {:?}", view);

    let user_id = app.profile().and_then(|p| p.id.clone());
    if let Some(profile) = app.profile() {
        info!("Signed in as {}", profile.display_name());
        let saved = SavedBusinessStore::new(profiles).list(user_id.as_deref()).await;
        info!("{} saved businesses", saved.len());
    }

    // Resolve where to search from
    let resolver = OriginResolver::new(
        Arc::new(NoDeviceLocation),
        Arc::new(IpApiLocator::new(config.timings.ip_lookup)?),
        config.timings.clone(),
    );
    let origin = resolver.resolve().await;
    info!(
        "Searching around {:.4}, {:.4} ({:?})",
        origin.location.lat, origin.location.lng, origin.source
    );

    let search = BusinessSearch::new(places.clone(), config.search_radius_m);
    search.show_origin(&origin);

    if selected.is_empty() {
        let available: Vec<_> = CATEGORIES.iter().map(|c| c.id).collect();
        info!("No categories given, searching any establishment. Available: {}", available.join(", "));
    }
    for tag in &selected {
        match categories::find(tag) {
            Some(category) => info!("Category: {}", category.label),
            None => warn!("Unknown category '{}', searching it as a place type", tag),
        }
    }

    let request = SearchRequest {
        categories: selected,
        max_results: config.max_results,
        ..SearchRequest::new(origin.location)
    };

    let listings = match search.search(&request).await {
        Ok(SearchOutcome::Completed(listings)) => listings,
        Ok(SearchOutcome::Superseded) => {
            info!("Search superseded by a newer one");
            return Ok(());
        }
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    // Display results
    info!("\n✅ Found {} businesses\n", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        let band = ScoreBand::from_score(listing.digital_score);
        println!("{}. {} ({} - {})", i + 1, listing.name, listing.digital_score, band.label());
        if let Some(address) = &listing.address {
            println!("   Address: {}", address);
        }
        if let Some(phone) = &listing.phone {
            println!("   Phone: {}", phone);
        }
        if let Some(website) = &listing.website {
            println!("   Website: {}", website);
        }
        if let Some(url) = listing.photos.first().and_then(|r| places.photo_url(r)) {
            println!("   Photo: {}", url);
        }
        if let Some(url) = listing.social_search_url() {
            println!("   Socials: {}", url);
        }
        println!();
    }

    let json = serde_json::to_string_pretty(&listings)?;
    tokio::fs::write("businesses.json", json).await?;
    info!("💾 Saved results to businesses.json");

    Ok(())
}
