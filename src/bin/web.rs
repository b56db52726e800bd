//! Single binary web server: scheduling API via REST over an in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//!
//! Identity and roles come from headers (X-User-Id, X-Venue-Role,
//! X-Display-Name); authentication itself is an external concern.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use matchday_web::{
    CreateMatch, FinishOutcome, MatchFilter, MatchId, MatchMode, MemoryStore, PlayerId, Role,
    ScheduleError, Venue, VenueId, VenueSession, VenueStore, DEFAULT_COURT_COUNT,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-venue entry: the client session + last activity time (for auto-cleanup).
struct SessionEntry {
    session: VenueSession<MemoryStore>,
    last_activity: Instant,
}

struct AppStateInner {
    store: Arc<MemoryStore>,
    sessions: HashMap<VenueId, SessionEntry>,
}

/// In-memory state: one session per venue. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<AppStateInner>>;

/// Inactivity threshold: sessions not touched for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateVenueBody {
    name: String,
    court_count: Option<u32>,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct PresenceBody {
    present: bool,
}

#[derive(Deserialize)]
struct SuggestBody {
    #[serde(default)]
    mode: MatchMode,
}

#[derive(Deserialize)]
struct MatchListQuery {
    #[serde(default)]
    filter: MatchFilter,
}

/// Path segment: venue id (e.g. /api/venues/{id})
#[derive(Deserialize)]
struct VenuePath {
    id: VenueId,
}

/// Path segments: venue id and player id.
#[derive(Deserialize)]
struct VenuePlayerPath {
    id: VenueId,
    player_id: PlayerId,
}

/// Path segments: venue id and match id.
#[derive(Deserialize)]
struct VenueMatchPath {
    id: VenueId,
    match_id: MatchId,
}

/// Caller identity as handed to us by the auth layer.
struct Caller {
    user_id: Uuid,
    role: Role,
    display_name: String,
}

fn caller_from(req: &HttpRequest) -> Caller {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let user_id = header("X-User-Id").parse().unwrap_or_else(|_| Uuid::nil());
    let role = match header("X-Venue-Role").as_str() {
        "admin" => Role::Admin,
        "organiser" => Role::Organiser,
        _ => Role::Player,
    };
    Caller {
        user_id,
        role,
        display_name: header("X-Display-Name"),
    }
}

fn error_response(e: &ScheduleError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        ScheduleError::Validation(_) => HttpResponse::BadRequest().json(body),
        ScheduleError::InvalidState => HttpResponse::Conflict().json(body),
        ScheduleError::NotFound(_) => HttpResponse::NotFound().json(body),
        ScheduleError::Forbidden => HttpResponse::Forbidden().json(body),
        ScheduleError::Transport(_) => HttpResponse::BadGateway().json(body),
    }
}

/// Run `f` against the venue's session, opening one if needed. A caller
/// change reopens the session (one interactive client per venue).
fn with_session<F>(state: &AppState, venue_id: VenueId, caller: Caller, f: F) -> HttpResponse
where
    F: FnOnce(&mut VenueSession<MemoryStore>) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let store = g.store.clone();
    let needs_open = match g.sessions.get(&venue_id) {
        Some(entry) => entry.session.user_id != caller.user_id,
        None => true,
    };
    if needs_open {
        let session = match VenueSession::open(
            store,
            venue_id,
            caller.user_id,
            caller.role,
            caller.display_name,
        ) {
            Ok(s) => s,
            Err(e) => return error_response(&e),
        };
        g.sessions.insert(
            venue_id,
            SessionEntry {
                session,
                last_activity: Instant::now(),
            },
        );
    }
    let entry = match g.sessions.get_mut(&venue_id) {
        Some(e) => e,
        None => return HttpResponse::InternalServerError().body("session error"),
    };
    entry.last_activity = Instant::now();
    f(&mut entry.session)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "matchday-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[get("/api/venues")]
async fn api_list_venues(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.store.list_venues() {
        Ok(venues) => HttpResponse::Ok().json(venues),
        Err(e) => error_response(&ScheduleError::from(e)),
    }
}

#[post("/api/venues")]
async fn api_create_venue(
    state: AppState,
    req: HttpRequest,
    body: Json<CreateVenueBody>,
) -> HttpResponse {
    let caller = caller_from(&req);
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut venue = Venue::new(body.name.trim(), caller.user_id, chrono::Utc::now());
    venue.court_count = body.court_count.unwrap_or(DEFAULT_COURT_COUNT);
    match g.store.create_venue(venue) {
        Ok(created) => HttpResponse::Ok().json(created),
        Err(e) => error_response(&ScheduleError::from(e)),
    }
}

/// Venue players sorted for display (membership order, then name).
#[get("/api/venues/{id}/players")]
async fn api_list_players(state: AppState, req: HttpRequest, path: Path<VenuePath>) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| match s.refresh_players() {
        Ok(()) => HttpResponse::Ok().json(s.players()),
        Err(e) => error_response(&e),
    })
}

/// Create a global player and register them at the venue.
#[post("/api/venues/{id}/players")]
async fn api_add_player(
    state: AppState,
    req: HttpRequest,
    path: Path<VenuePath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        match s.add_player(&body.name) {
            Ok(player) => HttpResponse::Ok().json(player),
            Err(e) => error_response(&e),
        }
    })
}

/// Toggle a player's presence at the venue (organiser-level).
#[put("/api/venues/{id}/players/{player_id}/presence")]
async fn api_set_presence(
    state: AppState,
    req: HttpRequest,
    path: Path<VenuePlayerPath>,
    body: Json<PresenceBody>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        match s.set_presence(path.player_id, body.present) {
            Ok(()) => HttpResponse::Ok().json(s.players()),
            Err(e) => error_response(&e),
        }
    })
}

/// Remove a player from the venue; the global player persists.
#[delete("/api/venues/{id}/players/{player_id}")]
async fn api_remove_player(
    state: AppState,
    req: HttpRequest,
    path: Path<VenuePlayerPath>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        match s.remove_player(path.player_id) {
            Ok(()) => HttpResponse::Ok().json(s.players()),
            Err(e) => error_response(&e),
        }
    })
}

/// Today's matches through a view filter (all | in_progress | mine).
#[get("/api/venues/{id}/matches")]
async fn api_list_matches(
    state: AppState,
    req: HttpRequest,
    path: Path<VenuePath>,
    query: Query<MatchListQuery>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        s.filter = query.filter;
        match s.refresh_matches() {
            Ok(()) => HttpResponse::Ok().json(s.visible_matches()),
            Err(e) => error_response(&e),
        }
    })
}

/// Create a match after validating court and player availability.
#[post("/api/venues/{id}/matches")]
async fn api_create_match(
    state: AppState,
    req: HttpRequest,
    path: Path<VenuePath>,
    body: Json<CreateMatch>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        match s.create_match(*body) {
            Ok(created) => HttpResponse::Ok().json(created),
            Err(e) => error_response(&e),
        }
    })
}

/// Propose balanced teams from the free players; reserves nothing.
#[post("/api/venues/{id}/matches/suggest")]
async fn api_suggest_teams(
    state: AppState,
    req: HttpRequest,
    path: Path<VenuePath>,
    body: Json<SuggestBody>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        if let Err(e) = s.refresh_matches() {
            return error_response(&e);
        }
        match s.suggest(&mut rand::thread_rng(), body.mode) {
            Some(suggestion) => HttpResponse::Ok().json(suggestion),
            None => HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Not enough free players" })),
        }
    })
}

/// Finish every live match created today at the venue (organiser-level).
#[post("/api/venues/{id}/matches/finish-all")]
async fn api_finish_all(state: AppState, req: HttpRequest, path: Path<VenuePath>) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| match s.finish_all() {
        Ok(report) => {
            log::info!("Finished {} match(es) in bulk sweep", report.finished);
            let error = report.error.as_ref().map(|e| e.to_string());
            HttpResponse::Ok().json(serde_json::json!({
                "finished": report.finished,
                "error": error,
            }))
        }
        Err(e) => error_response(&e),
    })
}

/// Finish one match, with an optional score pair.
#[post("/api/venues/{id}/matches/{match_id}/finish")]
async fn api_finish_match(
    state: AppState,
    req: HttpRequest,
    path: Path<VenueMatchPath>,
    body: Json<FinishOutcome>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        match s.finish(path.match_id, *body) {
            Ok(finished) => HttpResponse::Ok().json(finished),
            Err(e) => error_response(&e),
        }
    })
}

/// Stop a match without a normal finish.
#[post("/api/venues/{id}/matches/{match_id}/abandon")]
async fn api_abandon_match(
    state: AppState,
    req: HttpRequest,
    path: Path<VenueMatchPath>,
) -> HttpResponse {
    with_session(&state, path.id, caller_from(&req), |s| {
        match s.abandon(path.match_id) {
            Ok(ended) => HttpResponse::Ok().json(ended),
            Err(e) => error_response(&e),
        }
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(AppStateInner {
        store: Arc::new(MemoryStore::new()),
        sessions: HashMap::new(),
    }));

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.sessions.len();
            g.sessions
                .retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.sessions.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_venues)
            .service(api_create_venue)
            .service(api_list_players)
            .service(api_add_player)
            .service(api_set_presence)
            .service(api_remove_player)
            .service(api_list_matches)
            .service(api_create_match)
            .service(api_suggest_teams)
            .service(api_finish_all)
            .service(api_abandon_match)
            .service(api_finish_match)
    })
    .bind(bind)?
    .run()
    .await
}
