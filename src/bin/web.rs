//! Single binary web server exposing the bracket engine as a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT. ROSTER_CSV loads registrations at startup,
//! RNG_SEED makes draws reproducible.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{Local, NaiveDate};
use pingpong_bracket::{
    roster::import_roster, BracketEngine, BracketError, EngineConfig, ErrorKind, LogSink, MatchId,
    MemoryStore, TournamentId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

type Engine = BracketEngine<MemoryStore, LogSink>;
type AppState = Data<Engine>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct StartMatchBody {
    table_number: u32,
}

#[derive(Deserialize)]
struct ScoreBody {
    score1: Option<u32>,
    score2: Option<u32>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct TablePath {
    table: u32,
}

#[derive(Deserialize)]
struct DatePath {
    date: NaiveDate,
}

/// Map an engine error to a JSON error response.
fn error_response(e: BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Internal => {
            log::error!("internal error: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "internal error" }))
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, BracketError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pingpong-bracket",
    })
}

/// Generate preliminary matches (admin). Safe to call repeatedly.
#[post("/api/tournaments/{id}/preliminaries")]
async fn api_create_preliminaries(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .create_preliminary_matches(path.id)
            .map(|count| serde_json::json!({ "match_count": count })),
    )
}

/// Generate the main bracket from preliminary qualifiers (admin).
#[post("/api/tournaments/{id}/final-bracket")]
async fn api_create_final_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.create_final_bracket(path.id))
}

#[get("/api/tournaments/{id}/final-bracket/generated")]
async fn api_final_bracket_generated(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .is_final_bracket_generated(path.id)
            .map(|generated| serde_json::json!({ "generated": generated })),
    )
}

/// Bracket in renderer format: { teams, results }.
#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.bracket_data(path.id))
}

#[get("/api/tournaments/{id}/matches")]
async fn api_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.matches_for(path.id))
}

#[get("/api/tournaments/{id}/groups")]
async fn api_groups(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.group_overview(path.id))
}

#[get("/api/tournaments/{id}/champion")]
async fn api_champion(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .champion(path.id)
            .map(|champion| serde_json::json!({ "champion": champion })),
    )
}

/// Put a scheduled match on a table.
#[put("/api/matches/{id}/start")]
async fn api_start_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<StartMatchBody>,
) -> HttpResponse {
    respond(state.start_match(path.id, body.table_number))
}

/// Record the final score of a match in progress.
#[put("/api/matches/{id}/complete")]
async fn api_complete_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    respond(state.complete_match(path.id, body.score1, body.score2))
}

/// Correct the score of a completed match (admin).
#[put("/api/matches/{id}/result")]
async fn api_edit_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    respond(state.edit_match(path.id, body.score1, body.score2))
}

#[get("/api/tables/{table}")]
async fn api_table(state: AppState, path: Path<TablePath>) -> HttpResponse {
    respond(state.match_on_table(path.table))
}

/// Matches scheduled on a date (YYYY-MM-DD) in tournaments in progress.
#[get("/api/schedule/{date}")]
async fn api_schedule(state: AppState, path: Path<DatePath>) -> HttpResponse {
    respond(state.matches_on(path.date))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn build_engine() -> std::io::Result<Engine> {
    let store = MemoryStore::new();
    if let Ok(path) = std::env::var("ROSTER_CSV") {
        let file = std::fs::File::open(&path)?;
        let start = Local::now().naive_local();
        import_roster(&store, file, start)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        log::info!("Loaded roster from {}", path);
    }

    let config = EngineConfig::from_env();
    let seed = std::env::var("RNG_SEED").ok().and_then(|s| s.parse::<u64>().ok());
    Ok(match seed {
        Some(seed) => {
            log::info!("Using fixed draw seed {}", seed);
            BracketEngine::with_rng(store, LogSink, config, StdRng::seed_from_u64(seed))
        }
        None => BracketEngine::new(store, LogSink, config),
    })
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

    let state = Data::new(build_engine()?);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_preliminaries)
            .service(api_create_final_bracket)
            .service(api_final_bracket_generated)
            .service(api_bracket)
            .service(api_matches)
            .service(api_groups)
            .service(api_champion)
            .service(api_start_match)
            .service(api_complete_match)
            .service(api_edit_match)
            .service(api_table)
            .service(api_schedule)
    })
    .bind(bind)?
    .run()
    .await
}
