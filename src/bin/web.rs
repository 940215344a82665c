//! Single binary JSON API over an in-memory tournament store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with `tournament.toml` or env
//! (e.g. APP__SERVER__PORT=9000, APP__TOURNAMENT__MATCHES_PER_DAY=3).

use actix_web::{
    delete, get, post, put,
    web::{Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use football_tournament_web::logic::{BEST_KEEPERS_LIMIT, BEST_PLAYERS_LIMIT, TOP_SCORERS_LIMIT};
use football_tournament_web::{
    CardId, GoalId, KnockoutResult, KnockoutRound, MatchFilter, MatchId, MatchResult, MatchStatus, MemoryStore,
    NewCard, NewGoal, NewPlayer, Settings, TeamId, TournamentError, TournamentService,
};
use serde::{Deserialize, Serialize};

type AppState = Data<TournamentService<MemoryStore>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    group_id: String,
}

#[derive(Deserialize)]
struct GroupQuery {
    group: Option<String>,
}

#[derive(Deserialize, Default)]
struct GenerateScheduleBody {
    start_date: Option<NaiveDate>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct MatchQuery {
    status: Option<MatchStatus>,
    round: Option<KnockoutRound>,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

/// Path segment: team id (e.g. /api/teams/{id})
#[derive(Deserialize)]
struct TeamPath {
    id: TeamId,
}

/// Path segment: match id (e.g. /api/matches/{id}/result)
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct GoalPath {
    id: GoalId,
}

#[derive(Deserialize)]
struct CardPath {
    id: CardId,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::MatchNotFound(_)
        | TournamentError::TeamNotFound(_)
        | TournamentError::GoalNotFound(_)
        | TournamentError::CardNotFound(_) => HttpResponse::NotFound().json(body),
        TournamentError::DuplicateTeamName(_) | TournamentError::KnockoutDraw(_) => HttpResponse::Conflict().json(body),
        TournamentError::InfeasibleSchedule { .. } => HttpResponse::UnprocessableEntity().json(body),
        TournamentError::Store(_) => {
            log::error!("Store failure: {}", e);
            HttpResponse::ServiceUnavailable().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "football-tournament-web",
    })
}

/// List teams, optionally one group (?group=A).
#[get("/api/teams")]
async fn api_list_teams(state: AppState, query: Query<GroupQuery>) -> HttpResponse {
    respond(state.list_teams(query.group.as_deref()).await)
}

/// Add a team (names unique, case-insensitive).
#[post("/api/teams")]
async fn api_add_team(state: AppState, body: Json<AddTeamBody>) -> HttpResponse {
    respond(state.add_team(&body.name, &body.group_id).await)
}

#[delete("/api/teams/{id}")]
async fn api_remove_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    respond(state.remove_team(path.id).await)
}

#[post("/api/teams/{id}/players")]
async fn api_add_player(state: AppState, path: Path<TeamPath>, body: Json<NewPlayer>) -> HttpResponse {
    respond(state.add_player(path.id, body.into_inner()).await)
}

/// Import teams from a CSV body: team,group,player,number,position.
#[post("/api/teams/import")]
async fn api_import_roster(state: AppState, body: Bytes) -> HttpResponse {
    respond(state.import_roster(body.as_ref()).await)
}

/// Generate the group schedule. Replaces every existing match.
#[post("/api/schedule/generate")]
async fn api_generate_schedule(state: AppState, body: Option<Json<GenerateScheduleBody>>) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    respond(state.generate_schedule(body.start_date, body.seed).await)
}

/// List matches (?status=completed&round=QUARTER).
#[get("/api/matches")]
async fn api_list_matches(state: AppState, query: Query<MatchQuery>) -> HttpResponse {
    let filter = MatchFilter {
        status: query.status,
        round: query.round,
        ..MatchFilter::default()
    };
    respond(state.list_matches(&filter).await)
}

/// Enter a group match score; completing it recalculates standings.
#[put("/api/matches/{id}/result")]
async fn api_record_result(state: AppState, path: Path<MatchPath>, body: Json<MatchResult>) -> HttpResponse {
    respond(state.record_result(path.id, body.into_inner()).await)
}

#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    respond(state.standings().await)
}

#[post("/api/standings/recalculate")]
async fn api_recalculate_standings(state: AppState) -> HttpResponse {
    respond(state.recalculate_standings().await)
}

#[get("/api/knockout")]
async fn api_knockout(state: AppState) -> HttpResponse {
    respond(state.knockout_matches().await)
}

/// Create the empty bracket (4 QF, 2 SF, 1 F).
#[post("/api/knockout/setup")]
async fn api_knockout_setup(state: AppState) -> HttpResponse {
    respond(state.setup_knockout_stage().await)
}

/// Seed quarterfinals from group standings.
#[post("/api/knockout/seed")]
async fn api_knockout_seed(state: AppState) -> HttpResponse {
    respond(state.seed_knockout_stage().await)
}

/// Enter a knockout result and advance the winner.
#[put("/api/knockout/matches/{id}/result")]
async fn api_knockout_result(state: AppState, path: Path<MatchPath>, body: Json<KnockoutResult>) -> HttpResponse {
    respond(state.record_knockout_result(path.id, body.into_inner()).await)
}

#[delete("/api/knockout")]
async fn api_knockout_delete(state: AppState) -> HttpResponse {
    respond(
        state
            .delete_knockout_stage()
            .await
            .map(|deleted| serde_json::json!({ "deleted": deleted })),
    )
}

#[get("/api/goals")]
async fn api_list_goals(state: AppState) -> HttpResponse {
    respond(state.list_goals().await)
}

#[post("/api/goals")]
async fn api_add_goal(state: AppState, body: Json<NewGoal>) -> HttpResponse {
    respond(state.add_goal(body.into_inner()).await.map(|id| serde_json::json!({ "id": id })))
}

#[delete("/api/goals/{id}")]
async fn api_delete_goal(state: AppState, path: Path<GoalPath>) -> HttpResponse {
    respond(state.delete_goal(path.id).await)
}

#[get("/api/cards")]
async fn api_list_cards(state: AppState) -> HttpResponse {
    respond(state.list_cards().await)
}

#[post("/api/cards")]
async fn api_add_card(state: AppState, body: Json<NewCard>) -> HttpResponse {
    respond(state.add_card(body.into_inner()).await.map(|id| serde_json::json!({ "id": id })))
}

#[delete("/api/cards/{id}")]
async fn api_delete_card(state: AppState, path: Path<CardPath>) -> HttpResponse {
    respond(state.delete_card(path.id).await)
}

#[get("/api/awards/top-scorers")]
async fn api_top_scorers(state: AppState, query: Query<LimitQuery>) -> HttpResponse {
    respond(state.top_scorers(query.limit.unwrap_or(TOP_SCORERS_LIMIT)).await)
}

#[get("/api/awards/best-players")]
async fn api_best_players(state: AppState, query: Query<LimitQuery>) -> HttpResponse {
    respond(state.best_players(query.limit.unwrap_or(BEST_PLAYERS_LIMIT)).await)
}

/// Goalkeepers by clean sheets, results and cards (?limit=, default 5).
#[get("/api/awards/best-keepers")]
async fn api_best_keepers(state: AppState, query: Query<LimitQuery>) -> HttpResponse {
    respond(state.best_keepers(query.limit.unwrap_or(BEST_KEEPERS_LIMIT)).await)
}

#[get("/api/discipline")]
async fn api_discipline(state: AppState) -> HttpResponse {
    respond(state.discipline().await)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let bind = (settings.server.host.clone(), settings.server.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(TournamentService::new(MemoryStore::new(), settings.tournament));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_list_teams)
            .service(api_import_roster)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_add_player)
            .service(api_generate_schedule)
            .service(api_list_matches)
            .service(api_record_result)
            .service(api_standings)
            .service(api_recalculate_standings)
            .service(api_knockout)
            .service(api_knockout_setup)
            .service(api_knockout_seed)
            .service(api_knockout_result)
            .service(api_knockout_delete)
            .service(api_list_goals)
            .service(api_add_goal)
            .service(api_delete_goal)
            .service(api_list_cards)
            .service(api_add_card)
            .service(api_delete_card)
            .service(api_top_scorers)
            .service(api_best_players)
            .service(api_best_keepers)
            .service(api_discipline)
    })
    .bind(bind)?
    .run()
    .await
}
