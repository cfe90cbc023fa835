use crate::{
    domains::GameSegments,
    http::{codec, Document, IntoResponse, Response},
    render::{self, Banner},
    AppState,
};

/// What the connection should do after a line has been handled.
#[derive(Debug)]
pub enum Dispatch {
    /// The line was not a request line.
    Ignored,
    /// A recognized request that is deliberately left unanswered.
    NoContent,
    Respond(Response),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    HighScores,
    Favicon,
    Scores,
    Create,
    Home,
    Stylesheet,
    Playtime,
}

#[derive(Clone, Copy, Debug)]
pub enum Matcher {
    Prefix(&'static str),
    Exact(&'static str),
}

impl Matcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => path.starts_with(prefix),
            Matcher::Exact(expected) => path == *expected,
        }
    }
}

/// Evaluated top to bottom; the first match wins. Paths have their leading
/// `/` removed before matching.
pub const ROUTES: &[(Matcher, RouteKind)] = &[
    (Matcher::Prefix("highscore"), RouteKind::HighScores),
    (Matcher::Prefix("highscores"), RouteKind::HighScores),
    (Matcher::Prefix("favicon"), RouteKind::Favicon),
    (Matcher::Prefix("scores"), RouteKind::Scores),
    (Matcher::Prefix("create"), RouteKind::Create),
    (Matcher::Prefix("index"), RouteKind::Home),
    (Matcher::Exact(""), RouteKind::Home),
    (Matcher::Exact("/"), RouteKind::Home),
    (Matcher::Exact("index.html"), RouteKind::Home),
    (Matcher::Prefix("css/styles.css?v=1.0"), RouteKind::Stylesheet),
    (Matcher::Prefix("fancy"), RouteKind::Playtime),
];

pub fn resolve(path: &str) -> Option<RouteKind> {
    ROUTES
        .iter()
        .find(|(matcher, _)| matcher.matches(path))
        .map(|(_, kind)| *kind)
}

/// A resolved route with its parameters.
#[derive(Clone, Copy, Debug)]
pub enum Route<'a> {
    HighScores,
    Favicon,
    PlayerHistory { name: &'a str },
    RecordGame(GameSegments<'a>),
    Create,
    Home,
    Stylesheet,
    Playtime,
    NotFound,
}

impl<'a> Route<'a> {
    pub fn from_path(path: &'a str) -> Self {
        match resolve(path) {
            Some(RouteKind::HighScores) => Route::HighScores,
            Some(RouteKind::Favicon) => Route::Favicon,
            Some(RouteKind::Scores) => scores_route(path),
            Some(RouteKind::Create) => Route::Create,
            Some(RouteKind::Home) => Route::Home,
            Some(RouteKind::Stylesheet) => Route::Stylesheet,
            Some(RouteKind::Playtime) => Route::Playtime,
            None => Route::NotFound,
        }
    }
}

/// `scores/{name}` reads, `scores/{name}/{mass}/{rank}/{start}/{end}` writes.
fn scores_route(path: &str) -> Route<'_> {
    let segments: Vec<&str> = path.split('/').collect();

    match segments[..] {
        [_, "", ..] | [_] => Route::NotFound,
        [_, name, max_mass, max_rank, start_ms, end_ms] => Route::RecordGame(GameSegments {
            name,
            max_mass,
            max_rank,
            start_ms,
            end_ms,
        }),
        [_, name, ..] => Route::PlayerHistory { name },
        [] => Route::NotFound,
    }
}

pub async fn route_request(line: String, app_state: AppState) -> Dispatch {
    let Some(request) = codec::request_line(&line) else {
        return Dispatch::Ignored;
    };

    let route = Route::from_path(&request.path);
    tracing::info!(
        target: "requests",
        method = %request.method,
        path = %request.path,
        ?route,
        r#""{} /{}""#, request.method, request.path
    );

    let document = match route {
        Route::Favicon => return Dispatch::NoContent,
        Route::HighScores => render::highscores(&app_state.aggregator.highscores().await, None),
        Route::PlayerHistory { name } => player_scores(&app_state, name, None).await,
        Route::RecordGame(segments) => record_game(&app_state, segments).await,
        Route::Create => create_table(&app_state).await,
        Route::Home => render::home(),
        Route::Stylesheet => render::stylesheet(),
        Route::Playtime => render::playtime(&app_state.aggregator.total_playtime().await),
        Route::NotFound => render::not_found(),
    };
    tracing::trace!(body = %document.body, "rendered document");

    Dispatch::Respond(document.into_response())
}

async fn player_scores(
    app_state: &AppState,
    name: &str,
    info: Option<&Banner>,
) -> Document {
    let rows = app_state.aggregator.player_history(name).await;
    render::player_scores(name, &rows, info)
}

async fn record_game(app_state: &AppState, segments: GameSegments<'_>) -> Document {
    let game = match segments.parse() {
        Ok(game) => game,
        Err(err) => {
            tracing::debug!(%err, "rejected game segments");
            return render::bad_request(&err);
        }
    };

    let name = game.player_name.clone();
    let info = if app_state.aggregator.record_game(&game).await {
        Banner::GameSaved { name }
    } else {
        Banner::GameNotSaved { name }
    };

    player_scores(app_state, &game.player_name, Some(&info)).await
}

async fn create_table(app_state: &AppState) -> Document {
    let status = app_state.aggregator.ensure_schema().await;
    let info = if status.already_existed {
        Banner::TableExisted
    } else {
        Banner::TableCreated
    };

    render::highscores(&app_state.aggregator.highscores().await, Some(&info))
}
