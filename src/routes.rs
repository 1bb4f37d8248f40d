use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Redirect},
    routing::{any, get, post},
};
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    models::{DirectorInput, GenreInput, MovieFilter},
    response::PrettyJson,
    serializers::{DirectorView, GenreView, MovieView, serialize_many},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies", any(add_trailing_slash))
        .route("/movies/", get(list_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/directors", any(add_trailing_slash))
        .route("/directors/", post(create_director))
        .route(
            "/directors/{id}",
            get(get_director).put(update_director).delete(delete_director),
        )
        .route("/genres", any(add_trailing_slash))
        .route("/genres/", post(create_genre))
        .route("/genres/{id}", get(get_genre).put(update_genre).delete(delete_genre))
        .with_state(state)
}

/// Collection roots live under a trailing slash; 308 keeps the method and body.
async fn add_trailing_slash(uri: Uri) -> Redirect {
    let target = match uri.query() {
        Some(query) => format!("{}/?{query}", uri.path()),
        None => format!("{}/", uri.path()),
    };
    Redirect::permanent(&target)
}

/// Ids arrive as i64 so that oversized numbers are absent records, not bad input.
fn record_id(entity: &'static str, raw: i64) -> AppResult<i32> {
    i32::try_from(raw).map_err(|_| AppError::not_found(entity, raw))
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<MovieFilter>,
) -> AppResult<PrettyJson<Vec<MovieView>>> {
    let movies = state.catalog.list_movies(&filter).await?;
    debug!(?filter, count = movies.len(), "listed movies");
    Ok(PrettyJson(serialize_many(movies)))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
) -> AppResult<PrettyJson<MovieView>> {
    let id = record_id("movie", raw)?;
    let movie = state.catalog.get_movie(id).await?.ok_or(AppError::not_found("movie", raw))?;
    Ok(PrettyJson(movie.into()))
}

pub async fn create_director(
    State(state): State<Arc<AppState>>,
    AppJson(input): AppJson<DirectorInput>,
) -> AppResult<impl IntoResponse> {
    let director = state.catalog.create_director(input.name).await?;
    debug!(id = director.id, "created director");
    Ok((StatusCode::OK, [(header::LOCATION, format!("/directors/{}", director.id))]))
}

pub async fn get_director(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
) -> AppResult<PrettyJson<DirectorView>> {
    let id = record_id("director", raw)?;
    let director =
        state.catalog.get_director(id).await?.ok_or(AppError::not_found("director", raw))?;
    Ok(PrettyJson(director.into()))
}

pub async fn update_director(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
    AppJson(input): AppJson<DirectorInput>,
) -> AppResult<StatusCode> {
    let id = record_id("director", raw)?;
    state
        .catalog
        .update_director(id, input.name)
        .await?
        .ok_or(AppError::not_found("director", raw))?;
    debug!(id, "updated director");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_director(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
) -> AppResult<StatusCode> {
    let id = record_id("director", raw)?;
    if !state.catalog.delete_director(id).await? {
        return Err(AppError::not_found("director", raw));
    }
    debug!(id, "deleted director");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    AppJson(input): AppJson<GenreInput>,
) -> AppResult<impl IntoResponse> {
    let genre = state.catalog.create_genre(input.name).await?;
    debug!(id = genre.id, "created genre");
    Ok((StatusCode::OK, [(header::LOCATION, format!("/genres/{}", genre.id))]))
}

pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
) -> AppResult<PrettyJson<GenreView>> {
    let id = record_id("genre", raw)?;
    let genre = state.catalog.get_genre(id).await?.ok_or(AppError::not_found("genre", raw))?;
    Ok(PrettyJson(genre.into()))
}

pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
    AppJson(input): AppJson<GenreInput>,
) -> AppResult<StatusCode> {
    let id = record_id("genre", raw)?;
    state.catalog.update_genre(id, input.name).await?.ok_or(AppError::not_found("genre", raw))?;
    debug!(id, "updated genre");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    AppPath(raw): AppPath<i64>,
) -> AppResult<StatusCode> {
    let id = record_id("genre", raw)?;
    if !state.catalog.delete_genre(id).await? {
        return Err(AppError::not_found("genre", raw));
    }
    debug!(id, "deleted genre");
    Ok(StatusCode::NO_CONTENT)
}
