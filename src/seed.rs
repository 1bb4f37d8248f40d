use std::path::{Path, PathBuf};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, QueryResult, SqlxSqliteConnector, Statement,
    sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, NewMovie},
    error::SeedError,
};

const MOVIE_TABLE: &str = "movie";
const GENRE_TABLE: &str = "genre";
const DIRECTOR_TABLE: &str = "director";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub movies: usize,
    pub genres: usize,
    pub directors: usize,
}

struct SeedRows {
    movies: Vec<NewMovie>,
    genres: Vec<Option<String>>,
    directors: Vec<Option<String>>,
}

/// Handle on the SQLite file the store is hydrated from. Nothing is written to it.
/// `load` consumes it, so a source can feed the store only once.
pub struct SeedSource {
    path: PathBuf,
    db: DatabaseConnection,
}

impl SeedSource {
    pub async fn open(path: &Path) -> Result<Self, SeedError> {
        if !path.is_file() {
            return Err(SeedError::Missing(path.to_path_buf()));
        }
        // A filename, not a URL: `?` and `#` in the path stay part of it.
        let opts = SqliteConnectOptions::new().filename(path).create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|source| SeedError::Unreadable { path: path.to_path_buf(), source })?;
        Ok(Self { path: path.to_path_buf(), db: SqlxSqliteConnector::from_sqlx_sqlite_pool(pool) })
    }

    /// Copies movies, genres and directors into the store, in that order.
    /// Source ids are ignored; the store assigns its own. The source is closed
    /// once its rows are read, whether or not reading succeeded.
    pub async fn load(self, catalog: &Catalog) -> Result<SeedSummary, SeedError> {
        debug!(path = %self.path.display(), "reading seed source");
        let rows = self.read().await;

        let SeedSource { path, db } = self;
        if let Err(err) = db.close().await {
            warn!(path = %path.display(), error = %err, "failed to close seed source");
        }
        let rows = rows?;

        let summary = SeedSummary {
            movies: catalog.insert_movies(rows.movies).await?,
            genres: catalog.insert_genres(rows.genres).await?,
            directors: catalog.insert_directors(rows.directors).await?,
        };

        info!(
            path = %path.display(),
            movies = summary.movies,
            genres = summary.genres,
            directors = summary.directors,
            "store seeded"
        );
        Ok(summary)
    }

    async fn read(&self) -> Result<SeedRows, SeedError> {
        let movies = self
            .rows(MOVIE_TABLE)
            .await?
            .iter()
            .enumerate()
            .map(|(index, row)| {
                movie_from_row(row).map_err(|source| row_error(MOVIE_TABLE, index, source))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let genres = self.names(GENRE_TABLE).await?;
        let directors = self.names(DIRECTOR_TABLE).await?;
        Ok(SeedRows { movies, genres, directors })
    }

    async fn rows(&self, table: &'static str) -> Result<Vec<QueryResult>, SeedError> {
        let stmt = Statement::from_string(self.db.get_database_backend(), format!("SELECT * FROM {table}"));
        self.db.query_all(stmt).await.map_err(|source| SeedError::Query { table, source })
    }

    async fn names(&self, table: &'static str) -> Result<Vec<Option<String>>, SeedError> {
        self.rows(table)
            .await?
            .iter()
            .enumerate()
            .map(|(index, row)| {
                row.try_get_by_index::<Option<String>>(1).map_err(|source| row_error(table, index, source))
            })
            .collect()
    }
}

// movie columns: id, title, description, trailer, year, rating, genre_id, director_id
fn movie_from_row(row: &QueryResult) -> Result<NewMovie, DbErr> {
    Ok(NewMovie {
        title: row.try_get_by_index(1)?,
        description: row.try_get_by_index(2)?,
        trailer: row.try_get_by_index(3)?,
        year: int_column(row, 4)?,
        rating: float_column(row, 5)?,
        genre_id: int_column(row, 6)?,
        director_id: int_column(row, 7)?,
    })
}

// SQLite stores by value, not declared type: a NUMERIC or untyped column hands
// back 8.0 as INTEGER 8 and 1995 may come back as REAL 1995.0.
fn int_column(row: &QueryResult, index: usize) -> Result<Option<i32>, DbErr> {
    if let Ok(value) = row.try_get_by_index::<Option<i32>>(index) {
        return Ok(value);
    }
    match row.try_get_by_index::<Option<f64>>(index)? {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) => {
            Ok(Some(v as i32))
        }
        Some(v) => Err(DbErr::Type(format!("column {index} holds {v}, expected an integer"))),
    }
}

fn float_column(row: &QueryResult, index: usize) -> Result<Option<f64>, DbErr> {
    if let Ok(value) = row.try_get_by_index::<Option<f64>>(index) {
        return Ok(value);
    }
    Ok(row.try_get_by_index::<Option<i64>>(index)?.map(|v| v as f64))
}

fn row_error(table: &'static str, index: usize, source: DbErr) -> SeedError {
    SeedError::Row { table, index, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, fixtures::SeedFile, models::MovieFilter};

    async fn empty_catalog() -> Catalog {
        Catalog::new(db::connect_and_migrate().await.unwrap())
    }

    #[tokio::test]
    async fn copies_every_table_in_order() {
        let seed = SeedFile::new()
            .movie(10, "Солярис", 1972, 8.0, 2, 7)
            .movie(11, "Stalker", 1979, 8.1, 2, 7)
            .movie(12, "Heat", 1995, 8.3, 1, 3)
            .genre(1, "Crime")
            .genre(2, "Sci-Fi")
            .director(3, "Michael Mann")
            .director(7, "Andrei Tarkovsky")
            .write()
            .await;
        let catalog = empty_catalog().await;

        let summary = SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap();
        assert_eq!(summary, SeedSummary { movies: 3, genres: 2, directors: 2 });

        let movies = catalog.list_movies(&MovieFilter::default()).await.unwrap();
        let titles: Vec<_> = movies.iter().filter_map(|m| m.title.as_deref()).collect();
        assert_eq!(titles, vec!["Солярис", "Stalker", "Heat"]);
        assert_eq!(movies[0].year, Some(1972));
        assert_eq!(movies[2].rating, Some(8.3));
        assert_eq!(movies[0].director_id, Some(7));
    }

    #[tokio::test]
    async fn source_ids_are_not_reused() {
        let seed = SeedFile::new().movie(10, "Heat", 1995, 8.3, 1, 3).director(3, "Michael Mann").write().await;
        let catalog = empty_catalog().await;

        SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap();

        assert_eq!(catalog.list_movies(&MovieFilter::default()).await.unwrap()[0].id, 1);
        assert!(catalog.get_director(3).await.unwrap().is_none());
        assert_eq!(
            catalog.get_director(1).await.unwrap().and_then(|d| d.name),
            Some("Michael Mann".to_string())
        );
    }

    #[tokio::test]
    async fn keeps_null_columns() {
        let seed = SeedFile::new().raw_movie("INSERT INTO movie (id, title) VALUES (1, 'Untitled')").write().await;
        let catalog = empty_catalog().await;

        SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap();

        let movie = catalog.get_movie(1).await.unwrap().unwrap();
        assert_eq!(movie.title.as_deref(), Some("Untitled"));
        assert_eq!(movie.genre_id, None);
        assert_eq!(movie.rating, None);
    }

    #[tokio::test]
    async fn missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = SeedSource::open(&dir.path().join("absent.db")).await.err().unwrap();
        assert!(matches!(err, SeedError::Missing(_)));
    }

    #[tokio::test]
    async fn missing_table_is_fatal() {
        let seed = SeedFile::without_tables().await;
        let catalog = empty_catalog().await;

        let err = SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap_err();
        assert!(matches!(err, SeedError::Query { table: "movie", .. }));
    }

    #[tokio::test]
    async fn coerces_numbers_stored_with_another_affinity() {
        let seed = SeedFile::new()
            .movie_table(
                "CREATE TABLE movie (id INTEGER PRIMARY KEY, title TEXT, description TEXT, \
                 trailer TEXT, year NUMERIC, rating NUMERIC, genre_id, director_id)",
            )
            .raw_movie("INSERT INTO movie VALUES (1, 'Heat', NULL, NULL, 1995, 8.0, 1.0, 2)")
            .write()
            .await;
        let catalog = empty_catalog().await;

        SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap();

        let movie = catalog.get_movie(1).await.unwrap().unwrap();
        assert_eq!(movie.year, Some(1995));
        assert_eq!(movie.rating, Some(8.0));
        assert_eq!(movie.genre_id, Some(1));
        assert_eq!(movie.director_id, Some(2));
    }

    #[tokio::test]
    async fn undecodable_row_is_fatal() {
        let seed = SeedFile::new()
            .movie_table(
                "CREATE TABLE movie (id INTEGER PRIMARY KEY, title TEXT, description TEXT, \
                 trailer TEXT, year, rating REAL, genre_id INTEGER, director_id INTEGER)",
            )
            .raw_movie("INSERT INTO movie (id, title, year) VALUES (1, 'Heat', 'abc')")
            .write()
            .await;
        let catalog = empty_catalog().await;

        let err = SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap_err();
        assert!(matches!(err, SeedError::Row { table: "movie", index: 0, .. }), "{err}");
        assert!(catalog.list_movies(&MovieFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn opens_paths_with_url_characters() {
        let seed = SeedFile::new().genre(1, "Noir").write_to("seed?v=1#draft.db").await;
        let catalog = empty_catalog().await;

        let summary = SeedSource::open(seed.path()).await.unwrap().load(&catalog).await.unwrap();
        assert_eq!(summary.genres, 1);
    }

    #[tokio::test]
    async fn closes_the_source_after_loading() {
        let seed = SeedFile::new().director(1, "Michael Mann").write().await;
        let catalog = empty_catalog().await;
        let source = SeedSource::open(seed.path()).await.unwrap();
        let handle = source.db.clone();
        handle.ping().await.unwrap();

        source.load(&catalog).await.unwrap();
        assert!(handle.ping().await.is_err());
    }
}
