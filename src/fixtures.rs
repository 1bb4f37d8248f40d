//! Throwaway SQLite seed files for tests.

use std::path::{Path, PathBuf};

use sea_orm::{
    ConnectionTrait, SqlxSqliteConnector, Statement,
    sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tempfile::TempDir;

const MOVIE_TABLE: &str = "CREATE TABLE movie (id INTEGER PRIMARY KEY, title TEXT, \
    description TEXT, trailer TEXT, year INTEGER, rating REAL, genre_id INTEGER, director_id INTEGER)";
const GENRE_TABLE: &str = "CREATE TABLE genre (id INTEGER PRIMARY KEY, name TEXT)";
const DIRECTOR_TABLE: &str = "CREATE TABLE director (id INTEGER PRIMARY KEY, name TEXT)";

#[derive(Default)]
pub struct SeedFile {
    movie_table: Option<String>,
    inserts: Vec<String>,
}

pub struct SeedFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl SeedFixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movie(
        mut self,
        id: i32,
        title: &str,
        year: i32,
        rating: f64,
        genre_id: i32,
        director_id: i32,
    ) -> Self {
        self.inserts.push(format!(
            "INSERT INTO movie VALUES ({id}, '{title}', 'About {title}', 'https://trailers.test/{id}', \
             {year}, {rating:.1}, {genre_id}, {director_id})"
        ));
        self
    }

    /// Replaces the default `movie` DDL, e.g. to change column affinities.
    pub fn movie_table(mut self, ddl: &str) -> Self {
        self.movie_table = Some(ddl.to_string());
        self
    }

    pub fn raw_movie(mut self, sql: &str) -> Self {
        self.inserts.push(sql.to_string());
        self
    }

    pub fn genre(mut self, id: i32, name: &str) -> Self {
        self.inserts.push(format!("INSERT INTO genre VALUES ({id}, '{name}')"));
        self
    }

    pub fn director(mut self, id: i32, name: &str) -> Self {
        self.inserts.push(format!("INSERT INTO director VALUES ({id}, '{name}')"));
        self
    }

    pub async fn write(self) -> SeedFixture {
        self.write_to("seed.db").await
    }

    pub async fn write_to(self, file_name: &str) -> SeedFixture {
        let schema = [
            self.movie_table.unwrap_or_else(|| MOVIE_TABLE.to_string()),
            GENRE_TABLE.to_string(),
            DIRECTOR_TABLE.to_string(),
        ];
        build(file_name, schema.into_iter().chain(self.inserts)).await
    }

    /// A valid SQLite file that lacks the catalog tables.
    pub async fn without_tables() -> SeedFixture {
        build("seed.db", std::iter::once("CREATE TABLE unrelated (id INTEGER)".to_string())).await
    }
}

async fn build(file_name: &str, statements: impl Iterator<Item = String>) -> SeedFixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);
    let opts = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(opts).await.unwrap();
    let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    for sql in statements {
        db.execute(Statement::from_string(db.get_database_backend(), sql)).await.unwrap();
    }
    db.close().await.unwrap();
    SeedFixture { _dir: dir, path }
}
