//! Transport views. Each struct is the complete allow-list of fields emitted
//! for its entity; anything not listed here never leaves the service.

use serde::Serialize;

use crate::entities::{director, genre, movie};

#[derive(Clone, Debug, Serialize)]
pub struct MovieView {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub trailer: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genre_id: Option<i32>,
    pub director_id: Option<i32>,
}

impl From<movie::Model> for MovieView {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            trailer: m.trailer,
            year: m.year,
            rating: m.rating,
            genre_id: m.genre_id,
            director_id: m.director_id,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DirectorView {
    pub id: i32,
    pub name: Option<String>,
}

impl From<director::Model> for DirectorView {
    fn from(d: director::Model) -> Self {
        Self { id: d.id, name: d.name }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GenreView {
    pub id: i32,
    pub name: Option<String>,
}

impl From<genre::Model> for GenreView {
    fn from(g: genre::Model) -> Self {
        Self { id: g.id, name: g.name }
    }
}

pub fn serialize_many<M, V>(models: Vec<M>) -> Vec<V>
where
    V: From<M>,
{
    models.into_iter().map(V::from).collect()
}
