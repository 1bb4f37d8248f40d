use serde::{Deserialize, Deserializer};

/// Query string of `GET /movies/`. Empty values count as absent. Ids wider than
/// the store's i32 keys are accepted and simply match nothing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct MovieFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub director_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub genre_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DirectorInput {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
