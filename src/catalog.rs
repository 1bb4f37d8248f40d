use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QueryTrait, Set, TransactionTrait,
};

use crate::{
    entities::{director, genre, movie},
    error::AppResult,
    models::MovieFilter,
};

/// Seed-side shape of a movie row; the id is always generated by the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewMovie {
    pub title: Option<String>,
    pub description: Option<String>,
    pub trailer: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genre_id: Option<i32>,
    pub director_id: Option<i32>,
}

/// Handle to the live entity store. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find()
            .apply_if(filter.director_id, |q, id| q.filter(movie::Column::DirectorId.eq(id)))
            .apply_if(filter.genre_id, |q, id| q.filter(movie::Column::GenreId.eq(id)))
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    pub async fn get_movie(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Inserts movies in order inside one transaction, returning how many were stored.
    pub async fn insert_movies(&self, rows: Vec<NewMovie>) -> AppResult<usize> {
        let txn = self.db.begin().await?;
        let count = rows.len();
        for row in rows {
            let model = movie::ActiveModel {
                title: Set(row.title),
                description: Set(row.description),
                trailer: Set(row.trailer),
                year: Set(row.year),
                rating: Set(row.rating),
                genre_id: Set(row.genre_id),
                director_id: Set(row.director_id),
                ..Default::default()
            };
            model.insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(count)
    }

    pub async fn insert_genres(&self, names: Vec<Option<String>>) -> AppResult<usize> {
        let txn = self.db.begin().await?;
        let count = names.len();
        for name in names {
            genre::ActiveModel { name: Set(name), ..Default::default() }.insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(count)
    }

    pub async fn insert_directors(&self, names: Vec<Option<String>>) -> AppResult<usize> {
        let txn = self.db.begin().await?;
        let count = names.len();
        for name in names {
            director::ActiveModel { name: Set(name), ..Default::default() }.insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(count)
    }

    pub async fn create_director(&self, name: String) -> AppResult<director::Model> {
        let model = director::ActiveModel { name: Set(Some(name)), ..Default::default() };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_director(&self, id: i32) -> AppResult<Option<director::Model>> {
        Ok(director::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Returns `None` when no director has this id.
    pub async fn update_director(
        &self,
        id: i32,
        name: String,
    ) -> AppResult<Option<director::Model>> {
        let txn = self.db.begin().await?;
        let Some(existing) = director::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let mut model = existing.into_active_model();
        model.name = Set(Some(name));
        let updated = model.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(updated))
    }

    pub async fn delete_director(&self, id: i32) -> AppResult<bool> {
        let res = director::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn create_genre(&self, name: String) -> AppResult<genre::Model> {
        let model = genre::ActiveModel { name: Set(Some(name)), ..Default::default() };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Option<genre::Model>> {
        Ok(genre::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn update_genre(&self, id: i32, name: String) -> AppResult<Option<genre::Model>> {
        let txn = self.db.begin().await?;
        let Some(existing) = genre::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let mut model = existing.into_active_model();
        model.name = Set(Some(name));
        let updated = model.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(updated))
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<bool> {
        let res = genre::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
