use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use serde::Serialize;

use crate::entities::{prelude::*, reviews};

/// A stored review row as exposed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i32,
    pub owner: String,
    pub created_at: String,
    pub movie: String,
    pub sentiment: String,
    pub confidence: String,
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            owner: model.owner,
            created_at: model.created_at,
            movie: model.movie,
            sentiment: model.sentiment,
            confidence: model.confidence,
        }
    }
}

/// Repository for review rows.
pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a review and return its id. Ids are issued by the engine's
    /// autoincrement, strictly increasing for the lifetime of the store.
    pub async fn insert(
        &self,
        owner: &str,
        movie: &str,
        sentiment: &str,
        confidence: &str,
        created_at: &str,
    ) -> Result<i32> {
        let active_model = reviews::ActiveModel {
            owner: Set(owner.to_string()),
            created_at: Set(created_at.to_string()),
            movie: Set(movie.to_string()),
            sentiment: Set(sentiment.to_string()),
            confidence: Set(confidence.to_string()),
            ..Default::default()
        };

        let res = Reviews::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert review")?;

        Ok(res.last_insert_id)
    }

    /// All reviews for one owner, most recent (highest id) first.
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Review>> {
        let rows = Reviews::find()
            .filter(reviews::Column::Owner.eq(owner))
            .order_by_desc(reviews::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list reviews")?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Overwrite movie/sentiment/confidence for a row. Succeeds silently
    /// when no row matches; there is no existence or ownership check.
    pub async fn update(
        &self,
        id: i32,
        movie: &str,
        sentiment: &str,
        confidence: &str,
    ) -> Result<()> {
        Reviews::update_many()
            .col_expr(reviews::Column::Movie, Expr::value(movie))
            .col_expr(reviews::Column::Sentiment, Expr::value(sentiment))
            .col_expr(reviews::Column::Confidence, Expr::value(confidence))
            .filter(reviews::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update review")?;

        Ok(())
    }

    /// Delete by id. Silent no-op when no row matches.
    pub async fn delete(&self, id: i32) -> Result<()> {
        Reviews::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete review")?;

        Ok(())
    }
}
