use sea_orm::entity::prelude::*;

/// A saved review verdict. The review text itself is classified and
/// discarded; only the movie title, label and confidence are stored.
///
/// `owner` references `users.username` by convention, not by foreign key,
/// and update/delete do not check it. Any caller holding a valid id can
/// mutate any row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub owner: String,

    /// Minute-precision timestamp, "%Y-%m-%d %H:%M"
    pub created_at: String,

    pub movie: String,

    /// "POSITIVE" or "NEGATIVE"
    pub sentiment: String,

    /// Percentage string with two decimals, e.g. "87.32%"
    pub confidence: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
