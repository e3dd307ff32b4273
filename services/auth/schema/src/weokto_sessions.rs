use sea_orm::entity::prelude::*;

/// One issued WEOKTO login. Authoritative over the session JWT: a token whose
/// row is gone or expired is not a session.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "weokto_sessions")]
pub struct Model {
    /// Session id, embedded in the JWT as `sid`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Signed session token, stored verbatim.
    #[sea_orm(unique)]
    pub token: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::weokto_users::Entity",
        from = "Column::UserId",
        to = "super::weokto_users::Column::Id"
    )]
    User,
}

impl Related<super::weokto_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
