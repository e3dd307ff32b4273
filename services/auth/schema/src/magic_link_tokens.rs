use sea_orm::entity::prelude::*;

/// One pending passwordless login attempt.
/// Redeemable once, by link (`token_hash`) or by OTP, until `expires_at`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "magic_link_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Lowercased; not unique on its own.
    pub email: String,
    /// Hex SHA-256 of the raw token sent in the link.
    #[sea_orm(unique)]
    pub token_hash: String,
    pub otp_code: String,
    /// `"weokto"` or `"stam"`.
    pub tenant: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
