//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Session token (rotated on login, cleared on logout).
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Wallet balance in the minor currency unit. Never negative;
    /// mutated only through the ledger.
    pub balance: i64,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Blocked users cannot authenticate.
    #[sea_orm(default_value = false)]
    pub is_blocked: bool,

    /// Count of approved violation reports against this user.
    #[sea_orm(default_value = 0)]
    pub violation_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posting::Entity")]
    Postings,

    #[sea_orm(has_many = "super::transaction_record::Entity")]
    TransactionRecords,
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl Related<super::transaction_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
