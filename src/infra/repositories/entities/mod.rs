//! SeaORM entities for the account tables.

pub mod language;
pub mod user;
pub mod user_group;
pub mod user_meta;
