//! Physical copy model and status enum

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Lifecycle status of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Available,
    Borrowed,
    Damaged,
    Lost,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Borrowed => "borrowed",
            CopyStatus::Damaged => "damaged",
            CopyStatus::Lost => "lost",
        }
    }

    /// Only available copies can start a new borrowing
    pub fn can_borrow(&self) -> bool {
        matches!(self, CopyStatus::Available)
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(CopyStatus::Available),
            "borrowed" => Ok(CopyStatus::Borrowed),
            "damaged" => Ok(CopyStatus::Damaged),
            "lost" => Ok(CopyStatus::Lost),
            _ => Err(format!("Invalid copy status: {}", s)),
        }
    }
}

// SQLx conversion for CopyStatus (stored as TEXT)
impl sqlx::Type<Postgres> for CopyStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CopyStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Physical copy of a book, from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: i32,
    pub book_id: i32,
    pub status: CopyStatus,
    pub created_at: NaiveDate,
}

/// Set copy status request (damaged, lost, or back to available)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCopyStatus {
    pub status: CopyStatus,
}
