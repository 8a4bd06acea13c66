//! Annotazione entity - Annotazione sul registro di classe

use super::timestamps::Timestamps;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Annotazione {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub data: NaiveDate,
    pub testo: String,
    /// Visibile anche a genitori e alunni
    pub visibile: bool,
    // avviso che ha generato l'annotazione
    pub avviso_id: Option<i32>,
    pub classe_id: i32,
    pub docente_id: i32,
}
