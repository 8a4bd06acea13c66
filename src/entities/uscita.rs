//! Uscita entity - Uscita anticipata di un alunno

use super::giustificazione::Giustificazione;
use super::timestamps::Timestamps;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Uscita {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub data: NaiveDate,
    pub ora: NaiveTime,
    pub note: Option<String>,
    pub valido: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub giustificazione: Giustificazione,
    pub alunno_id: i32,
    pub docente_id: i32,
}
