//! Assenza entity - Assenza giornaliera di un alunno
//!
//! Vincolo di unicità su (data, alunno_id): al massimo un'assenza al giorno per alunno.

use super::giustificazione::Giustificazione;
use super::timestamps::Timestamps;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Assenza {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub data: NaiveDate,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub giustificazione: Giustificazione,
    // autodichiarazioni sottoscritte in fase di giustificazione (es. covid)
    pub dichiarazione: Json<Vec<String>>,
    // nomi dei file dei certificati medici caricati
    pub certificati: Json<Vec<String>>,
    pub alunno_id: i32,
    // docente che ha registrato l'assenza
    pub docente_id: i32,
}
