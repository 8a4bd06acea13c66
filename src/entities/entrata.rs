//! Entrata entity - Ingresso in ritardo di un alunno

use super::giustificazione::Giustificazione;
use super::timestamps::Timestamps;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Entrata {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub data: NaiveDate,
    pub ora: NaiveTime,
    /// Ritardo entro la tolleranza, non richiede giustificazione
    pub ritardo_breve: bool,
    pub note: Option<String>,
    /// Se il ritardo è conteggiato ai fini del limite di ritardi
    pub valido: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub giustificazione: Giustificazione,
    pub alunno_id: i32,
    pub docente_id: i32,
}

impl Entrata {
    pub fn richiede_giustificazione(&self) -> bool {
        !self.ritardo_breve && !self.giustificazione.is_giustificato()
    }
}
