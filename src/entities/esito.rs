//! Esito entity - Esito complessivo dell'alunno nello scrutinio

use super::enums::TipoEsito;
use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Esito {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub esito: TipoEsito,
    pub media: Option<f64>,
    pub credito: Option<i32>,
    pub credito_precedente: Option<i32>,
    pub dati: Json<serde_json::Value>,
    pub scrutinio_id: i32,
    pub alunno_id: i32,
}

impl Esito {
    /// Somma del credito dell'anno e di quelli precedenti
    pub fn credito_totale(&self) -> i32 {
        self.credito.unwrap_or(0) + self.credito_precedente.unwrap_or(0)
    }
}
