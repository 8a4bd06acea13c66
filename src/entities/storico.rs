//! StoricoEsito e StoricoVoto entity - Archivio degli esiti degli anni precedenti

use super::enums::{Periodo, TipoEsito};
use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct StoricoEsito {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    // nome della classe frequentata, es. "3A"
    pub classe: String,
    pub esito: TipoEsito,
    pub periodo: Periodo,
    pub media: f64,
    pub credito: i32,
    pub credito_precedente: i32,
    pub dati: Json<serde_json::Value>,
    pub alunno_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct StoricoVoto {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub voto: i32,
    pub carenze: Option<String>,
    pub dati: Json<serde_json::Value>,
    pub storico_esito_id: i32,
    pub materia_id: i32,
}
