//! VotoScrutinio entity - Voto finale deliberato in sede di scrutinio

use super::enums::TipoRecupero;
use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// Voto minimo per la sufficienza
pub const VOTO_SUFFICIENTE: i32 = 6;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct VotoScrutinio {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub unico: Option<i32>,
    pub debito: Option<String>,
    pub recupero: Option<TipoRecupero>,
    pub assenze: i32,
    pub dati: Json<serde_json::Value>,
    pub scrutinio_id: i32,
    pub alunno_id: i32,
    pub materia_id: i32,
}

impl VotoScrutinio {
    pub fn is_insufficiente(&self) -> bool {
        self.unico.is_some_and(|voto| voto < VOTO_SUFFICIENTE)
    }
}
