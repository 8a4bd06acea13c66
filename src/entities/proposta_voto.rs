//! PropostaVoto entity - Voto proposto dal docente per lo scrutinio

use super::enums::{Periodo, TipoRecupero};
use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PropostaVoto {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub periodo: Periodo,
    pub orale: Option<i32>,
    pub scritto: Option<i32>,
    pub pratico: Option<i32>,
    pub unico: Option<i32>,
    // argomenti da recuperare in caso di insufficienza
    pub debito: Option<String>,
    pub recupero: Option<TipoRecupero>,
    // ore di assenza nella materia
    pub assenze: i32,
    pub dati: Json<serde_json::Value>,
    pub alunno_id: i32,
    pub classe_id: i32,
    pub materia_id: i32,
    pub docente_id: i32,
}

impl PropostaVoto {
    /// Voto proposto: quello unico, altrimenti il primo tra scritto, orale e pratico
    pub fn voto(&self) -> Option<i32> {
        self.unico.or(self.scritto).or(self.orale).or(self.pratico)
    }
}
