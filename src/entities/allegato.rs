//! Allegato entity - File allegato a una comunicazione

use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Allegato {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub titolo: String,
    /// Nome del file mostrato all'utente per il download
    pub nome: String,
    pub estensione: String,
    // dimensione in byte
    pub dimensione: i32,
    // percorso relativo nell'archivio documenti
    #[serde(skip_serializing, default)]
    pub file: String,
    pub comunicazione_id: i32,
}

impl Allegato {
    pub fn nome_file(&self) -> String {
        format!("{}.{}", self.nome, self.estensione)
    }
}
