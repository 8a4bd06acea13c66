//! Sede entity - Sede scolastica

use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Sede {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub nome: String,
    pub nome_breve: String,
    pub citta: String,
    pub indirizzo1: String,
    pub indirizzo2: String,
    pub telefono: String,
    // ordine di visualizzazione nelle liste
    pub ordinamento: i32,
}
