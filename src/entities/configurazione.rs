//! Configurazione entity - Parametro di configurazione amministrativa

use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Configurazione {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub categoria: String,
    pub parametro: String,
    pub descrizione: String,
    pub valore: String,
    /// Gestito dal sistema, non modificabile dall'amministratore
    pub gestito: bool,
}
