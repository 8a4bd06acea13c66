//! Genitore entity - Utente con ruolo GENITORE

use super::utente::Utente;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Genitore {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub utente: Utente,
    pub giustifica_online: bool,
    pub alunno_id: Option<i32>,
}
