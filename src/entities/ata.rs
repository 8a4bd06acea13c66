//! Ata entity - Personale amministrativo, tecnico e ausiliario

use super::enums::TipoAta;
use super::utente::Utente;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Ata {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub utente: Utente,
    pub tipo_ata: TipoAta,
    pub segreteria: bool,
    pub sede_id: Option<i32>,
}
