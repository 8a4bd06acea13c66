//! Cattedra entity - Assegnazione docente + materia + classe

use super::enums::TipoCattedra;
use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Cattedra {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub attiva: bool,
    pub supplenza: bool,
    pub tipo: TipoCattedra,
    pub materia_id: i32,
    pub docente_id: i32,
    pub classe_id: i32,
    // valorizzato solo per le cattedre di sostegno
    pub alunno_id: Option<i32>,
}
