//! Materia entity - Materia di insegnamento

use super::enums::{ModalitaValutazione, TipoMateria};
use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Materia {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub nome: String,
    pub nome_breve: String,
    pub tipo: TipoMateria,
    pub valutazione: ModalitaValutazione,
    /// Se la materia concorre alla media dei voti
    pub media: bool,
    pub ordinamento: i32,
}
