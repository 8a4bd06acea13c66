//! Nota entity - Nota disciplinare di classe o individuale
//!
//! Gli alunni coinvolti in una nota individuale sono nella tabella ponte
//! `gs_nota_alunno` e non fanno parte della riga.

use super::enums::TipoNota;
use super::timestamps::Timestamps;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Nota {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub tipo: TipoNota,
    pub data: NaiveDate,
    pub testo: String,
    pub provvedimento: Option<String>,
    pub docente_provvedimento_id: Option<i32>,
    // data di annullamento, la nota resta a registro ma non conta
    pub annullata: Option<NaiveDate>,
    pub classe_id: i32,
    pub docente_id: i32,
}

impl Nota {
    pub fn is_annullata(&self) -> bool {
        self.annullata.is_some()
    }
}
