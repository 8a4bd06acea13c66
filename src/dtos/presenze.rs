//! Presenze DTOs - Assenze, entrate in ritardo e uscite anticipate

use crate::entities::{Assenza, Entrata, Uscita};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare una nuova assenza (senza id, giustificazione e timestamps)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAssenzaDTO {
    pub data: NaiveDate,
    pub alunno_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateEntrataDTO {
    pub data: NaiveDate,
    pub ora: NaiveTime,
    #[serde(default)]
    pub ritardo_breve: bool,
    #[validate(length(max = 2048, message = "Notes must be at most 2048 characters"))]
    pub note: Option<String>,
    #[serde(default = "valido_default")]
    pub valido: bool,
    pub alunno_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUscitaDTO {
    pub data: NaiveDate,
    pub ora: NaiveTime,
    #[validate(length(max = 2048, message = "Notes must be at most 2048 characters"))]
    pub note: Option<String>,
    #[serde(default = "valido_default")]
    pub valido: bool,
    pub alunno_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
}

fn valido_default() -> bool {
    true
}

/// Richiesta di giustificazione, la motivazione è facoltativa solo per la convalida
/// di una giustificazione già dichiarata online
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct GiustificaDTO {
    #[validate(length(min = 1, max = 1024, message = "Reason must be between 1 and 1024 characters"))]
    pub motivazione: Option<String>,
    #[serde(default)]
    pub dichiarazione: Vec<String>,
}

/// Riepilogo delle presenze di un alunno
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PresenzeAlunnoDTO {
    pub alunno_id: i32,
    pub assenze: Vec<Assenza>,
    pub entrate: Vec<Entrata>,
    pub uscite: Vec<Uscita>,
    /// Assenze, ritardi non brevi e uscite ancora da giustificare
    pub da_giustificare: usize,
}

impl PresenzeAlunnoDTO {
    pub fn new(
        alunno_id: i32,
        assenze: Vec<Assenza>,
        entrate: Vec<Entrata>,
        uscite: Vec<Uscita>,
    ) -> Self {
        let da_giustificare = assenze
            .iter()
            .filter(|a| !a.giustificazione.is_giustificato())
            .count()
            + entrate.iter().filter(|e| e.richiede_giustificazione()).count()
            + uscite
                .iter()
                .filter(|u| !u.giustificazione.is_giustificato())
                .count();
        Self {
            alunno_id,
            assenze,
            entrate,
            uscite,
            da_giustificare,
        }
    }
}
