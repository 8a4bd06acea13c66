//! Docente entity - Utente con ruolo DOCENTE, STAFF o PRESIDE
//!
//! Staff e preside sono docenti a tutti gli effetti e condividono le stesse colonne;
//! il discriminatore `ruolo` dell'utente incluso li distingue.

use super::utente::Utente;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Docente {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub utente: Utente,
    pub responsabile_bes: bool,
    pub responsabile_bes_sede_id: Option<i32>,
    #[serde(skip_serializing, default)]
    pub otp: Option<String>,
    #[serde(skip_serializing, default)]
    pub ultimo_otp: Option<String>,
    #[serde(skip_serializing, default)]
    pub chiave1: Option<String>,
    #[serde(skip_serializing, default)]
    pub chiave2: Option<String>,
    #[serde(skip_serializing, default)]
    pub chiave3: Option<String>,
    // solo per lo staff: sede di competenza
    pub sede_id: Option<i32>,
}

/// Le tre chiavi per l'accesso alternativo (app e dispositivi registrati)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChiaviAccesso {
    pub chiave1: String,
    pub chiave2: String,
    pub chiave3: String,
}

impl Docente {
    /// Genera e memorizza tre nuove chiavi di accesso, sostituendo le precedenti
    ///
    /// * `chiave1` - SHA-256 (esadecimale) di username e byte casuali
    /// * `chiave2` - UUID v4 in esadecimale (122 bit casuali, 6 fissi di versione e variante)
    /// * `chiave3` - identificativo univoco basato sull'istante corrente
    pub fn crea_chiavi(&mut self) -> ChiaviAccesso {
        let mut hasher = Sha256::new();
        hasher.update(self.utente.username.as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        let chiave1 = hex::encode(hasher.finalize());

        let chiave2 = hex::encode(Uuid::new_v4().as_bytes());
        let chiave3 = id_univoco(Utc::now());

        self.chiave1 = Some(chiave1.clone());
        self.chiave2 = Some(chiave2.clone());
        self.chiave3 = Some(chiave3.clone());

        ChiaviAccesso {
            chiave1,
            chiave2,
            chiave3,
        }
    }

    /// Restituisce le chiavi memorizzate, `None` se non sono mai state generate
    pub fn recupera_chiavi(&self) -> Option<ChiaviAccesso> {
        match (&self.chiave1, &self.chiave2, &self.chiave3) {
            (Some(chiave1), Some(chiave2), Some(chiave3)) => Some(ChiaviAccesso {
                chiave1: chiave1.clone(),
                chiave2: chiave2.clone(),
                chiave3: chiave3.clone(),
            }),
            _ => None,
        }
    }

    pub fn is_preside(&self) -> bool {
        matches!(self.utente.ruolo, super::Ruolo::Preside)
    }
}

/// Secondi e microsecondi in esadecimale seguiti da un suffisso casuale
fn id_univoco(now: DateTime<Utc>) -> String {
    let casuale = hex::encode(Uuid::new_v4().as_bytes());
    format!(
        "{:08x}{:05x}.{}",
        now.timestamp(),
        now.timestamp_subsec_micros(),
        &casuale[..8]
    )
}
