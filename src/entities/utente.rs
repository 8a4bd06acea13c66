//! Utente entity - Utente base con metodi per gestione password
//!
//! `gs_utente` è mappata con ereditarietà a tabella singola: questa struct contiene
//! le colonne comuni a tutti i ruoli, le specializzazioni (`Alunno`, `Docente`,
//! `Genitore`, `Ata`) la includono con `#[sqlx(flatten)]`.

use super::enums::{Ruolo, Sesso};
use super::timestamps::Timestamps;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Utente {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub ruolo: Ruolo,
    pub username: String,
    // hash bcrypt, mai serializzato verso il client
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub token: Option<String>,
    pub token_creato: Option<DateTime<Utc>>,
    pub ultimo_accesso: Option<DateTime<Utc>>,
    pub abilitato: bool,
    pub spid: bool,
    pub nome: String,
    pub cognome: String,
    pub sesso: Sesso,
    pub data_nascita: Option<NaiveDate>,
    pub comune_nascita: Option<String>,
    pub codice_fiscale: Option<String>,
    pub citta: Option<String>,
    pub indirizzo: Option<String>,
    pub numeri_telefono: Json<Vec<String>>,
}

impl Utente {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        // un utente senza password (es. solo SPID) non può autenticarsi con credenziali
        !self.password.is_empty() && verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }

    /// "Cognome Nome", come compare sui documenti del registro
    pub fn nome_completo(&self) -> String {
        format!("{} {}", self.cognome, self.nome)
    }

    /// Età compiuta alla data indicata, se la data di nascita è nota
    pub fn eta(&self, oggi: NaiveDate) -> Option<u32> {
        self.data_nascita.and_then(|nascita| oggi.years_since(nascita))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn utente_di_prova(id: i32, ruolo: Ruolo) -> Utente {
        Utente {
            id,
            timestamps: Timestamps::pre_persist(Utc::now()),
            ruolo,
            username: format!("utente{}", id),
            password: String::new(),
            email: format!("utente{}@scuola.it", id),
            token: None,
            token_creato: None,
            ultimo_accesso: None,
            abilitato: true,
            spid: false,
            nome: "Mario".to_string(),
            cognome: "Rossi".to_string(),
            sesso: Sesso::M,
            data_nascita: NaiveDate::from_ymd_opt(2007, 3, 15),
            comune_nascita: None,
            codice_fiscale: None,
            citta: None,
            indirizzo: None,
            numeri_telefono: Json(vec![]),
        }
    }

    #[test]
    fn test_password_hash_e_verifica() {
        let mut utente = utente_di_prova(1, Ruolo::Docente);
        utente.password = Utente::hash_password("Segreto123").unwrap();
        assert!(utente.verify_password("Segreto123"));
        assert!(!utente.verify_password("segreto123"));
    }

    #[test]
    fn test_password_vuota_non_verifica() {
        let utente = utente_di_prova(1, Ruolo::Alunno);
        assert!(!utente.verify_password(""));
    }

    #[test]
    fn test_nome_completo() {
        let utente = utente_di_prova(1, Ruolo::Alunno);
        assert_eq!(utente.nome_completo(), "Rossi Mario");
    }

    #[test]
    fn test_eta() {
        let utente = utente_di_prova(1, Ruolo::Alunno);
        let prima = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let dopo = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(utente.eta(prima), Some(17));
        assert_eq!(utente.eta(dopo), Some(18));
    }

    #[test]
    fn test_password_non_serializzata() {
        let mut utente = utente_di_prova(1, Ruolo::Docente);
        utente.password = "hash".to_string();
        let json = serde_json::to_value(&utente).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("creato").is_some());
    }
}
