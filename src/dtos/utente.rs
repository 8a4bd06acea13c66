//! Utente DTOs - Data Transfer Objects per utenti e ruoli

use crate::entities::{
    Alunno, Bes, Docente, Religione, Ruolo, Sesso, TipoAta, Utente,
};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    // formato del codice fiscale, con le lettere di omocodia al posto delle cifre
    pub static ref RE_CODICE_FISCALE: Regex = Regex::new(
        r"^[A-Z]{6}[0-9LMNPQRSTUV]{2}[ABCDEHLMPRST][0-9LMNPQRSTUV]{2}[A-Z][0-9LMNPQRSTUV]{3}[A-Z]$"
    )
    .unwrap();
    pub static ref RE_USERNAME: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();
}

/// DTO per il login (solo username e password)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct LoginDTO {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// struct per gestire io col client, senza password e token
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UtenteDTO {
    pub id: i32,
    pub ruolo: Ruolo,
    pub username: String,
    pub email: String,
    pub nome: String,
    pub cognome: String,
    pub sesso: Sesso,
    pub ultimo_accesso: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Utente> for UtenteDTO {
    fn from(value: Utente) -> Self {
        Self {
            id: value.id,
            ruolo: value.ruolo,
            username: value.username,
            email: value.email,
            nome: value.nome,
            cognome: value.cognome,
            sesso: value.sesso,
            ultimo_accesso: value.ultimo_accesso,
        }
    }
}

/// Alunno come compare negli elenchi di classe
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AlunnoDTO {
    pub id: i32,
    pub nome: String,
    pub cognome: String,
    pub data_nascita: Option<NaiveDate>,
    pub bes: Bes,
    pub religione: Religione,
    pub classe_id: Option<i32>,
}

impl From<Alunno> for AlunnoDTO {
    fn from(value: Alunno) -> Self {
        Self {
            id: value.utente.id,
            nome: value.utente.nome,
            cognome: value.utente.cognome,
            data_nascita: value.utente.data_nascita,
            bes: value.bes,
            religione: value.religione,
            classe_id: value.classe_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DocenteDTO {
    pub id: i32,
    pub ruolo: Ruolo,
    pub nome: String,
    pub cognome: String,
    pub responsabile_bes: bool,
}

impl From<Docente> for DocenteDTO {
    fn from(value: Docente) -> Self {
        Self {
            id: value.utente.id,
            ruolo: value.utente.ruolo,
            nome: value.utente.nome,
            cognome: value.utente.cognome,
            responsabile_bes: value.responsabile_bes,
        }
    }
}

/// DTO per creare un nuovo utente (senza id e timestamps)
///
/// La password deve essere già stata trasformata in hash dal chiamante.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUtenteDTO {
    #[validate(
        length(min = 3, max = 128, message = "Username must be between 3 and 128 characters"),
        regex(path = *RE_USERNAME, message = "Username contains invalid characters")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    pub nome: String,
    #[validate(length(min = 1, max = 64, message = "Surname must be between 1 and 64 characters"))]
    pub cognome: String,
    pub sesso: Sesso,
    pub data_nascita: Option<NaiveDate>,
    #[validate(length(max = 64))]
    pub comune_nascita: Option<String>,
    #[validate(regex(path = *RE_CODICE_FISCALE, message = "Invalid fiscal code"))]
    pub codice_fiscale: Option<String>,
    #[validate(length(max = 32))]
    pub citta: Option<String>,
    #[validate(length(max = 64))]
    pub indirizzo: Option<String>,
    #[serde(default)]
    pub numeri_telefono: Vec<String>,
    #[serde(default)]
    pub abilitato: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAlunnoDTO {
    #[validate(nested)]
    pub utente: CreateUtenteDTO,
    pub bes: Bes,
    pub note_bes: Option<String>,
    pub religione: Religione,
    #[serde(default)]
    pub frequenza_estero: bool,
    #[serde(default)]
    pub giustifica_online: bool,
    pub classe_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateDocenteDTO {
    #[validate(nested)]
    pub utente: CreateUtenteDTO,
    /// DOCENTE, STAFF o PRESIDE
    pub ruolo: Ruolo,
    #[serde(default)]
    pub responsabile_bes: bool,
    pub responsabile_bes_sede_id: Option<i32>,
    pub sede_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateGenitoreDTO {
    #[validate(nested)]
    pub utente: CreateUtenteDTO,
    #[serde(default)]
    pub giustifica_online: bool,
    pub alunno_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAtaDTO {
    #[validate(nested)]
    pub utente: CreateUtenteDTO,
    pub tipo_ata: TipoAta,
    #[serde(default)]
    pub segreteria: bool,
    pub sede_id: Option<i32>,
}

/// DTO per aggiornare un utente (solo campi modificabili)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUtenteDTO {
    #[validate(length(min = 1, max = 255))]
    pub password: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub abilitato: Option<bool>,
    #[validate(length(max = 32))]
    pub citta: Option<String>,
    #[validate(length(max = 64))]
    pub indirizzo: Option<String>,
    pub numeri_telefono: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utente_valido() -> CreateUtenteDTO {
        CreateUtenteDTO {
            username: "mario.rossi".to_string(),
            password: "hash".to_string(),
            email: "mario.rossi@scuola.it".to_string(),
            nome: "Mario".to_string(),
            cognome: "Rossi".to_string(),
            sesso: Sesso::M,
            data_nascita: None,
            comune_nascita: None,
            codice_fiscale: Some("RSSMRA80A01H501U".to_string()),
            citta: None,
            indirizzo: None,
            numeri_telefono: vec![],
            abilitato: true,
        }
    }

    #[test]
    fn test_utente_valido() {
        assert!(utente_valido().validate().is_ok());
    }

    #[test]
    fn test_codice_fiscale_non_valido() {
        let mut dto = utente_valido();
        dto.codice_fiscale = Some("RSSMRA80A01H501".to_string());
        let errori = dto.validate().unwrap_err();
        assert!(errori.field_errors().contains_key("codice_fiscale"));
    }

    #[test]
    fn test_username_ed_email() {
        let mut dto = utente_valido();
        dto.username = "ab".to_string();
        dto.email = "non-una-email".to_string();
        let errori = dto.validate().unwrap_err();
        assert!(errori.field_errors().contains_key("username"));
        assert!(errori.field_errors().contains_key("email"));

        let mut dto = utente_valido();
        dto.username = "mario rossi".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_validazione_annidata() {
        let mut utente = utente_valido();
        utente.nome = String::new();
        let dto = CreateAlunnoDTO {
            utente,
            bes: Bes::Nessuno,
            note_bes: None,
            religione: Religione::Si,
            frequenza_estero: false,
            giustifica_online: false,
            classe_id: Some(1),
        };
        assert!(dto.validate().is_err());
    }
}
