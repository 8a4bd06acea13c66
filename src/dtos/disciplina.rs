//! Disciplina DTOs - Note disciplinari e annotazioni sul registro

use crate::entities::{Nota, TipoNota};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateNotaDTO {
    pub tipo: TipoNota,
    pub data: NaiveDate,
    #[validate(length(min = 1, max = 5000, message = "Note text must be between 1 and 5000 characters"))]
    pub testo: String,
    #[validate(length(max = 5000))]
    pub provvedimento: Option<String>,
    pub classe_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
    // alunni coinvolti, solo per le note individuali
    #[serde(default)]
    pub alunni: Vec<i32>,
}

impl CreateNotaDTO {
    /// Validazione dei campi più il vincolo sugli alunni coinvolti:
    /// una nota individuale deve averne almeno uno, senza ripetizioni, una nota di classe nessuno
    pub fn valida(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        let mut distinti = self.alunni.clone();
        distinti.sort_unstable();
        distinti.dedup();
        let codice = match (self.tipo, self.alunni.is_empty()) {
            (TipoNota::Individuale, true) => "individual_note_without_students",
            (TipoNota::Classe, false) => "class_note_with_students",
            _ if distinti.len() != self.alunni.len() => "duplicate_students",
            _ => return Ok(()),
        };
        let mut errori = ValidationErrors::new();
        errori.add("alunni", ValidationError::new(codice));
        Err(errori)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAnnotazioneDTO {
    pub data: NaiveDate,
    #[validate(length(min = 1, max = 5000))]
    pub testo: String,
    #[serde(default)]
    pub visibile: bool,
    pub avviso_id: Option<i32>,
    pub classe_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
}

/// Nota con gli alunni coinvolti
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotaDTO {
    #[serde(flatten)]
    pub nota: Nota,
    pub alunni: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nota(tipo: TipoNota, alunni: Vec<i32>) -> CreateNotaDTO {
        CreateNotaDTO {
            tipo,
            data: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            testo: "Disturba la lezione".to_string(),
            provvedimento: None,
            classe_id: 1,
            docente_id: 2,
            alunni,
        }
    }

    #[test]
    fn test_nota_individuale_richiede_alunni() {
        assert!(nota(TipoNota::Individuale, vec![]).valida().is_err());
        assert!(nota(TipoNota::Individuale, vec![10]).valida().is_ok());
    }

    #[test]
    fn test_alunni_ripetuti() {
        let errori = nota(TipoNota::Individuale, vec![10, 12, 10]).valida().unwrap_err();
        assert!(errori.field_errors().contains_key("alunni"));
        assert!(nota(TipoNota::Individuale, vec![10, 12]).valida().is_ok());
    }

    #[test]
    fn test_nota_di_classe_senza_alunni() {
        assert!(nota(TipoNota::Classe, vec![]).valida().is_ok());
        assert!(nota(TipoNota::Classe, vec![10]).valida().is_err());
    }

    #[test]
    fn test_testo_vuoto() {
        let mut dto = nota(TipoNota::Classe, vec![]);
        dto.testo = String::new();
        assert!(dto.valida().is_err());
    }
}
