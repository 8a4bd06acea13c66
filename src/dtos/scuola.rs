//! Scuola DTOs - Sedi, corsi, materie, classi e cattedre

use crate::entities::{Classe, ModalitaValutazione, TipoCattedra, TipoMateria};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    pub static ref RE_SEZIONE: Regex = Regex::new(r"^[A-Z]$").unwrap();
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateSedeDTO {
    #[validate(length(min = 1, max = 128))]
    pub nome: String,
    #[validate(length(min = 1, max = 32))]
    pub nome_breve: String,
    #[validate(length(min = 1, max = 32))]
    pub citta: String,
    #[validate(length(min = 1, max = 64))]
    pub indirizzo1: String,
    #[validate(length(min = 1, max = 64))]
    pub indirizzo2: String,
    #[validate(length(min = 1, max = 32))]
    pub telefono: String,
    #[serde(default)]
    pub ordinamento: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCorsoDTO {
    #[validate(length(min = 1, max = 128))]
    pub nome: String,
    #[validate(length(min = 1, max = 32))]
    pub nome_breve: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateMateriaDTO {
    #[validate(length(min = 1, max = 128))]
    pub nome: String,
    #[validate(length(min = 1, max = 32))]
    pub nome_breve: String,
    pub tipo: TipoMateria,
    pub valutazione: ModalitaValutazione,
    pub media: bool,
    #[serde(default)]
    pub ordinamento: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateClasseDTO {
    #[validate(range(min = 1, max = 5, message = "Class year must be between 1 and 5"))]
    pub anno: i32,
    #[validate(regex(path = *RE_SEZIONE, message = "Section must be a single uppercase letter"))]
    pub sezione: String,
    #[validate(range(min = 1, max = 40))]
    pub ore_settimanali: i32,
    pub sede_id: i32,
    pub corso_id: i32,
    pub coordinatore_id: Option<i32>,
    pub segretario_id: Option<i32>,
}

/// DTO per aggiornare una classe: solo coordinatore, segretario e orario
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateClasseDTO {
    #[validate(range(min = 1, max = 40))]
    pub ore_settimanali: Option<i32>,
    pub coordinatore_id: Option<i32>,
    pub segretario_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCattedraDTO {
    #[serde(default = "attiva_default")]
    pub attiva: bool,
    #[serde(default)]
    pub supplenza: bool,
    pub tipo: TipoCattedra,
    pub materia_id: i32,
    pub docente_id: i32,
    pub classe_id: i32,
    pub alunno_id: Option<i32>,
}

fn attiva_default() -> bool {
    true
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClasseDTO {
    pub id: i32,
    pub nome: String,
    pub anno: i32,
    pub sezione: String,
    pub sede_id: i32,
    pub corso_id: i32,
    pub coordinatore_id: Option<i32>,
}

impl From<Classe> for ClasseDTO {
    fn from(value: Classe) -> Self {
        Self {
            id: value.id,
            nome: value.nome(),
            anno: value.anno,
            sezione: value.sezione,
            sede_id: value.sede_id,
            corso_id: value.corso_id,
            coordinatore_id: value.coordinatore_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classe(anno: i32, sezione: &str) -> CreateClasseDTO {
        CreateClasseDTO {
            anno,
            sezione: sezione.to_string(),
            ore_settimanali: 32,
            sede_id: 1,
            corso_id: 1,
            coordinatore_id: None,
            segretario_id: None,
        }
    }

    #[test]
    fn test_classe_valida() {
        assert!(classe(3, "A").validate().is_ok());
    }

    #[test]
    fn test_anno_e_sezione_non_validi() {
        let errori = classe(6, "a").validate().unwrap_err();
        assert!(errori.field_errors().contains_key("anno"));
        assert!(errori.field_errors().contains_key("sezione"));
        assert!(classe(0, "AB").validate().is_err());
    }

    #[test]
    fn test_cattedra_attiva_di_default() {
        let dto: CreateCattedraDTO = serde_json::from_value(serde_json::json!({
            "tipo": "NORMALE",
            "materia_id": 1,
            "docente_id": 2,
            "classe_id": 3
        }))
        .unwrap();
        assert!(dto.attiva);
        assert!(!dto.supplenza);
        assert_eq!(dto.alunno_id, None);
    }
}
