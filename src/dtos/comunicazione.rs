//! Comunicazione DTOs - Circolari, avvisi, documenti e allegati

use crate::entities::{
    Allegato, Categoria, Comunicazione, DestinatarioSpeciale, Filtro, StatoComunicazione, TipoAta,
    TipoAvviso, TipoDocumento,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// Campi comuni a tutte le comunicazioni, con i filtri dei destinatari
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateComunicazioneDTO {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub titolo: String,
    pub data: NaiveDate,
    #[validate(range(min = 2000, max = 2100))]
    pub anno: i32,
    #[serde(default = "bozza")]
    pub stato: StatoComunicazione,
    #[serde(default)]
    pub sedi: Vec<i32>,
    #[serde(default)]
    pub speciali: Vec<DestinatarioSpeciale>,
    #[serde(default)]
    pub ata: Vec<TipoAta>,
    #[serde(default = "nessuno")]
    pub coordinatori: Filtro,
    #[serde(default)]
    pub filtro_coordinatori: Vec<i32>,
    #[serde(default = "nessuno")]
    pub docenti: Filtro,
    #[serde(default)]
    pub filtro_docenti: Vec<i32>,
    #[serde(default = "nessuno")]
    pub genitori: Filtro,
    #[serde(default)]
    pub filtro_genitori: Vec<i32>,
    #[serde(default = "nessuno")]
    pub alunni: Filtro,
    #[serde(default)]
    pub filtro_alunni: Vec<i32>,
    #[serde(default)]
    pub esterni: Vec<String>,
    // impostato dal servizio con l'utente autenticato
    #[serde(default)]
    pub autore_id: Option<i32>,
}

fn bozza() -> StatoComunicazione {
    StatoComunicazione::Bozza
}

fn nessuno() -> Filtro {
    Filtro::Nessuno
}

impl CreateComunicazioneDTO {
    /// Controlla la coerenza dei filtri dei destinatari
    ///
    /// I coordinatori si filtrano solo per classe, genitori e alunni non per materia.
    /// Un filtro per classi, materie o utenti richiede almeno un valore.
    pub fn valida(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        let mut errori = ValidationErrors::new();
        let filtri: [(&'static str, Filtro, &[i32], &[Filtro]); 4] = [
            (
                "coordinatori",
                self.coordinatori,
                self.filtro_coordinatori.as_slice(),
                &[Filtro::Materie, Filtro::Utenti],
            ),
            ("docenti", self.docenti, self.filtro_docenti.as_slice(), &[]),
            ("genitori", self.genitori, self.filtro_genitori.as_slice(), &[Filtro::Materie]),
            ("alunni", self.alunni, self.filtro_alunni.as_slice(), &[Filtro::Materie]),
        ];
        for (campo, filtro, valori, non_ammessi) in filtri {
            if non_ammessi.contains(&filtro) {
                errori.add(campo, ValidationError::new("filter_not_allowed"));
            } else if filtro.richiede_valori() && valori.is_empty() {
                errori.add(campo, ValidationError::new("filter_values_required"));
            }
        }
        if errori.errors().is_empty() {
            Ok(())
        } else {
            Err(errori)
        }
    }
}

impl Filtro {
    fn richiede_valori(&self) -> bool {
        matches!(self, Filtro::Classi | Filtro::Materie | Filtro::Utenti)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCircolareDTO {
    #[validate(nested)]
    #[serde(flatten)]
    pub comunicazione: CreateComunicazioneDTO,
    // 0 = primo numero libero dell'anno
    #[validate(range(min = 0))]
    #[serde(default)]
    pub numero: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAvvisoDTO {
    #[validate(nested)]
    #[serde(flatten)]
    pub comunicazione: CreateComunicazioneDTO,
    pub tipo_avviso: TipoAvviso,
    pub ora: Option<NaiveTime>,
    pub ora_fine: Option<NaiveTime>,
    pub cattedra_id: Option<i32>,
    pub materia_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateDocumentoDTO {
    #[validate(nested)]
    #[serde(flatten)]
    pub comunicazione: CreateComunicazioneDTO,
    pub tipo_documento: TipoDocumento,
    pub classe_id: Option<i32>,
    pub materia_id: Option<i32>,
    pub alunno_id: Option<i32>,
    #[serde(default)]
    pub cifrato: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateAllegatoDTO {
    #[validate(length(min = 1, max = 255))]
    pub titolo: String,
    #[validate(length(min = 1, max = 255))]
    pub nome: String,
    #[validate(length(min = 1, max = 16))]
    pub estensione: String,
    #[validate(range(min = 0))]
    pub dimensione: i32,
    #[validate(length(min = 1, max = 255))]
    pub file: String,
    // preso dal path
    #[serde(default)]
    pub comunicazione_id: i32,
}

/// Voce della bacheca dell'utente
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ComunicazioneDTO {
    pub id: i32,
    pub categoria: Categoria,
    pub titolo: String,
    pub data: NaiveDate,
    pub anno: i32,
    pub stato: StatoComunicazione,
    pub autore_id: Option<i32>,
}

impl From<Comunicazione> for ComunicazioneDTO {
    fn from(value: Comunicazione) -> Self {
        Self {
            id: value.id,
            categoria: value.categoria,
            titolo: value.titolo,
            data: value.data,
            anno: value.anno,
            stato: value.stato,
            autore_id: value.autore_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AllegatoDTO {
    pub id: i32,
    pub titolo: String,
    pub nome_file: String,
    pub dimensione: i32,
}

impl From<Allegato> for AllegatoDTO {
    fn from(value: Allegato) -> Self {
        Self {
            nome_file: value.nome_file(),
            id: value.id,
            titolo: value.titolo,
            dimensione: value.dimensione,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comunicazione() -> CreateComunicazioneDTO {
        serde_json::from_value(serde_json::json!({
            "titolo": "Uscita didattica",
            "data": "2025-11-20",
            "anno": 2025
        }))
        .unwrap()
    }

    #[test]
    fn test_default_bozza_senza_destinatari() {
        let dto = comunicazione();
        assert_eq!(dto.stato, StatoComunicazione::Bozza);
        assert_eq!(dto.docenti, Filtro::Nessuno);
        assert!(dto.valida().is_ok());
    }

    #[test]
    fn test_coordinatori_solo_per_classe() {
        let mut dto = comunicazione();
        dto.coordinatori = Filtro::Materie;
        dto.filtro_coordinatori = vec![4];
        let errori = dto.valida().unwrap_err();
        assert!(errori.field_errors().contains_key("coordinatori"));

        dto.coordinatori = Filtro::Classi;
        dto.filtro_coordinatori = vec![3];
        assert!(dto.valida().is_ok());
    }

    #[test]
    fn test_genitori_e_alunni_senza_filtro_materie() {
        let mut dto = comunicazione();
        dto.genitori = Filtro::Materie;
        dto.filtro_genitori = vec![4];
        dto.alunni = Filtro::Materie;
        dto.filtro_alunni = vec![4];
        let errori = dto.valida().unwrap_err();
        assert!(errori.field_errors().contains_key("genitori"));
        assert!(errori.field_errors().contains_key("alunni"));
    }

    #[test]
    fn test_filtro_senza_valori() {
        let mut dto = comunicazione();
        dto.docenti = Filtro::Utenti;
        assert!(dto.valida().is_err());
        dto.filtro_docenti = vec![30];
        assert!(dto.valida().is_ok());
    }

    #[test]
    fn test_circolare_piatta() {
        let dto: CreateCircolareDTO = serde_json::from_value(serde_json::json!({
            "titolo": "Assemblea di istituto",
            "data": "2025-11-10",
            "anno": 2025,
            "alunni": "T",
            "numero": 42
        }))
        .unwrap();
        assert_eq!(dto.numero, 42);
        assert_eq!(dto.comunicazione.alunni, Filtro::Tutti);
        assert!(dto.validate().is_ok());
    }
}
