//! Valutazione DTOs - Voti e medie

use crate::entities::{TipoValutazione, Valutazione};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateValutazioneDTO {
    pub tipo: TipoValutazione,
    #[serde(default = "vero")]
    pub visibile: bool,
    #[serde(default = "vero")]
    pub media: bool,
    #[validate(range(min = 0.0, max = 10.0, message = "Grade must be between 0 and 10"))]
    pub voto: Option<f64>,
    #[validate(length(max = 5000))]
    pub giudizio: Option<String>,
    #[validate(length(max = 5000))]
    pub argomento: Option<String>,
    pub data: NaiveDate,
    pub alunno_id: i32,
    pub classe_id: i32,
    pub materia_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
}

fn vero() -> bool {
    true
}

impl CreateValutazioneDTO {
    /// Oltre ai vincoli sui campi, il voto va espresso in quarti di punto
    /// e deve esserci almeno un voto o un giudizio
    pub fn valida(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        let mut errori = ValidationErrors::new();
        let senza_giudizio = self.giudizio.as_deref().is_none_or(|g| g.trim().is_empty());
        match self.voto {
            Some(voto) if (voto * 4.0).fract() != 0.0 => {
                errori.add("voto", ValidationError::new("grade_not_in_quarters"));
            }
            // un voto pari a zero non viene mostrato né conta per la media
            Some(voto) if voto <= 0.0 && senza_giudizio => {
                errori.add("voto", ValidationError::new("grade_or_judgement_required"));
            }
            None if senza_giudizio => {
                errori.add("voto", ValidationError::new("grade_or_judgement_required"));
            }
            _ => return Ok(()),
        }
        Err(errori)
    }
}

/// Valutazione come mostrata al client, con il voto in forma testuale
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ValutazioneDTO {
    pub id: i32,
    pub tipo: TipoValutazione,
    pub voto: Option<f64>,
    pub voto_visualizzabile: String,
    pub giudizio: Option<String>,
    pub argomento: Option<String>,
    pub data: NaiveDate,
    pub media: bool,
    pub materia_id: i32,
    pub docente_id: i32,
}

impl From<Valutazione> for ValutazioneDTO {
    fn from(value: Valutazione) -> Self {
        Self {
            voto_visualizzabile: value.voto_visualizzabile(),
            id: value.id,
            tipo: value.tipo,
            voto: value.voto,
            giudizio: value.giudizio,
            argomento: value.argomento,
            data: value.data,
            media: value.media,
            materia_id: value.materia_id,
            docente_id: value.docente_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MediaDTO {
    pub alunno_id: i32,
    pub materia_id: i32,
    pub media: Option<f64>,
    // numero di voti considerati
    pub voti: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voto(voto: Option<f64>, giudizio: Option<&str>) -> CreateValutazioneDTO {
        CreateValutazioneDTO {
            tipo: TipoValutazione::Scritto,
            visibile: true,
            media: true,
            voto,
            giudizio: giudizio.map(str::to_string),
            argomento: Some("Equazioni di secondo grado".to_string()),
            data: NaiveDate::from_ymd_opt(2025, 11, 12).unwrap(),
            alunno_id: 10,
            classe_id: 1,
            materia_id: 4,
            docente_id: 2,
        }
    }

    #[test]
    fn test_voto_in_quarti() {
        assert!(voto(Some(6.25), None).valida().is_ok());
        assert!(voto(Some(7.5), None).valida().is_ok());
        assert!(voto(Some(6.3), None).valida().is_err());
    }

    #[test]
    fn test_voto_fuori_intervallo() {
        let errori = voto(Some(10.5), None).valida().unwrap_err();
        assert!(errori.field_errors().contains_key("voto"));
        assert!(voto(Some(-1.0), None).valida().is_err());
    }

    #[test]
    fn test_voto_o_giudizio() {
        assert!(voto(None, None).valida().is_err());
        assert!(voto(None, Some("")).valida().is_err());
        assert!(voto(None, Some("Buona partecipazione")).valida().is_ok());
    }

    #[test]
    fn test_voto_zero_richiede_giudizio() {
        let errori = voto(Some(0.0), None).valida().unwrap_err();
        assert!(errori.field_errors().contains_key("voto"));
        assert!(voto(Some(0.0), Some("  ")).valida().is_err());
        // con il giudizio il voto nullo resta ammesso
        assert!(voto(Some(0.0), Some("Non svolto")).valida().is_ok());
    }

    #[test]
    fn test_default_visibile_e_media() {
        let dto: CreateValutazioneDTO = serde_json::from_value(serde_json::json!({
            "tipo": "ORALE",
            "voto": 8.0,
            "data": "2025-11-12",
            "alunno_id": 10,
            "classe_id": 1,
            "materia_id": 4
        }))
        .unwrap();
        assert!(dto.visibile);
        assert!(dto.media);
    }
}
