//! Scrutinio DTOs - Scrutini, proposte di voto, voti finali ed esiti

use crate::entities::{Periodo, StatoScrutinio, TipoEsito, TipoRecupero};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare lo scrutinio di una classe, che parte sempre non aperto
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateScrutinioDTO {
    pub periodo: Periodo,
    pub classe_id: i32,
}

/// Richiesta di spostamento dello scrutinio a un passo adiacente
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CambiaStatoDTO {
    pub stato: StatoScrutinio,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreatePropostaVotoDTO {
    pub periodo: Periodo,
    #[validate(range(min = 0, max = 10, message = "Vote must be between 0 and 10"))]
    pub orale: Option<i32>,
    #[validate(range(min = 0, max = 10, message = "Vote must be between 0 and 10"))]
    pub scritto: Option<i32>,
    #[validate(range(min = 0, max = 10, message = "Vote must be between 0 and 10"))]
    pub pratico: Option<i32>,
    #[validate(range(min = 0, max = 10, message = "Vote must be between 0 and 10"))]
    pub unico: Option<i32>,
    #[validate(length(max = 5000))]
    pub debito: Option<String>,
    pub recupero: Option<TipoRecupero>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub assenze: i32,
    pub alunno_id: i32,
    pub classe_id: i32,
    pub materia_id: i32,
    // impostato dal servizio con il docente autenticato
    #[serde(default)]
    pub docente_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateVotoScrutinioDTO {
    #[validate(range(min = 0, max = 10, message = "Vote must be between 0 and 10"))]
    pub unico: Option<i32>,
    #[validate(length(max = 5000))]
    pub debito: Option<String>,
    pub recupero: Option<TipoRecupero>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub assenze: i32,
    pub scrutinio_id: i32,
    pub alunno_id: i32,
    pub materia_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateEsitoDTO {
    pub esito: TipoEsito,
    #[validate(range(min = 0.0, max = 10.0))]
    pub media: Option<f64>,
    #[validate(range(min = 0, max = 40))]
    pub credito: Option<i32>,
    #[validate(range(min = 0, max = 40))]
    pub credito_precedente: Option<i32>,
    pub scrutinio_id: i32,
    pub alunno_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateStoricoEsitoDTO {
    #[validate(length(min = 2, max = 16))]
    pub classe: String,
    pub esito: TipoEsito,
    pub periodo: Periodo,
    #[validate(range(min = 0.0, max = 10.0))]
    pub media: f64,
    #[validate(range(min = 0, max = 40))]
    pub credito: i32,
    #[validate(range(min = 0, max = 40))]
    pub credito_precedente: i32,
    pub alunno_id: i32,
    #[validate(nested)]
    #[serde(default)]
    pub voti: Vec<CreateStoricoVotoDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateStoricoVotoDTO {
    #[validate(range(min = 0, max = 10))]
    pub voto: i32,
    #[validate(length(max = 5000))]
    pub carenze: Option<String>,
    pub materia_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cambia_stato_da_json() {
        let dto: CambiaStatoDTO = serde_json::from_value(serde_json::json!({ "stato": "3" })).unwrap();
        assert_eq!(dto.stato, StatoScrutinio::Passo3);
        let dto: CambiaStatoDTO = serde_json::from_value(serde_json::json!({ "stato": "C" })).unwrap();
        assert_eq!(dto.stato, StatoScrutinio::Chiuso);
        assert!(serde_json::from_value::<CambiaStatoDTO>(serde_json::json!({ "stato": "X" })).is_err());
    }

    #[test]
    fn test_proposta_voto_fuori_intervallo() {
        let dto: CreatePropostaVotoDTO = serde_json::from_value(serde_json::json!({
            "periodo": "PRIMO",
            "unico": 11,
            "alunno_id": 10,
            "classe_id": 1,
            "materia_id": 4
        }))
        .unwrap();
        let errori = dto.validate().unwrap_err();
        assert!(errori.field_errors().contains_key("unico"));
        assert_eq!(dto.assenze, 0);
    }

    #[test]
    fn test_storico_valida_i_voti() {
        let dto = CreateStoricoEsitoDTO {
            classe: "3A".to_string(),
            esito: TipoEsito::Ammesso,
            periodo: Periodo::Finale,
            media: 7.4,
            credito: 10,
            credito_precedente: 0,
            alunno_id: 10,
            voti: vec![CreateStoricoVotoDTO {
                voto: 12,
                carenze: None,
                materia_id: 4,
            }],
        };
        assert!(dto.validate().is_err());
    }
}
