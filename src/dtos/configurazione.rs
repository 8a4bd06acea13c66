//! Configurazione DTOs - Parametri amministrativi

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateConfigurazioneDTO {
    #[validate(length(min = 1, max = 32))]
    pub categoria: String,
    #[validate(length(min = 1, max = 64))]
    pub parametro: String,
    #[validate(length(max = 1024))]
    #[serde(default)]
    pub descrizione: String,
    #[serde(default)]
    pub valore: String,
    #[serde(default)]
    pub gestito: bool,
}

/// Solo il valore di un parametro è modificabile
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateConfigurazioneDTO {
    pub valore: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ValoreConfigurazioneDTO {
    pub parametro: String,
    pub valore: String,
}
