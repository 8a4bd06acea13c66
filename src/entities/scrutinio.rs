//! Scrutinio entity - Sessione di scrutinio di una classe per un periodo
//!
//! Lo scrutinio avanza per passi: non aperto -> passo 1 -> ... -> ultimo passo -> chiuso.
//! Il numero di passi dipende dal periodo. Ci si sposta di un solo passo alla volta,
//! in avanti o all'indietro; uno scrutinio chiuso si riapre solo all'ultimo passo.

use super::enums::{Periodo, Sincronizzazione};
use super::timestamps::Timestamps;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "stato_scrutinio")]
pub enum StatoScrutinio {
    #[sqlx(rename = "N")]
    #[serde(rename = "N")]
    NonAperto,
    #[sqlx(rename = "1")]
    #[serde(rename = "1")]
    Passo1,
    #[sqlx(rename = "2")]
    #[serde(rename = "2")]
    Passo2,
    #[sqlx(rename = "3")]
    #[serde(rename = "3")]
    Passo3,
    #[sqlx(rename = "4")]
    #[serde(rename = "4")]
    Passo4,
    #[sqlx(rename = "5")]
    #[serde(rename = "5")]
    Passo5,
    #[sqlx(rename = "6")]
    #[serde(rename = "6")]
    Passo6,
    #[sqlx(rename = "7")]
    #[serde(rename = "7")]
    Passo7,
    #[sqlx(rename = "8")]
    #[serde(rename = "8")]
    Passo8,
    #[sqlx(rename = "9")]
    #[serde(rename = "9")]
    Passo9,
    #[sqlx(rename = "C")]
    #[serde(rename = "C")]
    Chiuso,
}

const PASSI: [StatoScrutinio; 9] = [
    StatoScrutinio::Passo1,
    StatoScrutinio::Passo2,
    StatoScrutinio::Passo3,
    StatoScrutinio::Passo4,
    StatoScrutinio::Passo5,
    StatoScrutinio::Passo6,
    StatoScrutinio::Passo7,
    StatoScrutinio::Passo8,
    StatoScrutinio::Passo9,
];

impl StatoScrutinio {
    /// Numero del passo (1..=9), `None` per non aperto e chiuso
    pub fn passo(&self) -> Option<u8> {
        PASSI
            .iter()
            .position(|p| p == self)
            .map(|indice| indice as u8 + 1)
    }

    pub fn da_passo(passo: u8) -> Option<Self> {
        PASSI.get(usize::from(passo).checked_sub(1)?).copied()
    }
}

impl Periodo {
    /// Numero di passi della procedura di scrutinio del periodo
    pub fn passi(&self) -> u8 {
        match self {
            Periodo::Primo | Periodo::Secondo => 7,
            Periodo::Finale => 9,
            Periodo::GiudizioSospeso | Periodo::Rinviato | Periodo::Integrativo => 5,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErroreScrutinio {
    #[error("invalid scrutiny transition from {da:?} to {a:?}")]
    TransizioneNonValida {
        da: StatoScrutinio,
        a: StatoScrutinio,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Scrutinio {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub periodo: Periodo,
    pub data: Option<NaiveDate>,
    pub inizio: Option<NaiveTime>,
    pub fine: Option<NaiveTime>,
    pub stato: StatoScrutinio,
    pub classe_id: i32,
    // dati di lavoro della procedura (presenze, verbale, ...)
    pub dati: Json<serde_json::Value>,
    /// Istante da cui gli esiti sono visibili alle famiglie
    pub visibile: Option<DateTime<Utc>>,
    pub sincronizzazione: Option<Sincronizzazione>,
}

impl Scrutinio {
    pub fn stato_successivo(&self) -> Option<StatoScrutinio> {
        match self.stato {
            StatoScrutinio::NonAperto => Some(StatoScrutinio::Passo1),
            StatoScrutinio::Chiuso => None,
            stato => {
                let passo = stato.passo()?;
                if passo >= self.periodo.passi() {
                    Some(StatoScrutinio::Chiuso)
                } else {
                    StatoScrutinio::da_passo(passo + 1)
                }
            }
        }
    }

    pub fn stato_precedente(&self) -> Option<StatoScrutinio> {
        match self.stato {
            StatoScrutinio::NonAperto => None,
            StatoScrutinio::Passo1 => Some(StatoScrutinio::NonAperto),
            StatoScrutinio::Chiuso => StatoScrutinio::da_passo(self.periodo.passi()),
            stato => StatoScrutinio::da_passo(stato.passo()? - 1),
        }
    }

    /// Sposta lo scrutinio al passo adiacente, registrando apertura e chiusura
    pub fn cambia_stato(
        &mut self,
        nuovo: StatoScrutinio,
        now: DateTime<Utc>,
    ) -> Result<(), ErroreScrutinio> {
        let consentito =
            Some(nuovo) == self.stato_successivo() || Some(nuovo) == self.stato_precedente();
        if !consentito {
            return Err(ErroreScrutinio::TransizioneNonValida {
                da: self.stato,
                a: nuovo,
            });
        }

        match (self.stato, nuovo) {
            (StatoScrutinio::NonAperto, _) => {
                self.data = Some(now.date_naive());
                self.inizio = Some(now.time());
            }
            (_, StatoScrutinio::Chiuso) => self.fine = Some(now.time()),
            (StatoScrutinio::Chiuso, _) => self.fine = None,
            _ => {}
        }
        self.stato = nuovo;
        Ok(())
    }

    pub fn is_chiuso(&self) -> bool {
        self.stato == StatoScrutinio::Chiuso
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrutinio(periodo: Periodo, stato: StatoScrutinio) -> Scrutinio {
        Scrutinio {
            id: 1,
            timestamps: Timestamps::pre_persist(Utc::now()),
            periodo,
            data: None,
            inizio: None,
            fine: None,
            stato,
            classe_id: 1,
            dati: Json(serde_json::json!({})),
            visibile: None,
            sincronizzazione: None,
        }
    }

    #[test]
    fn test_passi() {
        assert_eq!(StatoScrutinio::Passo1.passo(), Some(1));
        assert_eq!(StatoScrutinio::Passo9.passo(), Some(9));
        assert_eq!(StatoScrutinio::Chiuso.passo(), None);
        assert_eq!(StatoScrutinio::da_passo(4), Some(StatoScrutinio::Passo4));
        assert_eq!(StatoScrutinio::da_passo(0), None);
        assert_eq!(StatoScrutinio::da_passo(10), None);
    }

    #[test]
    fn test_avanzamento_completo_primo_periodo() {
        let mut s = scrutinio(Periodo::Primo, StatoScrutinio::NonAperto);
        let now = Utc::now();
        let mut passaggi = 0;
        while let Some(successivo) = s.stato_successivo() {
            s.cambia_stato(successivo, now).unwrap();
            passaggi += 1;
        }
        // 7 passi più la chiusura
        assert_eq!(passaggi, 8);
        assert!(s.is_chiuso());
        assert_eq!(s.data, Some(now.date_naive()));
        assert!(s.inizio.is_some());
        assert!(s.fine.is_some());
    }

    #[test]
    fn test_finale_ha_nove_passi() {
        let s = scrutinio(Periodo::Finale, StatoScrutinio::Passo7);
        assert_eq!(s.stato_successivo(), Some(StatoScrutinio::Passo8));
        let s = scrutinio(Periodo::Finale, StatoScrutinio::Passo9);
        assert_eq!(s.stato_successivo(), Some(StatoScrutinio::Chiuso));
    }

    #[test]
    fn test_salto_di_passo_rifiutato() {
        let mut s = scrutinio(Periodo::Primo, StatoScrutinio::Passo2);
        let errore = s.cambia_stato(StatoScrutinio::Passo4, Utc::now()).unwrap_err();
        assert_eq!(
            errore,
            ErroreScrutinio::TransizioneNonValida {
                da: StatoScrutinio::Passo2,
                a: StatoScrutinio::Passo4
            }
        );
        assert_eq!(s.stato, StatoScrutinio::Passo2);
    }

    #[test]
    fn test_riapertura_all_ultimo_passo() {
        let mut s = scrutinio(Periodo::Secondo, StatoScrutinio::Chiuso);
        s.fine = Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert!(s.cambia_stato(StatoScrutinio::Passo1, Utc::now()).is_err());
        s.cambia_stato(StatoScrutinio::Passo7, Utc::now()).unwrap();
        assert_eq!(s.stato, StatoScrutinio::Passo7);
        assert_eq!(s.fine, None);
    }

    #[test]
    fn test_non_aperto_non_torna_indietro() {
        let s = scrutinio(Periodo::Primo, StatoScrutinio::NonAperto);
        assert_eq!(s.stato_precedente(), None);
        let s = scrutinio(Periodo::Primo, StatoScrutinio::Passo1);
        assert_eq!(s.stato_precedente(), Some(StatoScrutinio::NonAperto));
    }
}
