//! Giustificazione - Stato di giustificazione condiviso da assenze, entrate e uscite
//!
//! Una giustificazione può essere:
//! 1. dichiarata online da un genitore o dall'alunno maggiorenne (`utente_giustifica_id`)
//! 2. convalidata da un docente (`docente_giustifica_id`), anche senza dichiarazione online
//!
//! Una volta convalidata non può più essere modificata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Giustificazione {
    pub giustificato: Option<NaiveDate>,
    pub motivazione: Option<String>,
    pub docente_giustifica_id: Option<i32>,
    pub utente_giustifica_id: Option<i32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErroreGiustificazione {
    #[error("already justified")]
    GiaGiustificata,
    #[error("justification already validated by a teacher")]
    GiaConvalidata,
    #[error("a reason is required to justify")]
    MotivazioneMancante,
}

impl Giustificazione {
    pub fn is_giustificato(&self) -> bool {
        self.giustificato.is_some()
    }

    /// Dichiarata online ma non ancora convalidata da un docente
    pub fn is_da_convalidare(&self) -> bool {
        self.utente_giustifica_id.is_some() && self.docente_giustifica_id.is_none()
    }

    /// Giustificazione online da parte di genitore o alunno maggiorenne
    pub fn dichiara(
        &mut self,
        utente_id: i32,
        data: NaiveDate,
        motivazione: &str,
    ) -> Result<(), ErroreGiustificazione> {
        if self.docente_giustifica_id.is_some() {
            return Err(ErroreGiustificazione::GiaConvalidata);
        }
        if self.is_giustificato() {
            return Err(ErroreGiustificazione::GiaGiustificata);
        }
        let motivazione = motivazione.trim();
        if motivazione.is_empty() {
            return Err(ErroreGiustificazione::MotivazioneMancante);
        }
        self.giustificato = Some(data);
        self.motivazione = Some(motivazione.to_string());
        self.utente_giustifica_id = Some(utente_id);
        Ok(())
    }

    /// Convalida da parte del docente: se manca la dichiarazione online serve la motivazione
    pub fn convalida(
        &mut self,
        docente_id: i32,
        data: NaiveDate,
        motivazione: Option<&str>,
    ) -> Result<(), ErroreGiustificazione> {
        if self.docente_giustifica_id.is_some() {
            return Err(ErroreGiustificazione::GiaConvalidata);
        }
        let motivazione = motivazione.map(str::trim).filter(|m| !m.is_empty());
        match (motivazione, &self.motivazione) {
            (Some(m), _) => self.motivazione = Some(m.to_string()),
            (None, Some(_)) => {}
            (None, None) => return Err(ErroreGiustificazione::MotivazioneMancante),
        }
        if self.giustificato.is_none() {
            self.giustificato = Some(data);
        }
        self.docente_giustifica_id = Some(docente_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(giorno: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, giorno).unwrap()
    }

    #[test]
    fn test_dichiarazione_online() {
        let mut g = Giustificazione::default();
        assert!(!g.is_giustificato());
        g.dichiara(7, data(2), "motivi di salute").unwrap();
        assert!(g.is_giustificato());
        assert!(g.is_da_convalidare());
        assert_eq!(g.giustificato, Some(data(2)));
        assert_eq!(g.utente_giustifica_id, Some(7));
    }

    #[test]
    fn test_doppia_dichiarazione_rifiutata() {
        let mut g = Giustificazione::default();
        g.dichiara(7, data(2), "salute").unwrap();
        assert_eq!(
            g.dichiara(7, data(3), "altro"),
            Err(ErroreGiustificazione::GiaGiustificata)
        );
    }

    #[test]
    fn test_motivazione_vuota_rifiutata() {
        let mut g = Giustificazione::default();
        assert_eq!(
            g.dichiara(7, data(2), "   "),
            Err(ErroreGiustificazione::MotivazioneMancante)
        );
        assert_eq!(
            g.convalida(3, data(2), None),
            Err(ErroreGiustificazione::MotivazioneMancante)
        );
        assert_eq!(g, Giustificazione::default());
    }

    #[test]
    fn test_convalida_dichiarazione() {
        let mut g = Giustificazione::default();
        g.dichiara(7, data(2), "salute").unwrap();
        g.convalida(3, data(4), None).unwrap();
        // la data resta quella della dichiarazione
        assert_eq!(g.giustificato, Some(data(2)));
        assert_eq!(g.motivazione.as_deref(), Some("salute"));
        assert_eq!(g.docente_giustifica_id, Some(3));
        assert!(!g.is_da_convalidare());
    }

    #[test]
    fn test_convalida_diretta_e_definitiva() {
        let mut g = Giustificazione::default();
        g.convalida(3, data(4), Some("certificato medico")).unwrap();
        assert_eq!(g.giustificato, Some(data(4)));
        assert_eq!(
            g.convalida(3, data(5), Some("altro")),
            Err(ErroreGiustificazione::GiaConvalidata)
        );
        assert_eq!(
            g.dichiara(7, data(5), "altro"),
            Err(ErroreGiustificazione::GiaConvalidata)
        );
    }
}
