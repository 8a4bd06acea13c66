//! Alunno entity - Utente con ruolo ALUNNO

use super::enums::{Bes, Religione};
use super::utente::Utente;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Età dalla quale l'alunno può giustificare da sé assenze e ritardi
pub const MAGGIORE_ETA: u32 = 18;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Alunno {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub utente: Utente,
    pub bes: Bes,
    pub note_bes: Option<String>,
    pub autorizza_entrata: Option<String>,
    pub autorizza_uscita: Option<String>,
    pub note: Option<String>,
    pub frequenza_estero: bool,
    pub religione: Religione,
    pub credito3: Option<i32>,
    pub credito4: Option<i32>,
    pub giustifica_online: bool,
    pub richiesta_certificato: bool,
    pub foto: Option<String>,
    pub classe_id: Option<i32>,
}

impl Alunno {
    pub fn is_maggiorenne(&self, oggi: NaiveDate) -> bool {
        self.utente.eta(oggi).is_some_and(|eta| eta >= MAGGIORE_ETA)
    }

    pub fn has_bes(&self) -> bool {
        self.bes != Bes::Nessuno
    }

    /// Crediti scolastici degli anni precedenti (terzo e quarto anno)
    pub fn credito_pregresso(&self) -> i32 {
        self.credito3.unwrap_or(0) + self.credito4.unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::enums::Ruolo;
    use crate::entities::utente::tests::utente_di_prova;

    pub(crate) fn alunno_di_prova(id: i32, classe_id: i32) -> Alunno {
        Alunno {
            utente: utente_di_prova(id, Ruolo::Alunno),
            bes: Bes::Nessuno,
            note_bes: None,
            autorizza_entrata: None,
            autorizza_uscita: None,
            note: None,
            frequenza_estero: false,
            religione: Religione::Si,
            credito3: None,
            credito4: None,
            giustifica_online: true,
            richiesta_certificato: false,
            foto: None,
            classe_id: Some(classe_id),
        }
    }

    #[test]
    fn test_maggiorenne() {
        let alunno = alunno_di_prova(10, 1);
        assert!(!alunno.is_maggiorenne(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(alunno.is_maggiorenne(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()));
    }

    #[test]
    fn test_bes_e_crediti() {
        let mut alunno = alunno_di_prova(10, 1);
        assert!(!alunno.has_bes());
        alunno.bes = Bes::Dsa;
        assert!(alunno.has_bes());
        alunno.credito3 = Some(10);
        assert_eq!(alunno.credito_pregresso(), 10);
        alunno.credito4 = Some(11);
        assert_eq!(alunno.credito_pregresso(), 21);
    }

    #[test]
    fn test_json_appiattito() {
        let alunno = alunno_di_prova(10, 3);
        let json = serde_json::to_value(&alunno).unwrap();
        assert_eq!(json["username"], "utente10");
        assert_eq!(json["ruolo"], "ALUNNO");
        assert_eq!(json["classe_id"], 3);
    }
}
