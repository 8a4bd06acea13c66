//! Query DTOs - Data Transfer Objects per i parametri di ricerca

use crate::entities::{Categoria, Periodo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Intervallo di date per filtrare presenze e valutazioni
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct IntervalloQuery {
    #[serde(default)]
    pub dal: Option<NaiveDate>,
    #[serde(default)]
    pub al: Option<NaiveDate>,
}

impl IntervalloQuery {
    pub fn contiene(&self, data: NaiveDate) -> bool {
        self.dal.is_none_or(|dal| data >= dal) && self.al.is_none_or(|al| data <= al)
    }
}

/// Filtro opzionale per materia delle valutazioni
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ValutazioniQuery {
    #[serde(default)]
    pub materia_id: Option<i32>,
    #[serde(default)]
    pub dal: Option<NaiveDate>,
    #[serde(default)]
    pub al: Option<NaiveDate>,
}

/// Periodo delle proposte di voto da elencare
#[derive(Serialize, Deserialize, Debug)]
pub struct ProposteQuery {
    pub periodo: Periodo,
}

/// Categoria facoltativa per restringere la bacheca
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct BachecaQuery {
    #[serde(default)]
    pub categoria: Option<Categoria>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervallo() {
        let d = |g| NaiveDate::from_ymd_opt(2025, 10, g).unwrap();
        let tutto = IntervalloQuery::default();
        assert!(tutto.contiene(d(1)));

        let query = IntervalloQuery {
            dal: Some(d(5)),
            al: Some(d(10)),
        };
        assert!(query.contiene(d(5)));
        assert!(query.contiene(d(10)));
        assert!(!query.contiene(d(4)));
        assert!(!query.contiene(d(11)));
    }
}
