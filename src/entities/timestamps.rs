//! Timestamps - Istanti di creazione e ultima modifica comuni a tutte le entità
//!
//! I valori sono assegnati esclusivamente dal livello di persistenza: `pre_persist`
//! prima di un INSERT e `pre_update` prima di ogni UPDATE. Nessun DTO li espone in input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Timestamps {
    pub creato: DateTime<Utc>,
    pub modificato: DateTime<Utc>,
}

impl Timestamps {
    /// Timestamps di una nuova entità: creazione e modifica coincidono
    pub fn pre_persist(now: DateTime<Utc>) -> Self {
        Self {
            creato: now,
            modificato: now,
        }
    }

    /// Aggiorna l'istante di modifica, `creato` resta invariato
    pub fn pre_update(&mut self, now: DateTime<Utc>) {
        // l'orologio del server potrebbe tornare indietro: la modifica non precede mai la creazione
        self.modificato = now.max(self.creato);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_pre_persist_imposta_entrambi() {
        let now = Utc::now();
        let ts = Timestamps::pre_persist(now);
        assert_eq!(ts.creato, now);
        assert_eq!(ts.modificato, now);
    }

    #[test]
    fn test_pre_update_modifica_solo_modificato() {
        let creato = Utc::now();
        let mut ts = Timestamps::pre_persist(creato);
        let dopo = creato + Duration::minutes(5);
        ts.pre_update(dopo);
        assert_eq!(ts.creato, creato);
        assert_eq!(ts.modificato, dopo);
    }

    #[test]
    fn test_pre_update_non_precede_creazione() {
        let creato = Utc::now();
        let mut ts = Timestamps::pre_persist(creato);
        ts.pre_update(creato - Duration::hours(1));
        assert_eq!(ts.modificato, creato);
    }
}
