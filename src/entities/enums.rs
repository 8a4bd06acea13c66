//! Enumerazioni - Tipi enumerati utilizzati nelle entità
//!
//! Ogni enum corrisponde a una colonna `ENUM(...)` dello schema MySQL: il nome
//! della variante in SCREAMING_SNAKE_CASE è il valore memorizzato nel database
//! ed è anche la rappresentazione JSON verso il client.

use serde::{Deserialize, Serialize};

// ********************* UTENTI **********************//

/// Discriminatore della tabella `gs_utente`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ruolo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ruolo {
    Amministratore,
    Alunno,
    Genitore,
    Docente,
    Staff,
    Preside,
    Ata,
}

impl Ruolo {
    /// Ruoli che condividono le colonne del docente (staff e preside sono docenti)
    pub fn is_docente(&self) -> bool {
        matches!(self, Ruolo::Docente | Ruolo::Staff | Ruolo::Preside)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "sesso", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Sesso {
    M,
    F,
}

/// Bisogni educativi speciali dell'alunno
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "bes", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bes {
    Nessuno,
    Disabilita,
    Dsa,
    Altro,
}

/// Scelta dell'alunno riguardo all'insegnamento della religione
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "religione", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Religione {
    Si,
    Uscita,
    Individuale,
    Docente,
    Alternativa,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_ata", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAta {
    Amministrativo,
    Tecnico,
    Collaboratore,
    UfficioTecnico,
    Dsga,
}

// ********************* STRUTTURA SCOLASTICA **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_materia", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMateria {
    Normale,
    Religione,
    Sostegno,
    Condotta,
    Supplenza,
    EducazioneCivica,
}

/// Modalità di valutazione di una materia
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_valutazione_materia", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalitaValutazione {
    Numerica,
    Giudizio,
    Assente,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_cattedra", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoCattedra {
    Normale,
    Itp,
    Potenziamento,
    Alternativa,
}

// ********************* DISCIPLINA E VALUTAZIONI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_nota", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoNota {
    Classe,
    Individuale,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_valutazione", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoValutazione {
    Scritto,
    Orale,
    Pratico,
}

/// Periodo dell'anno scolastico a cui si riferisce uno scrutinio
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "periodo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Periodo {
    Primo,
    Secondo,
    Finale,
    GiudizioSospeso,
    Rinviato,
    Integrativo,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "recupero", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoRecupero {
    Corso,
    Sportello,
    Studio,
    PausaDidattica,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "esito", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoEsito {
    Ammesso,
    NonAmmesso,
    Sospeso,
    Rinviato,
    LimiteAssenze,
    Estero,
    NonScrutinato,
}

/// Stato di sincronizzazione dello scrutinio con i sistemi ministeriali
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "sincronizzazione", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sincronizzazione {
    Esportato,
    Convalidato,
    Bloccato,
}

// ********************* COMUNICAZIONI **********************//

/// Discriminatore della tabella `gs_comunicazione`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "categoria", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Categoria {
    Circolare,
    Avviso,
    Documento,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "stato_comunicazione", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatoComunicazione {
    Bozza,
    Pubblicato,
    Archiviato,
}

/// Modalità di filtro dei destinatari di una comunicazione
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "filtro")]
pub enum Filtro {
    /// nessun destinatario
    #[sqlx(rename = "N")]
    #[serde(rename = "N")]
    Nessuno,
    /// tutti i destinatari delle sedi indicate
    #[sqlx(rename = "T")]
    #[serde(rename = "T")]
    Tutti,
    #[sqlx(rename = "C")]
    #[serde(rename = "C")]
    Classi,
    #[sqlx(rename = "M")]
    #[serde(rename = "M")]
    Materie,
    #[sqlx(rename = "U")]
    #[serde(rename = "U")]
    Utenti,
}

/// Destinatari speciali (organi collegiali e figure di sistema)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinatarioSpeciale {
    Dsga,
    Rspp,
    Rsu,
    ConsiglioIstituto,
    ConsultaProvinciale,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_avviso", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAvviso {
    Comunicazione,
    Entrata,
    Uscita,
    Attivita,
    Individuale,
    Verifica,
    Compito,
    Docenti,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tipo_documento", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoDocumento {
    PianoLavoro,
    Programma,
    Relazione,
    Maggio,
    Pei,
    Pdp,
    Bes,
    Generico,
    Circolare,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruoli_docente() {
        assert!(Ruolo::Docente.is_docente());
        assert!(Ruolo::Staff.is_docente());
        assert!(Ruolo::Preside.is_docente());
        assert!(!Ruolo::Ata.is_docente());
        assert!(!Ruolo::Genitore.is_docente());
    }

    #[test]
    fn test_serializzazione_json() {
        assert_eq!(
            serde_json::to_string(&TipoMateria::EducazioneCivica).unwrap(),
            "\"EDUCAZIONE_CIVICA\""
        );
        assert_eq!(serde_json::to_string(&Filtro::Classi).unwrap(), "\"C\"");
        let esito: TipoEsito = serde_json::from_str("\"NON_AMMESSO\"").unwrap();
        assert_eq!(esito, TipoEsito::NonAmmesso);
    }

    #[test]
    fn test_valore_non_ammesso_rifiutato() {
        // i campi a scelta chiusa rifiutano valori fuori dall'insieme
        assert!(serde_json::from_str::<Sesso>("\"X\"").is_err());
        assert!(serde_json::from_str::<Filtro>("\"Z\"").is_err());
    }
}
