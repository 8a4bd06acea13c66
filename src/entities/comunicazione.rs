//! Comunicazione entity - Circolari, avvisi e documenti
//!
//! `gs_comunicazione` è mappata con ereditarietà a tabella singola, discriminata dalla
//! colonna `categoria`. `Comunicazione` contiene i campi comuni e i filtri dei destinatari,
//! `Circolare`, `Avviso` e `Documento` la includono con `#[sqlx(flatten)]`.

use super::enums::{
    Categoria, DestinatarioSpeciale, Filtro, Ruolo, StatoComunicazione, TipoAta, TipoAvviso,
    TipoDocumento,
};
use super::timestamps::Timestamps;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Comunicazione {
    pub id: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub categoria: Categoria,
    pub titolo: String,
    pub data: NaiveDate,
    /// Anno scolastico (anno di inizio)
    pub anno: i32,
    pub stato: StatoComunicazione,
    // sedi interessate, vuoto = tutte
    pub sedi: Json<Vec<i32>>,
    pub speciali: Json<Vec<DestinatarioSpeciale>>,
    pub ata: Json<Vec<TipoAta>>,
    pub coordinatori: Filtro,
    pub filtro_coordinatori: Json<Vec<i32>>,
    pub docenti: Filtro,
    pub filtro_docenti: Json<Vec<i32>>,
    pub genitori: Filtro,
    pub filtro_genitori: Json<Vec<i32>>,
    pub alunni: Filtro,
    pub filtro_alunni: Json<Vec<i32>>,
    // destinatari esterni, indicati per nome
    pub esterni: Json<Vec<String>>,
    pub autore_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Circolare {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comunicazione: Comunicazione,
    // progressivo per anno scolastico
    pub numero: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Avviso {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comunicazione: Comunicazione,
    pub tipo_avviso: TipoAvviso,
    pub ora: Option<NaiveTime>,
    pub ora_fine: Option<NaiveTime>,
    pub cattedra_id: Option<i32>,
    pub materia_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Documento {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comunicazione: Comunicazione,
    pub tipo_documento: TipoDocumento,
    pub classe_id: Option<i32>,
    pub materia_id: Option<i32>,
    pub alunno_id: Option<i32>,
    pub cifrato: bool,
}

/// Dati del possibile destinatario necessari a valutare i filtri di una comunicazione
#[derive(Debug, Clone)]
pub struct ProfiloDestinatario {
    pub utente_id: i32,
    pub ruolo: Ruolo,
    // sedi di appartenenza, vuoto = tutte (es. preside)
    pub sedi: Vec<i32>,
    // classe dell'alunno o del figlio, classi di cattedra del docente
    pub classi: Vec<i32>,
    pub materie: Vec<i32>,
    pub classi_coordinate: Vec<i32>,
    pub tipo_ata: Option<TipoAta>,
    pub speciali: Vec<DestinatarioSpeciale>,
}

impl ProfiloDestinatario {
    pub fn new(utente_id: i32, ruolo: Ruolo) -> Self {
        Self {
            utente_id,
            ruolo,
            sedi: Vec::new(),
            classi: Vec::new(),
            materie: Vec::new(),
            classi_coordinate: Vec::new(),
            tipo_ata: None,
            speciali: Vec::new(),
        }
    }
}

fn interseca(a: &[i32], b: &[i32]) -> bool {
    a.iter().any(|x| b.contains(x))
}

impl Comunicazione {
    pub fn is_pubblicata(&self) -> bool {
        self.stato == StatoComunicazione::Pubblicato
    }

    /// Decide se la comunicazione raggiunge il destinatario indicato
    ///
    /// L'autore vede sempre le proprie comunicazioni, anche in bozza; per tutti gli
    /// altri vale solo lo stato pubblicato. Il preside riceve tutte le comunicazioni.
    pub fn destinata_a(&self, profilo: &ProfiloDestinatario) -> bool {
        if self.autore_id == Some(profilo.utente_id) {
            return true;
        }
        if !self.is_pubblicata() {
            return false;
        }
        if profilo.speciali.iter().any(|s| self.speciali.contains(s)) {
            return true;
        }

        let in_sede = self.sedi.is_empty()
            || profilo.sedi.is_empty()
            || interseca(&profilo.sedi, &self.sedi);

        match profilo.ruolo {
            Ruolo::Preside => true,
            Ruolo::Alunno => corrisponde(self.alunni, &self.filtro_alunni, profilo, in_sede),
            Ruolo::Genitore => corrisponde(self.genitori, &self.filtro_genitori, profilo, in_sede),
            Ruolo::Docente | Ruolo::Staff => {
                corrisponde(self.docenti, &self.filtro_docenti, profilo, in_sede)
                    || self.destinata_a_coordinatore(profilo, in_sede)
            }
            Ruolo::Ata => in_sede && profilo.tipo_ata.is_some_and(|tipo| self.ata.contains(&tipo)),
            Ruolo::Amministratore => false,
        }
    }

    fn destinata_a_coordinatore(&self, profilo: &ProfiloDestinatario, in_sede: bool) -> bool {
        if profilo.classi_coordinate.is_empty() {
            return false;
        }
        match self.coordinatori {
            Filtro::Tutti => in_sede,
            Filtro::Classi => interseca(&self.filtro_coordinatori, &profilo.classi_coordinate),
            Filtro::Nessuno | Filtro::Materie | Filtro::Utenti => false,
        }
    }
}

fn corrisponde(filtro: Filtro, valori: &[i32], profilo: &ProfiloDestinatario, in_sede: bool) -> bool {
    match filtro {
        Filtro::Nessuno => false,
        Filtro::Tutti => in_sede,
        Filtro::Classi => interseca(valori, &profilo.classi),
        Filtro::Materie => interseca(valori, &profilo.materie),
        Filtro::Utenti => valori.contains(&profilo.utente_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn circolare() -> Comunicazione {
        Comunicazione {
            id: 1,
            timestamps: Timestamps::pre_persist(Utc::now()),
            categoria: Categoria::Circolare,
            titolo: "Assemblea di istituto".to_string(),
            data: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            anno: 2025,
            stato: StatoComunicazione::Pubblicato,
            sedi: Json(vec![1]),
            speciali: Json(vec![]),
            ata: Json(vec![]),
            coordinatori: Filtro::Nessuno,
            filtro_coordinatori: Json(vec![]),
            docenti: Filtro::Nessuno,
            filtro_docenti: Json(vec![]),
            genitori: Filtro::Nessuno,
            filtro_genitori: Json(vec![]),
            alunni: Filtro::Nessuno,
            filtro_alunni: Json(vec![]),
            esterni: Json(vec![]),
            autore_id: Some(99),
        }
    }

    fn alunno(id: i32, sede: i32, classe: i32) -> ProfiloDestinatario {
        let mut profilo = ProfiloDestinatario::new(id, Ruolo::Alunno);
        profilo.sedi = vec![sede];
        profilo.classi = vec![classe];
        profilo
    }

    #[test]
    fn test_bozza_visibile_solo_all_autore() {
        let mut c = circolare();
        c.stato = StatoComunicazione::Bozza;
        c.alunni = Filtro::Tutti;
        assert!(!c.destinata_a(&alunno(10, 1, 3)));
        assert!(c.destinata_a(&ProfiloDestinatario::new(99, Ruolo::Docente)));
    }

    #[test]
    fn test_filtro_tutti_rispetta_la_sede() {
        let mut c = circolare();
        c.alunni = Filtro::Tutti;
        assert!(c.destinata_a(&alunno(10, 1, 3)));
        assert!(!c.destinata_a(&alunno(11, 2, 7)));
    }

    #[test]
    fn test_filtro_classi() {
        let mut c = circolare();
        c.genitori = Filtro::Classi;
        c.filtro_genitori = Json(vec![3, 4]);
        let mut genitore = ProfiloDestinatario::new(20, Ruolo::Genitore);
        genitore.classi = vec![4];
        assert!(c.destinata_a(&genitore));
        genitore.classi = vec![5];
        assert!(!c.destinata_a(&genitore));
        // il filtro dei genitori non vale per gli alunni
        assert!(!c.destinata_a(&alunno(10, 1, 4)));
    }

    #[test]
    fn test_filtro_materie_e_utenti_docenti() {
        let mut c = circolare();
        c.docenti = Filtro::Materie;
        c.filtro_docenti = Json(vec![8]);
        let mut docente = ProfiloDestinatario::new(30, Ruolo::Docente);
        docente.materie = vec![2, 8];
        assert!(c.destinata_a(&docente));

        c.docenti = Filtro::Utenti;
        c.filtro_docenti = Json(vec![31]);
        assert!(!c.destinata_a(&docente));
        docente.utente_id = 31;
        assert!(c.destinata_a(&docente));
    }

    #[test]
    fn test_coordinatori() {
        let mut c = circolare();
        c.coordinatori = Filtro::Classi;
        c.filtro_coordinatori = Json(vec![3]);
        let mut docente = ProfiloDestinatario::new(30, Ruolo::Staff);
        assert!(!c.destinata_a(&docente));
        docente.classi_coordinate = vec![3];
        assert!(c.destinata_a(&docente));

        c.coordinatori = Filtro::Tutti;
        docente.sedi = vec![2];
        assert!(!c.destinata_a(&docente));
    }

    #[test]
    fn test_ata_e_speciali() {
        let mut c = circolare();
        c.ata = Json(vec![TipoAta::Tecnico]);
        let mut ata = ProfiloDestinatario::new(40, Ruolo::Ata);
        ata.tipo_ata = Some(TipoAta::Collaboratore);
        assert!(!c.destinata_a(&ata));
        ata.tipo_ata = Some(TipoAta::Tecnico);
        assert!(c.destinata_a(&ata));

        c.speciali = Json(vec![DestinatarioSpeciale::Rsu]);
        let mut rsu = ProfiloDestinatario::new(41, Ruolo::Docente);
        rsu.speciali = vec![DestinatarioSpeciale::Rsu];
        assert!(c.destinata_a(&rsu));
    }

    #[test]
    fn test_preside_e_amministratore() {
        let c = circolare();
        assert!(c.destinata_a(&ProfiloDestinatario::new(1, Ruolo::Preside)));
        assert!(!c.destinata_a(&ProfiloDestinatario::new(2, Ruolo::Amministratore)));
    }
}
