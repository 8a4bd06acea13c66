//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella `gs_*`; utenti e comunicazioni usano
//! l'ereditarietà a tabella singola con una struct per specializzazione.

pub mod alunno;
pub mod allegato;
pub mod annotazione;
pub mod assenza;
pub mod ata;
pub mod cattedra;
pub mod classe;
pub mod comunicazione;
pub mod configurazione;
pub mod corso;
pub mod docente;
pub mod entrata;
pub mod enums;
pub mod esito;
pub mod genitore;
pub mod giustificazione;
pub mod materia;
pub mod nota;
pub mod proposta_voto;
pub mod scrutinio;
pub mod sede;
pub mod storico;
pub mod timestamps;
pub mod uscita;
pub mod utente;
pub mod valutazione;
pub mod voto_scrutinio;

// Re-exports per facilitare l'import
pub use alunno::Alunno;
pub use allegato::Allegato;
pub use annotazione::Annotazione;
pub use assenza::Assenza;
pub use ata::Ata;
pub use cattedra::Cattedra;
pub use classe::Classe;
pub use comunicazione::{Avviso, Circolare, Comunicazione, Documento, ProfiloDestinatario};
pub use configurazione::Configurazione;
pub use corso::Corso;
pub use docente::{ChiaviAccesso, Docente};
pub use entrata::Entrata;
pub use enums::*;
pub use esito::Esito;
pub use genitore::Genitore;
pub use giustificazione::{ErroreGiustificazione, Giustificazione};
pub use materia::Materia;
pub use nota::Nota;
pub use proposta_voto::PropostaVoto;
pub use scrutinio::{ErroreScrutinio, Scrutinio, StatoScrutinio};
pub use sede::Sede;
pub use storico::{StoricoEsito, StoricoVoto};
pub use timestamps::Timestamps;
pub use uscita::Uscita;
pub use utente::Utente;
pub use valutazione::Valutazione;
pub use voto_scrutinio::VotoScrutinio;
