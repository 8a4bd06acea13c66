//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica area del registro.

pub mod accesso;
pub mod admin;
pub mod auth;
pub mod classi;
pub mod comunicazioni;
pub mod disciplina;
pub mod docenti;
pub mod presenze;
pub mod scrutini;
pub mod valutazioni;

// Re-exports per facilitare l'import
pub use admin::{
    create_alunno, create_amministratore, create_ata, create_cattedra, create_classe,
    create_configurazione, create_corso, create_docente, create_esito, create_genitore,
    create_materia, create_scrutinio, create_sede, create_storico, create_voto_scrutinio,
    get_parametro, list_configurazione, update_classe, update_configurazione, update_utente,
};
pub use auth::{get_me, login_user, update_me};
pub use classi::{get_classe, list_alunni_classe, list_classi};
pub use comunicazioni::{
    archivia_comunicazione, create_allegato, create_avviso, create_circolare, create_documento,
    get_bacheca, list_allegati, pubblica_comunicazione,
};
pub use disciplina::{create_annotazione, create_nota, list_annotazioni_classe, list_note_classe};
pub use docenti::{crea_chiavi, get_chiavi};
pub use presenze::{
    create_assenza, create_entrata, create_uscita, get_presenze_alunno, giustifica_assenza,
    giustifica_entrata, giustifica_uscita,
};
pub use scrutini::{
    cambia_stato_scrutinio, create_proposta, get_scrutinio, get_storico_alunno,
    list_esiti_scrutinio, list_proposte_classe, list_voti_scrutinio,
};
pub use valutazioni::{
    create_valutazione, delete_valutazione, get_media, list_valutazioni_alunno,
};

use crate::core::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
