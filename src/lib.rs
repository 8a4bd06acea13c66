//! Registro library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use core::{AppError, AppState, Config, auth};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/utenti", configure_utente_routes(state.clone()))
        .nest("/classi", configure_classe_routes(state.clone()))
        .nest("/alunni", configure_alunno_routes(state.clone()))
        .merge(configure_registro_routes(state.clone()))
        .nest("/scrutini", configure_scrutinio_routes(state.clone()))
        .merge(configure_comunicazione_routes(state.clone()))
        .nest("/docenti", configure_docente_routes(state.clone()))
        .nest("/admin", configure_admin_routes(state.clone()))
        .with_state(state)
}

/// Applica il middleware JWT a un gruppo di routes
fn autenticato(router: Router<Arc<AppState>>, state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    router.layer(middleware::from_fn_with_state(
        state,
        authentication_middleware,
    ))
}

/// Configura le routes di autenticazione (solo login, gli account li crea l'amministratore)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new().route("/login", post(login_user))
}

fn configure_utente_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;
    autenticato(Router::new().route("/me", get(get_me).patch(update_me)), state)
}

/// Configura le routes delle classi e dei registri di classe
fn configure_classe_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_classi))
        .route("/{classe_id}", get(get_classe))
        .route("/{classe_id}/alunni", get(list_alunni_classe))
        .route("/{classe_id}/note", get(list_note_classe))
        .route("/{classe_id}/annotazioni", get(list_annotazioni_classe))
        .route("/{classe_id}/proposte", get(list_proposte_classe));
    autenticato(router, state)
}

/// Configura le routes sui dati del singolo alunno
fn configure_alunno_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/{alunno_id}/presenze", get(get_presenze_alunno))
        .route("/{alunno_id}/valutazioni", get(list_valutazioni_alunno))
        .route("/{alunno_id}/materie/{materia_id}/media", get(get_media))
        .route("/{alunno_id}/storico", get(get_storico_alunno));
    autenticato(router, state)
}

/// Configura le routes di scrittura sul registro: presenze, note, voti e proposte
fn configure_registro_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/assenze", post(create_assenza))
        .route("/assenze/{id}/giustifica", patch(giustifica_assenza))
        .route("/entrate", post(create_entrata))
        .route("/entrate/{id}/giustifica", patch(giustifica_entrata))
        .route("/uscite", post(create_uscita))
        .route("/uscite/{id}/giustifica", patch(giustifica_uscita))
        .route("/note", post(create_nota))
        .route("/annotazioni", post(create_annotazione))
        .route("/valutazioni", post(create_valutazione))
        .route("/valutazioni/{id}", delete(delete_valutazione))
        .route("/proposte", post(create_proposta));
    autenticato(router, state)
}

fn configure_scrutinio_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/{scrutinio_id}", get(get_scrutinio))
        .route("/{scrutinio_id}/stato", patch(cambia_stato_scrutinio))
        .route("/{scrutinio_id}/voti", get(list_voti_scrutinio))
        .route("/{scrutinio_id}/esiti", get(list_esiti_scrutinio));
    autenticato(router, state)
}

/// Configura le routes della bacheca e della redazione delle comunicazioni
fn configure_comunicazione_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/comunicazioni", get(get_bacheca))
        .route(
            "/comunicazioni/{id}/allegati",
            get(list_allegati).post(create_allegato),
        )
        .route("/comunicazioni/{id}/pubblica", patch(pubblica_comunicazione))
        .route("/comunicazioni/{id}/archivia", patch(archivia_comunicazione))
        .route("/circolari", post(create_circolare))
        .route("/avvisi", post(create_avviso))
        .route("/documenti", post(create_documento));
    autenticato(router, state)
}

fn configure_docente_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;
    autenticato(
        Router::new().route("/me/chiavi", get(get_chiavi).post(crea_chiavi)),
        state,
    )
}

/// Configura le routes di amministrazione (anagrafiche, struttura, scrutini, parametri)
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/sedi", post(create_sede))
        .route("/corsi", post(create_corso))
        .route("/materie", post(create_materia))
        .route("/classi", post(create_classe))
        .route("/classi/{classe_id}", patch(update_classe))
        .route("/cattedre", post(create_cattedra))
        .route("/alunni", post(create_alunno))
        .route("/docenti", post(create_docente))
        .route("/genitori", post(create_genitore))
        .route("/ata", post(create_ata))
        .route("/amministratori", post(create_amministratore))
        .route("/utenti/{utente_id}", patch(update_utente))
        .route("/scrutini", post(create_scrutinio))
        .route("/voti-scrutinio", post(create_voto_scrutinio))
        .route("/esiti", post(create_esito))
        .route("/storico", post(create_storico))
        .route(
            "/configurazione",
            get(list_configurazione).post(create_configurazione),
        )
        .route(
            "/configurazione/{parametro}",
            get(get_parametro).patch(update_configurazione),
        );
    autenticato(router, state)
}
