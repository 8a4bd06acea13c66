//! Docenti services - Chiavi di accesso alternativo del docente autenticato

use crate::core::{AppError, AppState, require_docente};
use crate::entities::{ChiaviAccesso, Docente, Utente};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

async fn carica_docente(state: &AppState, utente: &Utente) -> Result<Docente, AppError> {
    require_docente(utente)?;
    state
        .docente
        .read(&utente.id)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher not found"))
}

/// Rigenera le chiavi; quelle precedenti smettono di valere
#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn crea_chiavi(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
) -> Result<Json<ChiaviAccesso>, AppError> {
    debug!("Generating access keys");
    let mut docente = carica_docente(&state, &current_user).await?;
    let chiavi = docente.crea_chiavi();
    state.docente.salva_chiavi(&docente.utente.id, &chiavi).await?;
    info!("Access keys generated");
    Ok(Json(chiavi))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn get_chiavi(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
) -> Result<Json<ChiaviAccesso>, AppError> {
    let docente = carica_docente(&state, &current_user).await?;
    docente
        .recupera_chiavi()
        .map(Json)
        .ok_or_else(|| AppError::not_found("No access keys generated"))
}
