//! Classi services - Classi visibili all'utente e relativi alunni

use super::accesso::{classi_del_docente, verifica_docente_classe};
use crate::core::{AppError, AppState};
use crate::dtos::{AlunnoDTO, ClasseDTO};
use crate::entities::{Classe, Ruolo, Utente};
use crate::repositories::{Read, ReadMany};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Classi dell'utente corrente
///
/// Staff, preside e amministratore vedono tutte le classi, il docente quelle in cui
/// insegna o che coordina, alunno e genitore la classe dell'alunno.
#[instrument(skip(state, current_user), fields(utente_id = %current_user.id, ruolo = ?current_user.ruolo))]
pub async fn list_classi(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
) -> Result<Json<Vec<ClasseDTO>>, AppError> {
    debug!("Listing classes for user");
    let classi: Vec<Classe> = match current_user.ruolo {
        Ruolo::Amministratore | Ruolo::Staff | Ruolo::Preside => state.classe.find_all().await?,
        Ruolo::Docente => {
            let ids = classi_del_docente(&state, &current_user.id).await?;
            state.classe.read_many(&ids).await?
        }
        Ruolo::Alunno => {
            let classe_id = state
                .alunno
                .read(&current_user.id)
                .await?
                .and_then(|a| a.classe_id);
            match classe_id {
                Some(id) => state.classe.read(&id).await?.into_iter().collect(),
                None => Vec::new(),
            }
        }
        Ruolo::Genitore => {
            let figlio_id = state
                .genitore
                .read(&current_user.id)
                .await?
                .and_then(|g| g.alunno_id);
            let classe_id = match figlio_id {
                Some(id) => state.alunno.read(&id).await?.and_then(|a| a.classe_id),
                None => None,
            };
            match classe_id {
                Some(id) => state.classe.read(&id).await?.into_iter().collect(),
                None => Vec::new(),
            }
        }
        Ruolo::Ata => Vec::new(),
    };

    info!("Found {} classes", classi.len());
    Ok(Json(classi.into_iter().map(ClasseDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn get_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(classe_id): Path<i32>,
) -> Result<Json<ClasseDTO>, AppError> {
    if current_user.ruolo != Ruolo::Amministratore {
        verifica_docente_classe(&state, &current_user, &classe_id).await?;
    }
    let classe = state
        .classe
        .read(&classe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Class not found"))?;
    Ok(Json(ClasseDTO::from(classe)))
}

/// Elenco alunni della classe, riservato ai docenti che vi lavorano
#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_alunni_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(classe_id): Path<i32>,
) -> Result<Json<Vec<AlunnoDTO>>, AppError> {
    verifica_docente_classe(&state, &current_user, &classe_id).await?;
    let alunni = state.alunno.find_by_classe(&classe_id).await?;
    debug!("Found {} students", alunni.len());
    Ok(Json(alunni.into_iter().map(AlunnoDTO::from).collect()))
}
