//! Disciplina services - Note disciplinari e annotazioni sul registro di classe

use super::accesso::verifica_docente_classe;
use crate::core::{AppError, AppState, require_docente};
use crate::dtos::{CreateAnnotazioneDTO, CreateNotaDTO, NotaDTO};
use crate::entities::{Annotazione, Ruolo, Utente};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, classe_id = %body.classe_id))]
pub async fn create_nota(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateNotaDTO>,
) -> Result<Json<NotaDTO>, AppError> {
    debug!("Creating disciplinary note");
    // 1. Validare testo e coerenza tra tipo di nota e alunni coinvolti
    // 2. Solo un docente della classe può scrivere la nota
    // 3. Gli alunni coinvolti devono appartenere alla classe
    // 4. Salvare nota e alunni nella stessa transazione
    body.valida()?;
    require_docente(&current_user)?;
    verifica_docente_classe(&state, &current_user, &body.classe_id).await?;

    if !body.alunni.is_empty() {
        let iscritti: Vec<i32> = state
            .alunno
            .find_by_classe(&body.classe_id)
            .await?
            .into_iter()
            .map(|a| a.utente.id)
            .collect();
        if let Some(estraneo) = body.alunni.iter().find(|id| !iscritti.contains(id)) {
            warn!("Student {} is not in class {}", estraneo, body.classe_id);
            return Err(AppError::bad_request("Student does not belong to the class"));
        }
    }

    body.docente_id = current_user.id;
    let nota = state.nota.create(&body).await?;
    info!("Note created with id {}", nota.id);
    Ok(Json(NotaDTO {
        nota,
        alunni: body.alunni,
    }))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_note_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(classe_id): Path<i32>,
) -> Result<Json<Vec<NotaDTO>>, AppError> {
    debug!("Listing notes of class");
    verifica_docente_classe(&state, &current_user, &classe_id).await?;

    let note = state.nota.find_by_classe(&classe_id).await?;
    let ids: Vec<i32> = note.iter().map(|n| n.id).collect();
    let mut alunni_per_nota: HashMap<i32, Vec<i32>> = HashMap::new();
    for (nota_id, alunno_id) in state.nota.find_alunni(&ids).await? {
        alunni_per_nota.entry(nota_id).or_default().push(alunno_id);
    }

    let note: Vec<NotaDTO> = note
        .into_iter()
        .map(|nota| NotaDTO {
            alunni: alunni_per_nota.remove(&nota.id).unwrap_or_default(),
            nota,
        })
        .collect();
    info!("Found {} notes", note.len());
    Ok(Json(note))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, classe_id = %body.classe_id))]
pub async fn create_annotazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateAnnotazioneDTO>,
) -> Result<Json<Annotazione>, AppError> {
    debug!("Creating annotation");
    body.validate()?;
    require_docente(&current_user)?;
    verifica_docente_classe(&state, &current_user, &body.classe_id).await?;

    body.docente_id = current_user.id;
    let annotazione = state.annotazione.create(&body).await?;
    info!("Annotation created with id {}", annotazione.id);
    Ok(Json(annotazione))
}

/// Annotazioni della classe: i docenti le vedono tutte, alunni e famiglie solo quelle visibili
#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_annotazioni_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(classe_id): Path<i32>,
) -> Result<Json<Vec<Annotazione>>, AppError> {
    let solo_visibili = match current_user.ruolo {
        Ruolo::Docente | Ruolo::Staff | Ruolo::Preside => {
            verifica_docente_classe(&state, &current_user, &classe_id).await?;
            false
        }
        Ruolo::Alunno | Ruolo::Genitore => {
            let alunno_id = match current_user.ruolo {
                Ruolo::Genitore => state
                    .genitore
                    .read(&current_user.id)
                    .await?
                    .and_then(|g| g.alunno_id),
                _ => Some(current_user.id),
            };
            let classe_alunno = match alunno_id {
                Some(id) => state.alunno.read(&id).await?.and_then(|a| a.classe_id),
                None => None,
            };
            if classe_alunno != Some(classe_id) {
                return Err(AppError::forbidden("You cannot access this class"));
            }
            true
        }
        _ => return Err(AppError::forbidden("Insufficient role")),
    };

    let annotazioni = state
        .annotazione
        .find_by_classe(&classe_id, solo_visibili)
        .await?;
    debug!("Found {} annotations", annotazioni.len());
    Ok(Json(annotazioni))
}
