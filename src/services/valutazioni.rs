//! Valutazioni services - Registrazione dei voti e medie per materia

use super::accesso::carica_alunno_accessibile;
use crate::core::{AppError, AppState, require_docente};
use crate::dtos::{CreateValutazioneDTO, MediaDTO, ValutazioneDTO, ValutazioniQuery};
use crate::entities::valutazione::media_voti;
use crate::entities::{Ruolo, Utente};
use crate::repositories::{Create, Delete, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_valutazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateValutazioneDTO>,
) -> Result<Json<ValutazioneDTO>, AppError> {
    debug!("Recording grade");
    // 1. Validare voto (in quarti) e giudizio
    // 2. Il docente deve avere una cattedra attiva nella classe per la materia
    // 3. L'alunno deve appartenere alla classe indicata
    body.valida()?;
    require_docente(&current_user)?;

    if !state
        .cattedra
        .esiste_attiva(&current_user.id, &body.classe_id, &body.materia_id)
        .await?
    {
        warn!(
            "Teacher {} has no active assignment for class {} and subject {}",
            current_user.id, body.classe_id, body.materia_id
        );
        return Err(AppError::forbidden("You do not teach this subject in this class"));
    }

    let alunno = carica_alunno_accessibile(&state, &current_user, &body.alunno_id).await?;
    if alunno.classe_id != Some(body.classe_id) {
        return Err(AppError::bad_request("Student does not belong to the class"));
    }

    body.docente_id = current_user.id;
    let valutazione = state.valutazione.create(&body).await?;
    info!("Grade recorded with id {}", valutazione.id);
    Ok(Json(ValutazioneDTO::from(valutazione)))
}

/// Voti dell'alunno; famiglie e alunni vedono solo quelli resi visibili
#[instrument(skip(state, current_user, filtro), fields(utente_id = %current_user.id))]
pub async fn list_valutazioni_alunno(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(alunno_id): Path<i32>,
    Query(filtro): Query<ValutazioniQuery>,
) -> Result<Json<Vec<ValutazioneDTO>>, AppError> {
    debug!("Listing grades of student");
    carica_alunno_accessibile(&state, &current_user, &alunno_id).await?;

    let solo_visibili = matches!(current_user.ruolo, Ruolo::Alunno | Ruolo::Genitore);
    let valutazioni = state
        .valutazione
        .find_by_alunno(&alunno_id, &filtro, solo_visibili)
        .await?;

    info!("Found {} grades", valutazioni.len());
    Ok(Json(valutazioni.into_iter().map(ValutazioneDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path((alunno_id, materia_id)): Path<(i32, i32)>,
) -> Result<Json<MediaDTO>, AppError> {
    debug!("Computing subject average");
    carica_alunno_accessibile(&state, &current_user, &alunno_id).await?;

    let valutazioni = state
        .valutazione
        .find_by_alunno_materia(&alunno_id, &materia_id)
        .await?;

    let media = media_voti(&valutazioni);
    let voti = valutazioni
        .iter()
        .filter(|v| v.visibile && v.media && v.voto.is_some_and(|voto| voto > 0.0))
        .count();

    Ok(Json(MediaDTO {
        alunno_id,
        materia_id,
        media,
        voti,
    }))
}

/// Cancella un voto: solo il docente che lo ha inserito
#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn delete_valutazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(valutazione_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    require_docente(&current_user)?;
    let valutazione = state
        .valutazione
        .read(&valutazione_id)
        .await?
        .ok_or_else(|| AppError::not_found("Grade not found"))?;

    if valutazione.docente_id != current_user.id {
        warn!("Teacher {} tried to delete grade {}", current_user.id, valutazione_id);
        return Err(AppError::forbidden("Only the author can delete a grade"));
    }

    state.valutazione.delete(&valutazione_id).await?;
    info!("Grade {} deleted", valutazione_id);
    Ok(StatusCode::NO_CONTENT)
}
