//! Scrutini services - Avanzamento dello scrutinio e proposte di voto

use super::accesso::{carica_alunno_accessibile, verifica_docente_classe};
use crate::core::{AppError, AppState, require_docente};
use crate::dtos::{CambiaStatoDTO, CreatePropostaVotoDTO, ProposteQuery};
use crate::entities::{Esito, PropostaVoto, Ruolo, Scrutinio, StoricoEsito, Utente, VotoScrutinio};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

async fn carica_scrutinio(state: &AppState, scrutinio_id: &i32) -> Result<Scrutinio, AppError> {
    state
        .scrutinio
        .read(scrutinio_id)
        .await?
        .ok_or_else(|| AppError::not_found("Scrutiny not found"))
}

/// Staff e preside guidano qualsiasi scrutinio, il docente solo quello della classe che coordina
fn puo_condurre(utente: &Utente, coordinatore_id: Option<i32>) -> bool {
    match utente.ruolo {
        Ruolo::Staff | Ruolo::Preside => true,
        Ruolo::Docente => coordinatore_id == Some(utente.id),
        _ => false,
    }
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn get_scrutinio(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(scrutinio_id): Path<i32>,
) -> Result<Json<Scrutinio>, AppError> {
    let scrutinio = carica_scrutinio(&state, &scrutinio_id).await?;
    verifica_docente_classe(&state, &current_user, &scrutinio.classe_id).await?;
    Ok(Json(scrutinio))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, stato = ?body.stato))]
pub async fn cambia_stato_scrutinio(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(scrutinio_id): Path<i32>,
    Json(body): Json<CambiaStatoDTO>,
) -> Result<Json<Scrutinio>, AppError> {
    debug!("Changing scrutiny state");
    // 1. Caricare lo scrutinio e la sua classe
    // 2. Solo staff, preside o coordinatore della classe possono spostarlo
    // 3. La transizione è ammessa solo verso un passo adiacente
    let mut scrutinio = carica_scrutinio(&state, &scrutinio_id).await?;
    let classe = state
        .classe
        .read(&scrutinio.classe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Class not found"))?;

    if !puo_condurre(&current_user, classe.coordinatore_id) {
        warn!("User {} cannot lead scrutiny {}", current_user.id, scrutinio_id);
        return Err(AppError::forbidden("Only staff or the class coordinator can lead the scrutiny"));
    }

    let now = Utc::now();
    let precedente = scrutinio.stato;
    scrutinio.cambia_stato(body.stato, now)?;
    scrutinio.timestamps.pre_update(now);
    if !state.scrutinio.salva_stato(&scrutinio, precedente).await? {
        return Err(AppError::conflict("Scrutiny state was changed by another request"));
    }

    info!("Scrutiny {} moved to {:?}", scrutinio.id, scrutinio.stato);
    Ok(Json(scrutinio))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_voti_scrutinio(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(scrutinio_id): Path<i32>,
) -> Result<Json<Vec<VotoScrutinio>>, AppError> {
    let scrutinio = carica_scrutinio(&state, &scrutinio_id).await?;
    verifica_docente_classe(&state, &current_user, &scrutinio.classe_id).await?;
    let voti = state.voto_scrutinio.find_by_scrutinio(&scrutinio_id).await?;
    debug!("Found {} final grades", voti.len());
    Ok(Json(voti))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_esiti_scrutinio(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(scrutinio_id): Path<i32>,
) -> Result<Json<Vec<Esito>>, AppError> {
    let scrutinio = carica_scrutinio(&state, &scrutinio_id).await?;
    verifica_docente_classe(&state, &current_user, &scrutinio.classe_id).await?;
    let esiti = state.esito.find_by_scrutinio(&scrutinio_id).await?;
    debug!("Found {} outcomes", esiti.len());
    Ok(Json(esiti))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_proposta(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreatePropostaVotoDTO>,
) -> Result<Json<PropostaVoto>, AppError> {
    debug!("Submitting grade proposal");
    // 1. Il docente deve insegnare la materia nella classe
    // 2. L'alunno deve appartenere alla classe
    // 3. Lo scrutinio del periodo, se già creato, non deve essere chiuso
    body.validate()?;
    require_docente(&current_user)?;

    if !state
        .cattedra
        .esiste_attiva(&current_user.id, &body.classe_id, &body.materia_id)
        .await?
    {
        return Err(AppError::forbidden("You do not teach this subject in this class"));
    }

    let alunno = state
        .alunno
        .read(&body.alunno_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;
    if alunno.classe_id != Some(body.classe_id) {
        return Err(AppError::bad_request("Student does not belong to the class"));
    }

    let chiuso = state
        .scrutinio
        .find_by_classe(&body.classe_id)
        .await?
        .iter()
        .any(|s| s.periodo == body.periodo && s.is_chiuso());
    if chiuso {
        warn!("Proposal for closed scrutiny of class {}", body.classe_id);
        return Err(AppError::conflict("Scrutiny is already closed"));
    }

    body.docente_id = current_user.id;
    let proposta = state.proposta.create(&body).await?;
    info!("Proposal {} saved", proposta.id);
    Ok(Json(proposta))
}

/// Proposte della classe per il periodo: il docente vede le proprie, chi conduce lo scrutinio tutte
#[instrument(skip(state, current_user, query), fields(utente_id = %current_user.id))]
pub async fn list_proposte_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(classe_id): Path<i32>,
    Query(query): Query<ProposteQuery>,
) -> Result<Json<Vec<PropostaVoto>>, AppError> {
    verifica_docente_classe(&state, &current_user, &classe_id).await?;
    let classe = state
        .classe
        .read(&classe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Class not found"))?;

    let docente_id = if puo_condurre(&current_user, classe.coordinatore_id) {
        None
    } else {
        Some(current_user.id)
    };
    let proposte = state
        .proposta
        .find_by_classe(&classe_id, query.periodo, docente_id)
        .await?;

    info!("Found {} proposals", proposte.len());
    Ok(Json(proposte))
}

/// Esito dell'anno precedente archiviato per l'alunno
#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn get_storico_alunno(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(alunno_id): Path<i32>,
) -> Result<Json<StoricoEsito>, AppError> {
    carica_alunno_accessibile(&state, &current_user, &alunno_id).await?;
    state
        .storico
        .find_by_alunno(&alunno_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("No archived outcome for student"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::utente::tests::utente_di_prova;

    #[test]
    fn test_conduzione_scrutinio() {
        let staff = utente_di_prova(2, Ruolo::Staff);
        let coordinatore = utente_di_prova(30, Ruolo::Docente);
        let genitore = utente_di_prova(3, Ruolo::Genitore);

        assert!(puo_condurre(&staff, None));
        assert!(puo_condurre(&coordinatore, Some(30)));
        assert!(!puo_condurre(&coordinatore, Some(31)));
        assert!(!puo_condurre(&coordinatore, None));
        assert!(!puo_condurre(&genitore, Some(3)));
    }
}
