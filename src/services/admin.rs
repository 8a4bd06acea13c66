//! Admin services - Anagrafiche, struttura della scuola, scrutini e configurazione
//!
//! Tutte le operazioni sono riservate all'amministratore. Le password arrivano in chiaro
//! e vengono trasformate in hash bcrypt prima di raggiungere i repository.

use crate::core::{AppError, AppState, require_ruolo};
use crate::dtos::{
    AlunnoDTO, ClasseDTO, CreateAlunnoDTO, CreateAtaDTO, CreateCattedraDTO, CreateClasseDTO,
    CreateConfigurazioneDTO, CreateCorsoDTO, CreateDocenteDTO, CreateEsitoDTO, CreateGenitoreDTO,
    CreateMateriaDTO, CreateScrutinioDTO, CreateSedeDTO, CreateStoricoEsitoDTO, CreateUtenteDTO,
    CreateVotoScrutinioDTO, DocenteDTO, UpdateClasseDTO, UpdateConfigurazioneDTO, UpdateUtenteDTO,
    UtenteDTO, ValoreConfigurazioneDTO,
};
use crate::entities::{
    Cattedra, Configurazione, Corso, Esito, Materia, Ruolo, Scrutinio, Sede, StoricoEsito, Utente,
    VotoScrutinio,
};
use crate::repositories::{Create, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn require_admin(utente: &Utente) -> Result<(), AppError> {
    require_ruolo(utente, &[Ruolo::Amministratore])
}

fn hash_password(password: &str) -> Result<String, AppError> {
    Utente::hash_password(password)
        .map_err(|_| AppError::internal_server_error("Failed to hash password"))
}

fn prepara_utente(utente: &mut CreateUtenteDTO) -> Result<(), AppError> {
    utente.password = hash_password(&utente.password)?;
    Ok(())
}

// ************************* STRUTTURA ************************* //

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_sede(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateSedeDTO>,
) -> Result<Json<Sede>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let sede = state.sede.create(&body).await?;
    info!("Site {} created", sede.id);
    Ok(Json(sede))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_corso(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateCorsoDTO>,
) -> Result<Json<Corso>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let corso = state.corso.create(&body).await?;
    info!("Course {} created", corso.id);
    Ok(Json(corso))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_materia(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateMateriaDTO>,
) -> Result<Json<Materia>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let materia = state.materia.create(&body).await?;
    info!("Subject {} created", materia.id);
    Ok(Json(materia))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateClasseDTO>,
) -> Result<Json<ClasseDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let classe = state.classe.create(&body).await?;
    info!("Class {} created", classe.nome());
    Ok(Json(ClasseDTO::from(classe)))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn update_classe(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(classe_id): Path<i32>,
    Json(body): Json<UpdateClasseDTO>,
) -> Result<Json<ClasseDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;

    // il coordinatore deve essere un docente
    if let Some(coordinatore_id) = body.coordinatore_id {
        if state.docente.read(&coordinatore_id).await?.is_none() {
            return Err(AppError::bad_request("Coordinator must be a teacher"));
        }
    }

    let classe = state.classe.update(&classe_id, &body).await?;
    info!("Class {} updated", classe.id);
    Ok(Json(ClasseDTO::from(classe)))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, docente_id = %body.docente_id))]
pub async fn create_cattedra(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateCattedraDTO>,
) -> Result<Json<Cattedra>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    if state.docente.read(&body.docente_id).await?.is_none() {
        return Err(AppError::bad_request("Teaching assignment requires a teacher"));
    }
    let cattedra = state.cattedra.create(&body).await?;
    info!("Teaching assignment {} created", cattedra.id);
    Ok(Json(cattedra))
}

// ************************* UTENTI ************************* //

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_alunno(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateAlunnoDTO>,
) -> Result<Json<AlunnoDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    prepara_utente(&mut body.utente)?;
    let alunno = state.alunno.create(&body).await?;
    info!("Student {} created", alunno.utente.id);
    Ok(Json(AlunnoDTO::from(alunno)))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, ruolo = ?body.ruolo))]
pub async fn create_docente(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateDocenteDTO>,
) -> Result<Json<DocenteDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    if !matches!(body.ruolo, Ruolo::Docente | Ruolo::Staff | Ruolo::Preside) {
        warn!("Invalid role {:?} for teacher", body.ruolo);
        return Err(AppError::bad_request("Role must be DOCENTE, STAFF or PRESIDE"));
    }
    prepara_utente(&mut body.utente)?;
    let docente = state.docente.create(&body).await?;
    info!("Teacher {} created", docente.utente.id);
    Ok(Json(DocenteDTO::from(docente)))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_genitore(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateGenitoreDTO>,
) -> Result<Json<UtenteDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    if state.alunno.read(&body.alunno_id).await?.is_none() {
        return Err(AppError::bad_request("Parent must be linked to a student"));
    }
    prepara_utente(&mut body.utente)?;
    let genitore = state.genitore.create(&body).await?;
    info!("Parent {} created", genitore.utente.id);
    Ok(Json(UtenteDTO::from(genitore.utente)))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_ata(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateAtaDTO>,
) -> Result<Json<UtenteDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    prepara_utente(&mut body.utente)?;
    let ata = state.ata.create(&body).await?;
    info!("ATA staff member {} created", ata.utente.id);
    Ok(Json(UtenteDTO::from(ata.utente)))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_amministratore(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateUtenteDTO>,
) -> Result<Json<UtenteDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    prepara_utente(&mut body)?;
    let utente = state.utente.create(&body).await?;
    info!("Administrator {} created", utente.id);
    Ok(Json(UtenteDTO::from(utente)))
}

/// Abilitazione, recapiti o reset della password di qualsiasi utente
#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn update_utente(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(utente_id): Path<i32>,
    Json(body): Json<UpdateUtenteDTO>,
) -> Result<Json<UtenteDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    if utente_id == current_user.id && body.abilitato == Some(false) {
        return Err(AppError::bad_request("You cannot disable yourself"));
    }

    let password = match body.password {
        Some(ref password) => Some(hash_password(password)?),
        None => None,
    };
    let aggiornamento = UpdateUtenteDTO { password, ..body };
    let utente = state.utente.update(&utente_id, &aggiornamento).await?;
    info!("User {} updated", utente.id);
    Ok(Json(UtenteDTO::from(utente)))
}

// ************************* SCRUTINI ************************* //

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, classe_id = %body.classe_id))]
pub async fn create_scrutinio(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateScrutinioDTO>,
) -> Result<Json<Scrutinio>, AppError> {
    require_admin(&current_user)?;
    let scrutinio = state.scrutinio.create(&body).await?;
    info!("Scrutiny {} created", scrutinio.id);
    Ok(Json(scrutinio))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, scrutinio_id = %body.scrutinio_id))]
pub async fn create_voto_scrutinio(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateVotoScrutinioDTO>,
) -> Result<Json<VotoScrutinio>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let voto = state.voto_scrutinio.create(&body).await?;
    debug!("Final grade {} recorded", voto.id);
    Ok(Json(voto))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, scrutinio_id = %body.scrutinio_id))]
pub async fn create_esito(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateEsitoDTO>,
) -> Result<Json<Esito>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let esito = state.esito.create(&body).await?;
    debug!("Outcome {} recorded", esito.id);
    Ok(Json(esito))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_storico(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateStoricoEsitoDTO>,
) -> Result<Json<StoricoEsito>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let storico = state.storico.create(&body).await?;
    info!("History {} archived with {} grades", storico.id, body.voti.len());
    Ok(Json(storico))
}

// ************************* CONFIGURAZIONE ************************* //

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_configurazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
) -> Result<Json<Vec<Configurazione>>, AppError> {
    require_admin(&current_user)?;
    Ok(Json(state.configurazione.find_all().await?))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn get_parametro(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(parametro): Path<String>,
) -> Result<Json<ValoreConfigurazioneDTO>, AppError> {
    require_admin(&current_user)?;
    let valore = state
        .configurazione
        .valore(&parametro)
        .await?
        .ok_or_else(|| AppError::not_found("Configuration parameter not found"))?;
    Ok(Json(ValoreConfigurazioneDTO { parametro, valore }))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, parametro = %body.parametro))]
pub async fn create_configurazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<CreateConfigurazioneDTO>,
) -> Result<Json<Configurazione>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;
    let parametro = state.configurazione.create(&body).await?;
    info!("Configuration parameter {} created", parametro.parametro);
    Ok(Json(parametro))
}

/// I parametri gestiti da procedure dedicate non si modificano da qui
#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn update_configurazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(parametro): Path<String>,
    Json(body): Json<UpdateConfigurazioneDTO>,
) -> Result<Json<Configurazione>, AppError> {
    require_admin(&current_user)?;
    let esistente = state
        .configurazione
        .find_by_parametro(&parametro)
        .await?
        .ok_or_else(|| AppError::not_found("Configuration parameter not found"))?;
    if esistente.gestito {
        warn!("Attempt to change managed parameter {}", parametro);
        return Err(AppError::forbidden("Parameter is managed by a dedicated procedure"));
    }

    let aggiornato = state.configurazione.update(&parametro, &body).await?;
    info!("Configuration parameter {} updated", parametro);
    Ok(Json(aggiornato))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::utente::tests::utente_di_prova;

    #[test]
    fn test_solo_amministratore() {
        assert!(require_admin(&utente_di_prova(1, Ruolo::Amministratore)).is_ok());
        let errore = require_admin(&utente_di_prova(2, Ruolo::Preside)).unwrap_err();
        assert_eq!(errore.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_password_in_hash() {
        let mut dto: CreateUtenteDTO = serde_json::from_value(serde_json::json!({
            "username": "m.rossi",
            "password": "segreta",
            "email": "m.rossi@example.it",
            "nome": "Mario",
            "cognome": "Rossi",
            "sesso": "M",
            "data_nascita": null
        }))
        .unwrap();
        prepara_utente(&mut dto).unwrap();
        assert_ne!(dto.password, "segreta");
        assert!(bcrypt::verify("segreta", &dto.password).unwrap());
    }
}
