//! Presenze services - Assenze, ritardi, uscite anticipate e giustificazioni

use super::accesso::{carica_alunno_accessibile, verifica_docente_classe};
use crate::core::{AppError, AppState, require_docente};
use crate::dtos::{
    CreateAssenzaDTO, CreateEntrataDTO, CreateUscitaDTO, GiustificaDTO, IntervalloQuery,
    PresenzeAlunnoDTO,
};
use crate::entities::{Alunno, Assenza, Entrata, Giustificazione, Ruolo, Uscita, Utente};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use sqlx::types::Json as SqlJson;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Chi sta giustificando e con quale modalità
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Giustificante {
    /// Genitore o alunno maggiorenne, online
    Dichiarazione(i32),
    /// Docente che convalida sul registro
    Convalida(i32),
}

/// Determina la modalità di giustificazione consentita all'utente per l'alunno
///
/// L'accesso ai dati dell'alunno deve essere già stato verificato.
pub fn giustificante(
    utente: &Utente,
    alunno: &Alunno,
    genitore_abilitato: bool,
    oggi: NaiveDate,
) -> Result<Giustificante, AppError> {
    match utente.ruolo {
        Ruolo::Docente | Ruolo::Staff | Ruolo::Preside => Ok(Giustificante::Convalida(utente.id)),
        Ruolo::Genitore if genitore_abilitato => Ok(Giustificante::Dichiarazione(utente.id)),
        Ruolo::Alunno
            if alunno.utente.id == utente.id
                && alunno.giustifica_online
                && alunno.is_maggiorenne(oggi) =>
        {
            Ok(Giustificante::Dichiarazione(utente.id))
        }
        _ => Err(AppError::forbidden("You cannot justify for this student")),
    }
}

fn applica(
    giustificazione: &mut Giustificazione,
    chi: Giustificante,
    oggi: NaiveDate,
    body: &GiustificaDTO,
) -> Result<(), AppError> {
    match chi {
        Giustificante::Dichiarazione(utente_id) => giustificazione.dichiara(
            utente_id,
            oggi,
            body.motivazione.as_deref().unwrap_or_default(),
        )?,
        Giustificante::Convalida(docente_id) => {
            giustificazione.convalida(docente_id, oggi, body.motivazione.as_deref())?
        }
    }
    Ok(())
}

async fn prepara_giustificazione(
    state: &AppState,
    current_user: &Utente,
    alunno_id: &i32,
    oggi: NaiveDate,
) -> Result<Giustificante, AppError> {
    let alunno = carica_alunno_accessibile(state, current_user, alunno_id).await?;
    let genitore_abilitato = match current_user.ruolo {
        Ruolo::Genitore => state
            .genitore
            .read(&current_user.id)
            .await?
            .is_some_and(|g| g.giustifica_online),
        _ => false,
    };
    giustificante(current_user, &alunno, genitore_abilitato, oggi)
}

/// Verifica che chi registra sia un docente della classe dell'alunno
async fn verifica_registrazione(
    state: &AppState,
    current_user: &Utente,
    alunno_id: &i32,
) -> Result<(), AppError> {
    require_docente(current_user)?;
    let alunno = state
        .alunno
        .read(alunno_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;
    let classe_id = alunno.classe_id.ok_or_else(|| {
        warn!("Student {} has no class", alunno_id);
        AppError::bad_request("Student is not assigned to a class")
    })?;
    verifica_docente_classe(state, current_user, &classe_id).await
}

// ************************* REGISTRAZIONE ************************* //

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_assenza(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateAssenzaDTO>,
) -> Result<Json<Assenza>, AppError> {
    debug!("Recording absence");
    body.validate()?;
    verifica_registrazione(&state, &current_user, &body.alunno_id).await?;
    body.docente_id = current_user.id;

    // una sola assenza al giorno: il vincolo di unicità restituisce 409
    let assenza = state.assenza.create(&body).await?;
    info!("Absence recorded with id {}", assenza.id);
    Ok(Json(assenza))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_entrata(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateEntrataDTO>,
) -> Result<Json<Entrata>, AppError> {
    debug!("Recording late entry");
    body.validate()?;
    verifica_registrazione(&state, &current_user, &body.alunno_id).await?;
    body.docente_id = current_user.id;

    let entrata = state.entrata.create(&body).await?;
    info!("Late entry recorded with id {}", entrata.id);
    Ok(Json(entrata))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, alunno_id = %body.alunno_id))]
pub async fn create_uscita(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateUscitaDTO>,
) -> Result<Json<Uscita>, AppError> {
    debug!("Recording early exit");
    body.validate()?;
    verifica_registrazione(&state, &current_user, &body.alunno_id).await?;
    body.docente_id = current_user.id;

    let uscita = state.uscita.create(&body).await?;
    info!("Early exit recorded with id {}", uscita.id);
    Ok(Json(uscita))
}

// ************************* CONSULTAZIONE ************************* //

#[instrument(skip(state, current_user, intervallo), fields(utente_id = %current_user.id))]
pub async fn get_presenze_alunno(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(alunno_id): Path<i32>,
    Query(intervallo): Query<IntervalloQuery>,
) -> Result<Json<PresenzeAlunnoDTO>, AppError> {
    debug!("Loading attendance of student");
    carica_alunno_accessibile(&state, &current_user, &alunno_id).await?;

    let (assenze, entrate, uscite) = tokio::try_join!(
        state.assenza.find_by_alunno(&alunno_id, &intervallo),
        state.entrata.find_by_alunno(&alunno_id, &intervallo),
        state.uscita.find_by_alunno(&alunno_id, &intervallo),
    )?;

    let presenze = PresenzeAlunnoDTO::new(alunno_id, assenze, entrate, uscite);
    info!("{} events still to justify", presenze.da_giustificare);
    Ok(Json(presenze))
}

// ************************* GIUSTIFICAZIONE ************************* //

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn giustifica_assenza(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(assenza_id): Path<i32>,
    Json(body): Json<GiustificaDTO>,
) -> Result<Json<Assenza>, AppError> {
    debug!("Justifying absence");
    body.validate()?;
    let mut assenza = state
        .assenza
        .read(&assenza_id)
        .await?
        .ok_or_else(|| AppError::not_found("Absence not found"))?;

    let now = Utc::now();
    let oggi = now.date_naive();
    let chi = prepara_giustificazione(&state, &current_user, &assenza.alunno_id, oggi).await?;
    let precedente = assenza.giustificazione.clone();
    applica(&mut assenza.giustificazione, chi, oggi, &body)?;
    if matches!(chi, Giustificante::Dichiarazione(_)) {
        assenza.dichiarazione = SqlJson(body.dichiarazione);
    }
    assenza.timestamps.pre_update(now);

    if !state.assenza.salva_giustificazione(&assenza, &precedente).await? {
        return Err(AppError::conflict("Absence was justified by another request"));
    }
    info!("Absence {} justified by {:?}", assenza.id, chi);
    Ok(Json(assenza))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn giustifica_entrata(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(entrata_id): Path<i32>,
    Json(body): Json<GiustificaDTO>,
) -> Result<Json<Entrata>, AppError> {
    debug!("Justifying late entry");
    body.validate()?;
    let mut entrata = state
        .entrata
        .read(&entrata_id)
        .await?
        .ok_or_else(|| AppError::not_found("Late entry not found"))?;

    if entrata.ritardo_breve {
        return Err(AppError::bad_request("Short delays do not need a justification"));
    }

    let now = Utc::now();
    let oggi = now.date_naive();
    let chi = prepara_giustificazione(&state, &current_user, &entrata.alunno_id, oggi).await?;
    let precedente = entrata.giustificazione.clone();
    applica(&mut entrata.giustificazione, chi, oggi, &body)?;
    entrata.timestamps.pre_update(now);

    if !state.entrata.salva_giustificazione(&entrata, &precedente).await? {
        return Err(AppError::conflict("Late entry was justified by another request"));
    }
    info!("Late entry {} justified by {:?}", entrata.id, chi);
    Ok(Json(entrata))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn giustifica_uscita(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(uscita_id): Path<i32>,
    Json(body): Json<GiustificaDTO>,
) -> Result<Json<Uscita>, AppError> {
    debug!("Justifying early exit");
    body.validate()?;
    let mut uscita = state
        .uscita
        .read(&uscita_id)
        .await?
        .ok_or_else(|| AppError::not_found("Early exit not found"))?;

    let now = Utc::now();
    let oggi = now.date_naive();
    let chi = prepara_giustificazione(&state, &current_user, &uscita.alunno_id, oggi).await?;
    let precedente = uscita.giustificazione.clone();
    applica(&mut uscita.giustificazione, chi, oggi, &body)?;
    uscita.timestamps.pre_update(now);

    if !state.uscita.salva_giustificazione(&uscita, &precedente).await? {
        return Err(AppError::conflict("Early exit was justified by another request"));
    }
    info!("Early exit {} justified by {:?}", uscita.id, chi);
    Ok(Json(uscita))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::utente::tests::utente_di_prova;
    use crate::entities::{Bes, Religione};
    use axum::http::StatusCode;

    fn alunno(id: i32, giustifica_online: bool) -> Alunno {
        Alunno {
            // nato il 15/03/2007
            utente: utente_di_prova(id, Ruolo::Alunno),
            bes: Bes::Nessuno,
            note_bes: None,
            autorizza_entrata: None,
            autorizza_uscita: None,
            note: None,
            frequenza_estero: false,
            religione: Religione::Si,
            credito3: None,
            credito4: None,
            giustifica_online,
            richiesta_certificato: false,
            foto: None,
            classe_id: Some(1),
        }
    }

    fn data(anno: i32, mese: u32, giorno: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(anno, mese, giorno).unwrap()
    }

    #[test]
    fn test_docente_convalida() {
        let docente = utente_di_prova(2, Ruolo::Docente);
        let chi = giustificante(&docente, &alunno(10, false), false, data(2025, 10, 1)).unwrap();
        assert_eq!(chi, Giustificante::Convalida(2));
    }

    #[test]
    fn test_genitore_dichiara_se_abilitato() {
        let genitore = utente_di_prova(20, Ruolo::Genitore);
        let chi = giustificante(&genitore, &alunno(10, false), true, data(2025, 10, 1)).unwrap();
        assert_eq!(chi, Giustificante::Dichiarazione(20));

        let err = giustificante(&genitore, &alunno(10, false), false, data(2025, 10, 1)).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_alunno_dichiara_solo_se_maggiorenne() {
        let studente = alunno(10, true);
        let minorenne = giustificante(&studente.utente, &studente, false, data(2025, 3, 14));
        assert!(minorenne.is_err());
        let maggiorenne = giustificante(&studente.utente, &studente, false, data(2025, 3, 15));
        assert_eq!(maggiorenne.unwrap(), Giustificante::Dichiarazione(10));

        let non_abilitato = alunno(10, false);
        assert!(giustificante(&non_abilitato.utente, &non_abilitato, false, data(2025, 10, 1)).is_err());
    }

    #[test]
    fn test_applica_dichiarazione_richiede_motivazione() {
        let mut giustificazione = Giustificazione::default();
        let err = applica(
            &mut giustificazione,
            Giustificante::Dichiarazione(20),
            data(2025, 10, 2),
            &GiustificaDTO::default(),
        )
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!giustificazione.is_giustificato());
    }

    #[test]
    fn test_applica_dichiarazione_poi_convalida() {
        let mut giustificazione = Giustificazione::default();
        let body = GiustificaDTO {
            motivazione: Some("Visita medica".to_string()),
            dichiarazione: vec![],
        };
        applica(&mut giustificazione, Giustificante::Dichiarazione(20), data(2025, 10, 2), &body)
            .unwrap();
        assert!(giustificazione.is_da_convalidare());

        applica(
            &mut giustificazione,
            Giustificante::Convalida(2),
            data(2025, 10, 3),
            &GiustificaDTO::default(),
        )
        .unwrap();
        assert_eq!(giustificazione.docente_giustifica_id, Some(2));
        assert_eq!(giustificazione.motivazione.as_deref(), Some("Visita medica"));

        let err = applica(&mut giustificazione, Giustificante::Convalida(3), data(2025, 10, 4), &body)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
