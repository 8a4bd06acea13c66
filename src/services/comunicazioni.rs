//! Comunicazioni services - Bacheca, circolari, avvisi, documenti e allegati
//!
//! La bacheca carica le comunicazioni candidate e le filtra con
//! `Comunicazione::destinata_a` usando il profilo dell'utente corrente.

use crate::core::{AppError, AppState, require_ruolo};
use crate::dtos::{
    AllegatoDTO, BachecaQuery, ComunicazioneDTO, CreateAllegatoDTO, CreateAvvisoDTO,
    CreateCircolareDTO, CreateComunicazioneDTO, CreateDocumentoDTO,
};
use crate::entities::{
    Avviso, Circolare, Comunicazione, DestinatarioSpeciale, Documento, ProfiloDestinatario, Ruolo,
    StatoComunicazione, TipoAta, Utente,
};
use crate::repositories::{Create, Read, ReadMany};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const AUTORI: [Ruolo; 3] = [Ruolo::Docente, Ruolo::Staff, Ruolo::Preside];

/// Raccoglie classi, materie e sedi che decidono quali comunicazioni raggiungono l'utente
pub async fn profilo_destinatario(
    state: &AppState,
    utente: &Utente,
) -> Result<ProfiloDestinatario, AppError> {
    let mut profilo = ProfiloDestinatario::new(utente.id, utente.ruolo);

    match utente.ruolo {
        Ruolo::Docente | Ruolo::Staff => {
            let cattedre = state.cattedra.find_attive_by_docente(&utente.id).await?;
            profilo.classi = cattedre.iter().map(|c| c.classe_id).collect();
            profilo.materie = cattedre.iter().map(|c| c.materia_id).collect();
            profilo.classi_coordinate = state
                .classe
                .find_by_coordinatore(&utente.id)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();

            let mut classi = profilo.classi.clone();
            classi.extend(&profilo.classi_coordinate);
            classi.sort_unstable();
            classi.dedup();
            profilo.sedi = state
                .classe
                .read_many(&classi)
                .await?
                .into_iter()
                .map(|c| c.sede_id)
                .collect();
            if let Some(sede_id) = state.docente.read(&utente.id).await?.and_then(|d| d.sede_id) {
                profilo.sedi.push(sede_id);
            }
        }
        Ruolo::Alunno | Ruolo::Genitore => {
            let alunno_id = match utente.ruolo {
                Ruolo::Genitore => state.genitore.read(&utente.id).await?.and_then(|g| g.alunno_id),
                _ => Some(utente.id),
            };
            let classe_id = match alunno_id {
                Some(id) => state.alunno.read(&id).await?.and_then(|a| a.classe_id),
                None => None,
            };
            if let Some(classe) = match classe_id {
                Some(id) => state.classe.read(&id).await?,
                None => None,
            } {
                profilo.classi.push(classe.id);
                profilo.sedi.push(classe.sede_id);
            }
        }
        Ruolo::Ata => {
            if let Some(ata) = state.ata.read(&utente.id).await? {
                profilo.tipo_ata = Some(ata.tipo_ata);
                profilo.sedi.extend(ata.sede_id);
                if ata.tipo_ata == TipoAta::Dsga {
                    profilo.speciali.push(DestinatarioSpeciale::Dsga);
                }
            }
        }
        Ruolo::Preside | Ruolo::Amministratore => {}
    }

    profilo.sedi.sort_unstable();
    profilo.sedi.dedup();
    Ok(profilo)
}

/// Pubblicazione, archiviazione e allegati spettano all'autore, a staff e preside
fn puo_gestire(utente: &Utente, comunicazione: &Comunicazione) -> bool {
    comunicazione.autore_id == Some(utente.id)
        || matches!(utente.ruolo, Ruolo::Staff | Ruolo::Preside)
}

async fn carica_comunicazione(state: &AppState, id: &i32) -> Result<Comunicazione, AppError> {
    state
        .comunicazione
        .read(id)
        .await?
        .ok_or_else(|| AppError::not_found("Communication not found"))
}

fn prepara(comunicazione: &mut CreateComunicazioneDTO, autore: &Utente) -> Result<(), AppError> {
    comunicazione.valida()?;
    comunicazione.autore_id = Some(autore.id);
    Ok(())
}

#[instrument(skip(state, current_user, query), fields(utente_id = %current_user.id))]
pub async fn get_bacheca(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Query(query): Query<BachecaQuery>,
) -> Result<Json<Vec<ComunicazioneDTO>>, AppError> {
    debug!("Loading board");
    let profilo = profilo_destinatario(&state, &current_user).await?;
    let comunicazioni: Vec<ComunicazioneDTO> = state
        .comunicazione
        .find_bacheca(&current_user.id, query.categoria)
        .await?
        .into_iter()
        .filter(|c| c.destinata_a(&profilo))
        .map(ComunicazioneDTO::from)
        .collect();

    info!("Board has {} communications", comunicazioni.len());
    Ok(Json(comunicazioni))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn list_allegati(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(comunicazione_id): Path<i32>,
) -> Result<Json<Vec<AllegatoDTO>>, AppError> {
    let comunicazione = carica_comunicazione(&state, &comunicazione_id).await?;
    let profilo = profilo_destinatario(&state, &current_user).await?;
    if !comunicazione.destinata_a(&profilo) {
        warn!("Communication {} not addressed to user", comunicazione_id);
        return Err(AppError::forbidden("This communication is not addressed to you"));
    }

    let allegati = state
        .allegato
        .find_by_comunicazione(&comunicazione_id)
        .await?;
    debug!("Found {} attachments", allegati.len());
    Ok(Json(allegati.into_iter().map(AllegatoDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_circolare(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateCircolareDTO>,
) -> Result<Json<Circolare>, AppError> {
    debug!("Creating circular");
    require_ruolo(&current_user, &[Ruolo::Staff, Ruolo::Preside])?;
    prepara(&mut body.comunicazione, &current_user)?;

    if body.numero == 0 {
        body.numero = state
            .circolare
            .prossimo_numero(&body.comunicazione.anno)
            .await?;
    }

    let circolare = state.circolare.create(&body).await?;
    info!("Circular {} created with number {}", circolare.comunicazione.id, circolare.numero);
    Ok(Json(circolare))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, tipo = ?body.tipo_avviso))]
pub async fn create_avviso(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateAvvisoDTO>,
) -> Result<Json<Avviso>, AppError> {
    debug!("Creating notice");
    require_ruolo(&current_user, &AUTORI)?;
    prepara(&mut body.comunicazione, &current_user)?;

    if let (Some(ora), Some(ora_fine)) = (body.ora, body.ora_fine) {
        if ora_fine < ora {
            return Err(AppError::bad_request("End time precedes start time"));
        }
    }

    let avviso = state.avviso.create(&body).await?;
    info!("Notice created with id {}", avviso.comunicazione.id);
    Ok(Json(avviso))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id, tipo = ?body.tipo_documento))]
pub async fn create_documento(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(mut body): Json<CreateDocumentoDTO>,
) -> Result<Json<Documento>, AppError> {
    debug!("Creating document");
    require_ruolo(&current_user, &AUTORI)?;
    prepara(&mut body.comunicazione, &current_user)?;

    let documento = state.documento.create(&body).await?;
    info!("Document created with id {}", documento.comunicazione.id);
    Ok(Json(documento))
}

#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn create_allegato(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(comunicazione_id): Path<i32>,
    Json(mut body): Json<CreateAllegatoDTO>,
) -> Result<Json<AllegatoDTO>, AppError> {
    body.validate()?;
    let comunicazione = carica_comunicazione(&state, &comunicazione_id).await?;
    if !puo_gestire(&current_user, &comunicazione) {
        return Err(AppError::forbidden("You cannot modify this communication"));
    }

    body.comunicazione_id = comunicazione_id;
    let allegato = state.allegato.create(&body).await?;
    info!("Attachment {} added", allegato.id);
    Ok(Json(AllegatoDTO::from(allegato)))
}

async fn cambia_stato(
    state: &AppState,
    utente: &Utente,
    comunicazione_id: i32,
    stato: StatoComunicazione,
) -> Result<Json<ComunicazioneDTO>, AppError> {
    let mut comunicazione = carica_comunicazione(state, &comunicazione_id).await?;
    if !puo_gestire(utente, &comunicazione) {
        warn!("User {} cannot change communication {}", utente.id, comunicazione_id);
        return Err(AppError::forbidden("You cannot modify this communication"));
    }
    if comunicazione.stato == StatoComunicazione::Archiviato {
        return Err(AppError::conflict("Communication is archived"));
    }

    comunicazione.stato = stato;
    comunicazione.timestamps.pre_update(Utc::now());
    state.comunicazione.aggiorna_stato(&comunicazione).await?;
    info!("Communication {} now {:?}", comunicazione_id, stato);
    Ok(Json(ComunicazioneDTO::from(comunicazione)))
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn pubblica_comunicazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(comunicazione_id): Path<i32>,
) -> Result<Json<ComunicazioneDTO>, AppError> {
    cambia_stato(&state, &current_user, comunicazione_id, StatoComunicazione::Pubblicato).await
}

#[instrument(skip(state, current_user), fields(utente_id = %current_user.id))]
pub async fn archivia_comunicazione(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Path(comunicazione_id): Path<i32>,
) -> Result<Json<ComunicazioneDTO>, AppError> {
    cambia_stato(&state, &current_user, comunicazione_id, StatoComunicazione::Archiviato).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::utente::tests::utente_di_prova;
    use crate::entities::{Categoria, Filtro, Timestamps};
    use chrono::{NaiveDate, Utc};
    use sqlx::types::Json as SqlJson;

    fn bozza(autore_id: i32) -> Comunicazione {
        Comunicazione {
            id: 7,
            timestamps: Timestamps::pre_persist(Utc::now()),
            categoria: Categoria::Avviso,
            titolo: "Verifica di matematica".to_string(),
            data: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            anno: 2025,
            stato: StatoComunicazione::Bozza,
            sedi: SqlJson(vec![]),
            speciali: SqlJson(vec![]),
            ata: SqlJson(vec![]),
            coordinatori: Filtro::Nessuno,
            filtro_coordinatori: SqlJson(vec![]),
            docenti: Filtro::Nessuno,
            filtro_docenti: SqlJson(vec![]),
            genitori: Filtro::Nessuno,
            filtro_genitori: SqlJson(vec![]),
            alunni: Filtro::Classi,
            filtro_alunni: SqlJson(vec![1]),
            esterni: SqlJson(vec![]),
            autore_id: Some(autore_id),
        }
    }

    #[test]
    fn test_gestione_riservata_ad_autore_e_staff() {
        let comunicazione = bozza(30);
        assert!(puo_gestire(&utente_di_prova(30, Ruolo::Docente), &comunicazione));
        assert!(puo_gestire(&utente_di_prova(2, Ruolo::Staff), &comunicazione));
        assert!(puo_gestire(&utente_di_prova(1, Ruolo::Preside), &comunicazione));
        assert!(!puo_gestire(&utente_di_prova(31, Ruolo::Docente), &comunicazione));
        assert!(!puo_gestire(&utente_di_prova(10, Ruolo::Alunno), &comunicazione));
    }

    #[test]
    fn test_prepara_imposta_autore() {
        let mut dto: CreateComunicazioneDTO = serde_json::from_value(serde_json::json!({
            "titolo": "Uscita didattica",
            "data": "2025-11-20",
            "anno": 2025,
            "autore_id": 99
        }))
        .unwrap();
        let docente = utente_di_prova(30, Ruolo::Docente);
        prepara(&mut dto, &docente).unwrap();
        assert_eq!(dto.autore_id, Some(30));

        dto.alunni = Filtro::Classi;
        assert!(prepara(&mut dto, &docente).is_err());
    }
}
