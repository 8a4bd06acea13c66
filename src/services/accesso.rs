//! Controlli di accesso comuni ai service
//!
//! Chi può vedere i dati di un alunno:
//! - l'alunno stesso e il suo genitore
//! - i docenti con una cattedra attiva nella sua classe o che la coordinano
//! - staff, preside e amministratore

use crate::core::{AppError, AppState};
use crate::entities::{Alunno, Ruolo, Utente};
use crate::repositories::Read;
use tracing::{debug, warn};

/// Classi in cui il docente insegna (cattedre attive) o di cui è coordinatore
pub async fn classi_del_docente(state: &AppState, docente_id: &i32) -> Result<Vec<i32>, AppError> {
    let mut classi: Vec<i32> = state
        .cattedra
        .find_attive_by_docente(docente_id)
        .await?
        .into_iter()
        .map(|c| c.classe_id)
        .collect();
    classi.extend(
        state
            .classe
            .find_by_coordinatore(docente_id)
            .await?
            .into_iter()
            .map(|c| c.id),
    );
    classi.sort_unstable();
    classi.dedup();
    Ok(classi)
}

/// Regola di visibilità dei dati di un alunno, senza accesso al database
///
/// * `classe_alunno` - classe attuale dell'alunno
/// * `figlio_id` - per un genitore, l'alunno a cui è collegato
/// * `classi_docente` - per un docente, le classi restituite da `classi_del_docente`
pub fn consente_accesso_alunno(
    utente: &Utente,
    alunno_id: i32,
    classe_alunno: Option<i32>,
    figlio_id: Option<i32>,
    classi_docente: &[i32],
) -> bool {
    match utente.ruolo {
        Ruolo::Amministratore | Ruolo::Staff | Ruolo::Preside => true,
        Ruolo::Alunno => utente.id == alunno_id,
        Ruolo::Genitore => figlio_id == Some(alunno_id),
        Ruolo::Docente => classe_alunno.is_some_and(|classe| classi_docente.contains(&classe)),
        Ruolo::Ata => false,
    }
}

/// Carica l'alunno (404 se inesistente) e verifica che l'utente possa vederne i dati (403)
pub async fn carica_alunno_accessibile(
    state: &AppState,
    utente: &Utente,
    alunno_id: &i32,
) -> Result<Alunno, AppError> {
    let alunno = state
        .alunno
        .read(alunno_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    let figlio_id = match utente.ruolo {
        Ruolo::Genitore => state
            .genitore
            .read(&utente.id)
            .await?
            .and_then(|g| g.alunno_id),
        _ => None,
    };
    let classi_docente = match utente.ruolo {
        Ruolo::Docente => classi_del_docente(state, &utente.id).await?,
        _ => Vec::new(),
    };

    if !consente_accesso_alunno(
        utente,
        *alunno_id,
        alunno.classe_id,
        figlio_id,
        &classi_docente,
    ) {
        warn!("User {} cannot access student {}", utente.id, alunno_id);
        return Err(AppError::forbidden("You cannot access this student"));
    }
    debug!("Access to student {} granted", alunno_id);
    Ok(alunno)
}

/// Verifica che un docente lavori nella classe; staff e preside sono sempre ammessi
pub async fn verifica_docente_classe(
    state: &AppState,
    utente: &Utente,
    classe_id: &i32,
) -> Result<(), AppError> {
    match utente.ruolo {
        Ruolo::Staff | Ruolo::Preside => Ok(()),
        Ruolo::Docente => {
            if classi_del_docente(state, &utente.id).await?.contains(classe_id) {
                Ok(())
            } else {
                warn!("Teacher {} does not teach in class {}", utente.id, classe_id);
                Err(AppError::forbidden("You do not teach in this class"))
            }
        }
        _ => Err(AppError::forbidden("Insufficient role")),
    }
}
