//! Auth services - Login e profilo dell'utente autenticato

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{LoginDTO, UpdateUtenteDTO, UtenteDTO};
use crate::entities::Utente;
use crate::repositories::Update;
use axum::{
    Extension,
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const DURATA_SESSIONE_SECS: i64 = 24 * 60 * 60;

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Fail-fast se mancano le credenziali, prima di interrogare il db
    // 2. Cercare l'utente per username e verificare la password (stesso errore per entrambi i casi)
    // 3. Un utente disabilitato non può accedere anche con la password corretta
    // 4. Registrare l'ultimo accesso, generare il JWT e restituirlo in header e cookie

    if body.username.is_empty() || body.password.is_empty() {
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let utente = match state.utente.find_by_username(&body.username).await? {
        Some(utente) if utente.verify_password(&body.password) => utente,
        _ => {
            warn!("Invalid credentials");
            return Err(AppError::unauthorized("Invalid username or password"));
        }
    };

    if !utente.abilitato {
        warn!("Login attempt for disabled user");
        return Err(AppError::forbidden("User is disabled"));
    }

    let now = Utc::now();
    state.utente.aggiorna_ultimo_accesso(&utente.id, now).await?;

    let token = encode_jwt(
        utente.username.clone(),
        utente.id,
        utente.ruolo,
        &state.jwt_secret,
    )?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token, DURATA_SESSIONE_SECS
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie_value)
            .map_err(|_| AppError::internal_server_error("Invalid token"))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Invalid token"))?,
    );

    let mut utente = utente;
    utente.ultimo_accesso = Some(now);
    info!("User {} logged in", utente.id);
    Ok((StatusCode::OK, headers, Json(UtenteDTO::from(utente))))
}

#[instrument(skip(current_user), fields(utente_id = %current_user.id))]
pub async fn get_me(Extension(current_user): Extension<Utente>) -> Json<UtenteDTO> {
    Json(UtenteDTO::from(current_user))
}

/// L'utente aggiorna i propri recapiti e la password; l'abilitazione resta all'amministratore
#[instrument(skip(state, current_user, body), fields(utente_id = %current_user.id))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<Utente>,
    Json(body): Json<UpdateUtenteDTO>,
) -> Result<Json<UtenteDTO>, AppError> {
    debug!("Updating own profile");
    body.validate()?;

    if body.abilitato.is_some() {
        warn!("User tried to change own enabled flag");
        return Err(AppError::forbidden("You cannot enable or disable yourself"));
    }

    let password = match body.password {
        Some(ref password) => Some(
            Utente::hash_password(password)
                .map_err(|_| AppError::internal_server_error("Failed to hash password"))?,
        ),
        None => None,
    };
    let aggiornamento = UpdateUtenteDTO { password, ..body };

    let utente = state.utente.update(&current_user.id, &aggiornamento).await?;
    info!("Profile updated");
    Ok(Json(UtenteDTO::from(utente)))
}
