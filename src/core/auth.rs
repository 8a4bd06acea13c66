use crate::core::{AppError, AppState};
use crate::entities::{Ruolo, Utente};
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub username: String,
    pub ruolo: Ruolo,
}

#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(username: String, id: i32, ruolo: Ruolo, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username,
        id,
        ruolo,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data: TokenData<Claims>| {
        debug!("JWT token decoded successfully for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Verifica il token `Bearer` e inserisce l'`Utente` corrente nelle extension della richiesta
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden(
                "Please add the JWT token to the header",
            ));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(bearer), Some(token)) if bearer.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Malformed authorization header");
            return Err(AppError::unauthorized("Unable to decode token"));
        }
    };

    let token_data = decode_jwt(token, &state.jwt_secret).map_err(|_| {
        warn!("Failed to decode JWT token");
        AppError::unauthorized("Unable to decode token")
    })?;

    // l'utente viene riletto: ruolo e abilitazione possono essere cambiati dopo il login
    let current_user = match state
        .utente
        .find_by_username(&token_data.claims.username)
        .await?
    {
        Some(utente) if utente.abilitato => {
            debug!("User authenticated: {}", utente.username);
            utente
        }
        Some(utente) => {
            warn!("Disabled user tried to access: {}", utente.username);
            return Err(AppError::forbidden("User is disabled"));
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.username);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Helper function per verificare che l'utente abbia uno dei ruoli richiesti
///
/// # Arguments
/// * `utente` - L'utente autenticato
/// * `ruoli` - Lista di ruoli permessi
///
/// # Returns
/// * `Ok(())` se il ruolo è permesso
/// * `Err(AppError)` (403) se il ruolo non è tra quelli permessi
pub fn require_ruolo(utente: &Utente, ruoli: &[Ruolo]) -> Result<(), AppError> {
    if !ruoli.contains(&utente.ruolo) {
        warn!(
            "User {} has insufficient role {:?}, required one of: {:?}",
            utente.id, utente.ruolo, ruoli
        );
        return Err(AppError::forbidden("Insufficient role").with_details(format!(
            "This action requires one of the following roles: {:?}",
            ruoli
        )));
    }
    Ok(())
}

/// Docenti, staff e preside
pub fn require_docente(utente: &Utente) -> Result<(), AppError> {
    require_ruolo(utente, &[Ruolo::Docente, Ruolo::Staff, Ruolo::Preside])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const SEGRETO: &str = "segreto-di-prova";

    #[test]
    fn test_jwt_andata_e_ritorno() {
        let token = encode_jwt("m.rossi".to_string(), 7, Ruolo::Docente, SEGRETO).unwrap();
        let data = decode_jwt(&token, SEGRETO).unwrap();
        assert_eq!(data.claims.id, 7);
        assert_eq!(data.claims.username, "m.rossi");
        assert_eq!(data.claims.ruolo, Ruolo::Docente);
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_jwt_segreto_errato() {
        let token = encode_jwt("m.rossi".to_string(), 7, Ruolo::Docente, SEGRETO).unwrap();
        assert!(decode_jwt(&token, "altro-segreto").is_err());
        assert!(decode_jwt("non-un-token", SEGRETO).is_err());
    }

    #[test]
    fn test_require_ruolo() {
        let mut utente = crate::entities::utente::tests::utente_di_prova(3, Ruolo::Genitore);
        assert!(require_ruolo(&utente, &[Ruolo::Genitore, Ruolo::Alunno]).is_ok());

        let err = require_docente(&utente).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        utente.ruolo = Ruolo::Staff;
        assert!(require_docente(&utente).is_ok());
    }
}
