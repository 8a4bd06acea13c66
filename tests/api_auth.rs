//! Integration tests per autenticazione e profilo
//!
//! Test per:
//! - GET /
//! - POST /auth/login
//! - GET/PATCH /utenti/me
//! - POST /admin/{docenti,genitori,ata,amministratori}
//!
//! I test con `#[sqlx::test]` creano un database isolato, applicano le migrations
//! e i fixtures indicati; richiedono `DATABASE_URL`.

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use axum_test::http::HeaderName;
    use registro::entities::Ruolo;
    use serde_json::json;
    use sqlx::MySqlPool;

    fn authorization() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    // ============================================================
    // Test senza database: il middleware risponde prima delle query
    // ============================================================

    #[tokio::test]
    async fn test_root() {
        let server = create_test_server(create_lazy_state());
        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text("Server is running!");
    }

    #[tokio::test]
    async fn test_senza_header_authorization() {
        let server = create_test_server(create_lazy_state());
        server.get("/utenti/me").await.assert_status_forbidden();
        server.get("/comunicazioni").await.assert_status_forbidden();
        server.post("/admin/sedi").json(&json!({})).await.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_token_non_valido() {
        let server = create_test_server(create_lazy_state());

        server
            .get("/utenti/me")
            .add_header(authorization(), "Bearer garbage")
            .await
            .assert_status_unauthorized();

        // schema diverso da Bearer
        server
            .get("/utenti/me")
            .add_header(authorization(), "Basic YWRtaW46YWRtaW4=")
            .await
            .assert_status_unauthorized();

        // token firmato con un altro segreto
        let altro = registro::core::encode_jwt(
            "admin".to_string(),
            1,
            Ruolo::Amministratore,
            "un-altro-segreto",
        )
        .unwrap();
        server
            .get("/utenti/me")
            .add_header(authorization(), format!("Bearer {}", altro))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_login_credenziali_vuote() {
        let server = create_test_server(create_lazy_state());
        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "", "password": "" }))
            .await;
        response.assert_status_unauthorized();
    }

    // ============================================================
    // Test per POST /auth/login - login_user
    // ============================================================

    async fn crea_alunno(server: &axum_test::TestServer, username: &str, abilitato: bool) {
        server
            .post("/admin/alunni")
            .add_header(authorization(), bearer(1, "admin", Ruolo::Amministratore))
            .json(&json!({
                "utente": {
                    "username": username,
                    "password": "Registro2025",
                    "email": format!("{}@scuola.it", username),
                    "nome": "Marta",
                    "cognome": "Porcu",
                    "sesso": "F",
                    "data_nascita": "2010-05-04",
                    "abilitato": abilitato
                },
                "bes": "NESSUNO",
                "religione": "SI",
                "classe_id": 1
            }))
            .await
            .assert_status_ok();
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_login_success(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        crea_alunno(&server, "m.porcu", true).await;

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "m.porcu", "password": "Registro2025" }))
            .await;

        response.assert_status_ok();

        let cookie = response.header("set-cookie");
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));

        let authorization_header = response.header("authorization");
        let token = authorization_header.to_str().unwrap();
        assert!(token.starts_with("Bearer "));

        let utente: serde_json::Value = response.json();
        assert_eq!(utente["username"], "m.porcu");
        assert_eq!(utente["ruolo"], "ALUNNO");
        assert!(utente.get("password").is_none());
        assert!(!utente["ultimo_accesso"].is_null());

        // il token restituito apre le route protette
        let me = server
            .get("/utenti/me")
            .add_header(authorization(), token.to_string())
            .await;
        me.assert_status_ok();
        let me: serde_json::Value = me.json();
        assert_eq!(me["username"], "m.porcu");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_login_password_errata(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        crea_alunno(&server, "m.porcu", true).await;

        server
            .post("/auth/login")
            .json(&json!({ "username": "m.porcu", "password": "sbagliata" }))
            .await
            .assert_status_unauthorized();

        // utente inesistente: stesso errore
        server
            .post("/auth/login")
            .json(&json!({ "username": "nessuno", "password": "Registro2025" }))
            .await
            .assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_login_utente_disabilitato(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        crea_alunno(&server, "m.porcu", false).await;

        server
            .post("/auth/login")
            .json(&json!({ "username": "m.porcu", "password": "Registro2025" }))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    // ============================================================
    // Test per /utenti/me
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_token_utente_inesistente(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/utenti/me")
            .add_header(authorization(), bearer(999, "fantasma", Ruolo::Docente))
            .await
            .assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_update_me(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let token = bearer(20, "d.melis", Ruolo::Docente);

        let response = server
            .patch("/utenti/me")
            .add_header(authorization(), token.clone())
            .json(&json!({ "email": "davide.melis@scuola.it" }))
            .await;
        response.assert_status_ok();
        let utente: serde_json::Value = response.json();
        assert_eq!(utente["email"], "davide.melis@scuola.it");

        // l'abilitazione resta all'amministratore
        server
            .patch("/utenti/me")
            .add_header(authorization(), token)
            .json(&json!({ "abilitato": false }))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_utente_disabilitato_dall_amministratore(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .patch("/admin/utenti/21")
            .add_header(authorization(), bearer(1, "admin", Ruolo::Amministratore))
            .json(&json!({ "abilitato": false }))
            .await
            .assert_status_ok();

        // il token resta valido ma l'utente viene riletto ad ogni richiesta
        server
            .get("/utenti/me")
            .add_header(authorization(), bearer(21, "d.serra", Ruolo::Docente))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    // ============================================================
    // Test per POST /admin/* - account per ruolo
    // ============================================================

    fn admin() -> String {
        bearer(1, "admin", Ruolo::Amministratore)
    }

    fn utente(username: &str) -> serde_json::Value {
        json!({
            "username": username,
            "password": "Registro2025",
            "email": format!("{}@scuola.it", username),
            "nome": "Paola",
            "cognome": "Mura",
            "sesso": "F",
            "abilitato": true
        })
    }

    /// Login con la password di prova, restituisce il ruolo dell'utente
    async fn ruolo_dopo_login(server: &axum_test::TestServer, username: &str) -> serde_json::Value {
        let response = server
            .post("/auth/login")
            .json(&json!({ "username": username, "password": "Registro2025" }))
            .await;
        response.assert_status_ok();
        let utente: serde_json::Value = response.json();
        utente["ruolo"].clone()
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_create_docente(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/admin/docenti")
            .add_header(authorization(), admin())
            .json(&json!({
                "utente": utente("p.mura"),
                "ruolo": "STAFF",
                "responsabile_bes": true,
                "responsabile_bes_sede_id": 1,
                "sede_id": 1
            }))
            .await;
        response.assert_status_ok();
        let docente: serde_json::Value = response.json();
        assert_eq!(docente["ruolo"], "STAFF");
        assert_eq!(docente["responsabile_bes"], true);
        assert_eq!(ruolo_dopo_login(&server, "p.mura").await, "STAFF");

        // un docente non può avere un ruolo da alunno
        server
            .post("/admin/docenti")
            .add_header(authorization(), admin())
            .json(&json!({ "utente": utente("p.mura2"), "ruolo": "ALUNNO" }))
            .await
            .assert_status_bad_request();

        // username già usato
        server
            .post("/admin/docenti")
            .add_header(authorization(), admin())
            .json(&json!({ "utente": utente("p.mura"), "ruolo": "DOCENTE" }))
            .await
            .assert_status_conflict();

        // solo l'amministratore crea account
        server
            .post("/admin/docenti")
            .add_header(authorization(), bearer(2, "s.pinna", Ruolo::Staff))
            .json(&json!({ "utente": utente("p.mura3"), "ruolo": "DOCENTE" }))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_create_genitore(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/admin/genitori")
            .add_header(authorization(), admin())
            .json(&json!({
                "utente": utente("p.loi"),
                "giustifica_online": true,
                "alunno_id": 10
            }))
            .await
            .assert_status_ok();
        assert_eq!(ruolo_dopo_login(&server, "p.loi").await, "GENITORE");

        // il nuovo genitore vede le presenze del figlio
        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "p.loi", "password": "Registro2025" }))
            .await;
        let token = response.header("authorization").to_str().unwrap().to_string();
        server
            .get("/alunni/10/presenze")
            .add_header(authorization(), token)
            .await
            .assert_status_ok();

        // l'alunno collegato deve esistere
        server
            .post("/admin/genitori")
            .add_header(authorization(), admin())
            .json(&json!({ "utente": utente("p.nessuno"), "alunno_id": 99 }))
            .await
            .assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_create_ata_e_amministratore(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/admin/ata")
            .add_header(authorization(), admin())
            .json(&json!({
                "utente": utente("r.usai"),
                "tipo_ata": "AMMINISTRATIVO",
                "segreteria": true,
                "sede_id": 1
            }))
            .await
            .assert_status_ok();
        assert_eq!(ruolo_dopo_login(&server, "r.usai").await, "ATA");

        let response = server
            .post("/admin/amministratori")
            .add_header(authorization(), admin())
            .json(&utente("m.atzeni"))
            .await;
        response.assert_status_ok();
        let amministratore: serde_json::Value = response.json();
        assert_eq!(amministratore["ruolo"], "AMMINISTRATORE");
        assert!(amministratore.get("password").is_none());
        assert_eq!(ruolo_dopo_login(&server, "m.atzeni").await, "AMMINISTRATORE");

        Ok(())
    }
}
