//! Integration tests per la bacheca e la redazione delle comunicazioni
//!
//! Nel fixture `registro` la staff s.pinna (id 2) ha scritto tre circolari:
//! 1. pubblicata per tutti i docenti e per genitori e alunni della 1A (con un allegato)
//! 2. pubblicata solo per i docenti
//! 3. in bozza

mod common;

#[cfg(test)]
mod comunicazioni_tests {
    use super::common::*;
    use axum_test::http::HeaderName;
    use registro::entities::Ruolo;
    use serde_json::json;
    use sqlx::MySqlPool;

    fn authorization() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    fn staff() -> String {
        bearer(2, "s.pinna", Ruolo::Staff)
    }

    async fn bacheca(server: &axum_test::TestServer, token: String) -> Vec<serde_json::Value> {
        let response = server
            .get("/comunicazioni")
            .add_header(authorization(), token)
            .await;
        response.assert_status_ok();
        response.json()
    }

    // ============================================================
    // Test per GET /comunicazioni - get_bacheca
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_bacheca_per_destinatario(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let alunno = bacheca(&server, bearer(10, "a.loi", Ruolo::Alunno)).await;
        assert_eq!(alunno.len(), 1);
        assert_eq!(alunno[0]["id"], 1);

        let genitore = bacheca(&server, bearer(11, "g.loi", Ruolo::Genitore)).await;
        assert_eq!(genitore.len(), 1);

        // i docenti ricevono entrambe le circolari pubblicate
        let docente = bacheca(&server, bearer(21, "d.serra", Ruolo::Docente)).await;
        assert_eq!(docente.len(), 2);
        assert!(docente.iter().all(|c| c["stato"] == "PUBBLICATO"));

        // l'autrice vede anche la propria bozza
        let autrice = bacheca(&server, staff()).await;
        assert_eq!(autrice.len(), 3);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_bacheca_filtrata_per_categoria(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/comunicazioni")
            .add_query_param("categoria", "AVVISO")
            .add_header(authorization(), bearer(21, "d.serra", Ruolo::Docente))
            .await;
        response.assert_status_ok();
        let avvisi: Vec<serde_json::Value> = response.json();
        assert!(avvisi.is_empty());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_allegati(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let alunno = bearer(10, "a.loi", Ruolo::Alunno);

        let response = server
            .get("/comunicazioni/1/allegati")
            .add_header(authorization(), alunno.clone())
            .await;
        response.assert_status_ok();
        let allegati: Vec<serde_json::Value> = response.json();
        assert_eq!(allegati.len(), 1);
        assert_eq!(allegati[0]["estensione"], "pdf");

        // la circolare 2 è riservata ai docenti
        server
            .get("/comunicazioni/2/allegati")
            .add_header(authorization(), alunno)
            .await
            .assert_status_forbidden();

        server
            .get("/comunicazioni/99/allegati")
            .add_header(authorization(), staff())
            .await
            .assert_status_not_found();

        // solo l'autrice o lo staff aggiungono allegati
        let allegato = json!({
            "titolo": "Calendario",
            "nome": "calendario",
            "estensione": "pdf",
            "dimensione": 1024,
            "file": "c2-calendario.pdf"
        });
        server
            .post("/comunicazioni/2/allegati")
            .add_header(authorization(), bearer(21, "d.serra", Ruolo::Docente))
            .json(&allegato)
            .await
            .assert_status_forbidden();

        let response = server
            .post("/comunicazioni/2/allegati")
            .add_header(authorization(), staff())
            .json(&allegato)
            .await;
        response.assert_status_ok();
        let creato: serde_json::Value = response.json();
        assert_eq!(creato["comunicazione_id"], 2);

        Ok(())
    }

    // ============================================================
    // Redazione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_create_circolare(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let body = json!({
            "titolo": "Uscita didattica",
            "data": "2025-11-10",
            "anno": 2025,
            "sedi": [1],
            "docenti": "T"
        });

        let response = server
            .post("/circolari")
            .add_header(authorization(), staff())
            .json(&body)
            .await;
        response.assert_status_ok();
        let circolare: serde_json::Value = response.json();
        assert_eq!(circolare["numero"], 4);
        assert_eq!(circolare["stato"], "BOZZA");
        assert_eq!(circolare["autore_id"], 2);

        // i docenti scrivono avvisi, non circolari
        server
            .post("/circolari")
            .add_header(authorization(), bearer(20, "d.melis", Ruolo::Docente))
            .json(&body)
            .await
            .assert_status_forbidden();

        // filtro per classi senza classi indicate
        server
            .post("/circolari")
            .add_header(authorization(), staff())
            .json(&json!({
                "titolo": "Senza classi",
                "data": "2025-11-10",
                "anno": 2025,
                "alunni": "C"
            }))
            .await
            .assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_create_avviso(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let docente = bearer(20, "d.melis", Ruolo::Docente);

        let response = server
            .post("/avvisi")
            .add_header(authorization(), docente.clone())
            .json(&json!({
                "titolo": "Verifica di matematica",
                "data": "2025-11-20",
                "anno": 2025,
                "alunni": "C",
                "filtro_alunni": [1],
                "tipo_avviso": "VERIFICA",
                "ora": "09:00:00",
                "ora_fine": "10:00:00",
                "materia_id": 1
            }))
            .await;
        response.assert_status_ok();

        server
            .post("/avvisi")
            .add_header(authorization(), docente)
            .json(&json!({
                "titolo": "Orario invertito",
                "data": "2025-11-20",
                "anno": 2025,
                "tipo_avviso": "ATTIVITA",
                "ora": "11:00:00",
                "ora_fine": "10:00:00"
            }))
            .await
            .assert_status_bad_request();

        server
            .post("/avvisi")
            .add_header(authorization(), bearer(10, "a.loi", Ruolo::Alunno))
            .json(&json!({
                "titolo": "Avviso",
                "data": "2025-11-20",
                "anno": 2025,
                "tipo_avviso": "COMUNICAZIONE"
            }))
            .await
            .assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("registro")))]
    async fn test_pubblica_e_archivia(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        // un docente non pubblica le comunicazioni altrui
        server
            .patch("/comunicazioni/3/pubblica")
            .add_header(authorization(), bearer(20, "d.melis", Ruolo::Docente))
            .await
            .assert_status_forbidden();

        let response = server
            .patch("/comunicazioni/3/pubblica")
            .add_header(authorization(), staff())
            .await;
        response.assert_status_ok();
        let comunicazione: serde_json::Value = response.json();
        assert_eq!(comunicazione["stato"], "PUBBLICATO");

        // ora la ricevono anche gli alunni della 1A
        let alunno = bacheca(&server, bearer(10, "a.loi", Ruolo::Alunno)).await;
        assert_eq!(alunno.len(), 2);

        server
            .patch("/comunicazioni/3/archivia")
            .add_header(authorization(), staff())
            .await
            .assert_status_ok();

        server
            .patch("/comunicazioni/3/pubblica")
            .add_header(authorization(), staff())
            .await
            .assert_status_conflict();

        Ok(())
    }
}
