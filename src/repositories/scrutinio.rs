//! Repository di scrutini, proposte di voto, voti finali, esiti e storico

use super::{Create, Read};
use crate::dtos::{
    CreateEsitoDTO, CreatePropostaVotoDTO, CreateScrutinioDTO, CreateStoricoEsitoDTO,
    CreateVotoScrutinioDTO,
};
use crate::entities::{
    Esito, Periodo, PropostaVoto, Scrutinio, StatoScrutinio, StoricoEsito, Timestamps,
    VotoScrutinio,
};
use chrono::Utc;
use serde_json::json;
use sqlx::types::Json;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument, warn};

const COLONNE_SCRUTINIO: &str =
    "id, creato, modificato, periodo, data, inizio, fine, stato, classe_id, dati, visibile, sincronizzazione";

const COLONNE_PROPOSTA: &str = "id, creato, modificato, periodo, orale, scritto, pratico, unico, \
    debito, recupero, assenze, dati, alunno_id, classe_id, materia_id, docente_id";

// ************************* SCRUTINIO ************************* //

pub struct ScrutinioRepository {
    connection_pool: MySqlPool,
}

impl ScrutinioRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_classe(&self, classe_id: &i32) -> Result<Vec<Scrutinio>, Error> {
        sqlx::query_as::<_, Scrutinio>(&format!(
            "SELECT {COLONNE_SCRUTINIO} FROM gs_scrutinio WHERE classe_id = ? ORDER BY id"
        ))
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Salva stato, data e orari dopo un cambio di passo
    ///
    /// Scrive solo se lo scrutinio è ancora in `precedente`: due richieste partite dallo
    /// stesso passo non possono spostarlo di due passi. Restituisce `false` se lo stato
    /// è cambiato nel frattempo.
    #[instrument(skip(self, scrutinio), fields(scrutinio_id = %scrutinio.id, stato = ?scrutinio.stato))]
    pub async fn salva_stato(
        &self,
        scrutinio: &Scrutinio,
        precedente: StatoScrutinio,
    ) -> Result<bool, Error> {
        debug!("Saving scrutiny state");
        let result = sqlx::query(
            r#"
            UPDATE gs_scrutinio
            SET stato = ?, data = ?, inizio = ?, fine = ?, modificato = ?
            WHERE id = ? AND stato = ?
            "#,
        )
        .bind(scrutinio.stato)
        .bind(scrutinio.data)
        .bind(scrutinio.inizio)
        .bind(scrutinio.fine)
        .bind(scrutinio.timestamps.modificato)
        .bind(scrutinio.id)
        .bind(precedente)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("Scrutiny state changed by another request");
            return Ok(false);
        }
        info!("Scrutiny state saved");
        Ok(true)
    }
}

impl Create<Scrutinio, CreateScrutinioDTO> for ScrutinioRepository {
    #[instrument(skip(self, data), fields(classe_id = %data.classe_id, periodo = ?data.periodo))]
    async fn create(&self, data: &CreateScrutinioDTO) -> Result<Scrutinio, Error> {
        debug!("Creating scrutiny");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let dati = Json(json!({}));
        let result = sqlx::query(
            r#"
            INSERT INTO gs_scrutinio (creato, modificato, periodo, stato, classe_id, dati)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.periodo)
        .bind(StatoScrutinio::NonAperto)
        .bind(data.classe_id)
        .bind(&dati)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Scrutiny created with id {}", new_id);

        Ok(Scrutinio {
            id: new_id,
            timestamps,
            periodo: data.periodo,
            data: None,
            inizio: None,
            fine: None,
            stato: StatoScrutinio::NonAperto,
            classe_id: data.classe_id,
            dati,
            visibile: None,
            sincronizzazione: None,
        })
    }
}

impl Read<Scrutinio, i32> for ScrutinioRepository {
    #[instrument(skip(self), fields(scrutinio_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Scrutinio>, Error> {
        sqlx::query_as::<_, Scrutinio>(&format!(
            "SELECT {COLONNE_SCRUTINIO} FROM gs_scrutinio WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* PROPOSTA VOTO ************************* //

pub struct PropostaVotoRepository {
    connection_pool: MySqlPool,
}

impl PropostaVotoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Proposte di una classe per il periodo, eventualmente di un solo docente
    #[instrument(skip(self))]
    pub async fn find_by_classe(
        &self,
        classe_id: &i32,
        periodo: Periodo,
        docente_id: Option<i32>,
    ) -> Result<Vec<PropostaVoto>, Error> {
        sqlx::query_as::<_, PropostaVoto>(&format!(
            "SELECT {COLONNE_PROPOSTA} FROM gs_proposta_voto \
             WHERE classe_id = ? AND periodo = ? AND (? IS NULL OR docente_id = ?) \
             ORDER BY materia_id, alunno_id"
        ))
        .bind(classe_id)
        .bind(periodo)
        .bind(docente_id)
        .bind(docente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    async fn find_unica(
        &self,
        periodo: Periodo,
        alunno_id: i32,
        materia_id: i32,
        docente_id: i32,
    ) -> Result<Option<PropostaVoto>, Error> {
        sqlx::query_as::<_, PropostaVoto>(&format!(
            "SELECT {COLONNE_PROPOSTA} FROM gs_proposta_voto \
             WHERE periodo = ? AND alunno_id = ? AND materia_id = ? AND docente_id = ?"
        ))
        .bind(periodo)
        .bind(alunno_id)
        .bind(materia_id)
        .bind(docente_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Create<PropostaVoto, CreatePropostaVotoDTO> for PropostaVotoRepository {
    /// Inserisce la proposta o sostituisce quella già fatta dallo stesso docente
    #[instrument(skip(self, data), fields(alunno_id = %data.alunno_id, materia_id = %data.materia_id))]
    async fn create(&self, data: &CreatePropostaVotoDTO) -> Result<PropostaVoto, Error> {
        debug!("Saving grade proposal");
        let timestamps = Timestamps::pre_persist(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO gs_proposta_voto
                (creato, modificato, periodo, orale, scritto, pratico, unico, debito, recupero,
                 assenze, dati, alunno_id, classe_id, materia_id, docente_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, JSON_OBJECT(), ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                modificato = VALUES(modificato), orale = VALUES(orale), scritto = VALUES(scritto),
                pratico = VALUES(pratico), unico = VALUES(unico), debito = VALUES(debito),
                recupero = VALUES(recupero), assenze = VALUES(assenze)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.periodo)
        .bind(data.orale)
        .bind(data.scritto)
        .bind(data.pratico)
        .bind(data.unico)
        .bind(&data.debito)
        .bind(data.recupero)
        .bind(data.assenze)
        .bind(data.alunno_id)
        .bind(data.classe_id)
        .bind(data.materia_id)
        .bind(data.docente_id)
        .execute(&self.connection_pool)
        .await?;

        // con l'upsert last_insert_id non è affidabile, si rilegge per chiave
        let proposta = self
            .find_unica(data.periodo, data.alunno_id, data.materia_id, data.docente_id)
            .await?
            .ok_or(Error::RowNotFound)?;
        info!("Grade proposal saved with id {}", proposta.id);
        Ok(proposta)
    }
}

// ************************* VOTO SCRUTINIO ************************* //

pub struct VotoScrutinioRepository {
    connection_pool: MySqlPool,
}

impl VotoScrutinioRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_scrutinio(&self, scrutinio_id: &i32) -> Result<Vec<VotoScrutinio>, Error> {
        sqlx::query_as::<_, VotoScrutinio>(
            r#"
            SELECT id, creato, modificato, unico, debito, recupero, assenze, dati,
                   scrutinio_id, alunno_id, materia_id
            FROM gs_voto_scrutinio
            WHERE scrutinio_id = ?
            ORDER BY alunno_id, materia_id
            "#,
        )
        .bind(scrutinio_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<VotoScrutinio, CreateVotoScrutinioDTO> for VotoScrutinioRepository {
    #[instrument(skip(self, data), fields(scrutinio_id = %data.scrutinio_id, alunno_id = %data.alunno_id))]
    async fn create(&self, data: &CreateVotoScrutinioDTO) -> Result<VotoScrutinio, Error> {
        debug!("Creating final grade");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let dati = Json(json!({}));
        let result = sqlx::query(
            r#"
            INSERT INTO gs_voto_scrutinio
                (creato, modificato, unico, debito, recupero, assenze, dati, scrutinio_id, alunno_id, materia_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.unico)
        .bind(&data.debito)
        .bind(data.recupero)
        .bind(data.assenze)
        .bind(&dati)
        .bind(data.scrutinio_id)
        .bind(data.alunno_id)
        .bind(data.materia_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Final grade created with id {}", new_id);

        Ok(VotoScrutinio {
            id: new_id,
            timestamps,
            unico: data.unico,
            debito: data.debito.clone(),
            recupero: data.recupero,
            assenze: data.assenze,
            dati,
            scrutinio_id: data.scrutinio_id,
            alunno_id: data.alunno_id,
            materia_id: data.materia_id,
        })
    }
}

// ************************* ESITO ************************* //

pub struct EsitoRepository {
    connection_pool: MySqlPool,
}

impl EsitoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_scrutinio(&self, scrutinio_id: &i32) -> Result<Vec<Esito>, Error> {
        sqlx::query_as::<_, Esito>(
            r#"
            SELECT id, creato, modificato, esito, media, credito, credito_precedente, dati,
                   scrutinio_id, alunno_id
            FROM gs_esito
            WHERE scrutinio_id = ?
            ORDER BY alunno_id
            "#,
        )
        .bind(scrutinio_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Esito, CreateEsitoDTO> for EsitoRepository {
    #[instrument(skip(self, data), fields(scrutinio_id = %data.scrutinio_id, alunno_id = %data.alunno_id))]
    async fn create(&self, data: &CreateEsitoDTO) -> Result<Esito, Error> {
        debug!("Creating outcome");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let dati = Json(json!({}));
        let result = sqlx::query(
            r#"
            INSERT INTO gs_esito
                (creato, modificato, esito, media, credito, credito_precedente, dati, scrutinio_id, alunno_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.esito)
        .bind(data.media)
        .bind(data.credito)
        .bind(data.credito_precedente)
        .bind(&dati)
        .bind(data.scrutinio_id)
        .bind(data.alunno_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Outcome created with id {}", new_id);

        Ok(Esito {
            id: new_id,
            timestamps,
            esito: data.esito,
            media: data.media,
            credito: data.credito,
            credito_precedente: data.credito_precedente,
            dati,
            scrutinio_id: data.scrutinio_id,
            alunno_id: data.alunno_id,
        })
    }
}

// ************************* STORICO ************************* //

pub struct StoricoRepository {
    connection_pool: MySqlPool,
}

impl StoricoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Esito dell'anno precedente dell'alunno, se archiviato
    #[instrument(skip(self))]
    pub async fn find_by_alunno(&self, alunno_id: &i32) -> Result<Option<StoricoEsito>, Error> {
        sqlx::query_as::<_, StoricoEsito>(
            r#"
            SELECT id, creato, modificato, classe, esito, periodo, media, credito,
                   credito_precedente, dati, alunno_id
            FROM gs_storico_esito
            WHERE alunno_id = ?
            "#,
        )
        .bind(alunno_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Create<StoricoEsito, CreateStoricoEsitoDTO> for StoricoRepository {
    /// Archivia l'esito e i voti per materia in un'unica transazione
    #[instrument(skip(self, data), fields(alunno_id = %data.alunno_id, voti = data.voti.len()))]
    async fn create(&self, data: &CreateStoricoEsitoDTO) -> Result<StoricoEsito, Error> {
        debug!("Archiving outcome");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let dati = Json(json!({}));
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO gs_storico_esito
                (creato, modificato, classe, esito, periodo, media, credito, credito_precedente, dati, alunno_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(&data.classe)
        .bind(data.esito)
        .bind(data.periodo)
        .bind(data.media)
        .bind(data.credito)
        .bind(data.credito_precedente)
        .bind(&dati)
        .bind(data.alunno_id)
        .execute(&mut *tx)
        .await?;

        let new_id = result.last_insert_id() as i32;

        for voto in &data.voti {
            sqlx::query(
                r#"
                INSERT INTO gs_storico_voto (creato, modificato, voto, carenze, dati, storico_esito_id, materia_id)
                VALUES (?, ?, ?, ?, JSON_OBJECT(), ?, ?)
                "#,
            )
            .bind(timestamps.creato)
            .bind(timestamps.modificato)
            .bind(voto.voto)
            .bind(&voto.carenze)
            .bind(new_id)
            .bind(voto.materia_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Outcome archived with id {}", new_id);

        Ok(StoricoEsito {
            id: new_id,
            timestamps,
            classe: data.classe.clone(),
            esito: data.esito,
            periodo: data.periodo,
            media: data.media,
            credito: data.credito,
            credito_precedente: data.credito_precedente,
            dati,
            alunno_id: data.alunno_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("registro")))]
    async fn test_cambio_stato_concorrente(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = ScrutinioRepository::new(pool);
        let now = Utc::now();

        let mut scrutinio = repo.read(&1).await?.unwrap();
        scrutinio.cambia_stato(StatoScrutinio::Passo1, now).unwrap();
        assert!(repo.salva_stato(&scrutinio, StatoScrutinio::NonAperto).await?);

        // due richieste partono entrambe dal passo 1
        let mut avanti = repo.read(&1).await?.unwrap();
        let mut indietro = repo.read(&1).await?.unwrap();
        avanti.cambia_stato(StatoScrutinio::Passo2, now).unwrap();
        indietro.cambia_stato(StatoScrutinio::NonAperto, now).unwrap();

        assert!(repo.salva_stato(&avanti, StatoScrutinio::Passo1).await?);
        assert!(!repo.salva_stato(&indietro, StatoScrutinio::Passo1).await?);

        let salvato = repo.read(&1).await?.unwrap();
        assert_eq!(salvato.stato, StatoScrutinio::Passo2);

        Ok(())
    }
}
