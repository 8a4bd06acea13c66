//! Repository di note disciplinari e annotazioni

use super::{Create, Read};
use crate::dtos::{CreateAnnotazioneDTO, CreateNotaDTO};
use crate::entities::{Annotazione, Nota, Timestamps};
use chrono::Utc;
use sqlx::{Error, MySqlPool, QueryBuilder};
use tracing::{debug, info, instrument};

const COLONNE_NOTA: &str = "id, creato, modificato, tipo, data, testo, provvedimento, \
    docente_provvedimento_id, annullata, classe_id, docente_id";

pub struct NotaRepository {
    connection_pool: MySqlPool,
}

impl NotaRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Note della classe, dalla più recente
    #[instrument(skip(self))]
    pub async fn find_by_classe(&self, classe_id: &i32) -> Result<Vec<Nota>, Error> {
        debug!("Listing notes of class");
        sqlx::query_as::<_, Nota>(&format!(
            "SELECT {COLONNE_NOTA} FROM gs_nota WHERE classe_id = ? ORDER BY data DESC, id DESC"
        ))
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Coppie (nota_id, alunno_id) per le note indicate
    #[instrument(skip(self), fields(count = note_ids.len()))]
    pub async fn find_alunni(&self, note_ids: &[i32]) -> Result<Vec<(i32, i32)>, Error> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder =
            QueryBuilder::new("SELECT nota_id, alunno_id FROM gs_nota_alunno WHERE nota_id IN (");
        let mut separated = query_builder.separated(", ");
        for id in note_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<(i32, i32)>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Create<Nota, CreateNotaDTO> for NotaRepository {
    /// Inserisce la nota e gli alunni coinvolti in un'unica transazione
    #[instrument(skip(self, data), fields(classe_id = %data.classe_id, tipo = ?data.tipo))]
    async fn create(&self, data: &CreateNotaDTO) -> Result<Nota, Error> {
        debug!("Creating disciplinary note");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO gs_nota (creato, modificato, tipo, data, testo, provvedimento, classe_id, docente_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.tipo)
        .bind(data.data)
        .bind(&data.testo)
        .bind(&data.provvedimento)
        .bind(data.classe_id)
        .bind(data.docente_id)
        .execute(&mut *tx)
        .await?;

        let new_id = result.last_insert_id() as i32;

        for alunno_id in &data.alunni {
            sqlx::query("INSERT INTO gs_nota_alunno (nota_id, alunno_id) VALUES (?, ?)")
                .bind(new_id)
                .bind(alunno_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(
            "Note created with id {} for {} students",
            new_id,
            data.alunni.len()
        );

        Ok(Nota {
            id: new_id,
            timestamps,
            tipo: data.tipo,
            data: data.data,
            testo: data.testo.clone(),
            provvedimento: data.provvedimento.clone(),
            docente_provvedimento_id: None,
            annullata: None,
            classe_id: data.classe_id,
            docente_id: data.docente_id,
        })
    }
}

impl Read<Nota, i32> for NotaRepository {
    #[instrument(skip(self), fields(nota_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Nota>, Error> {
        sqlx::query_as::<_, Nota>(&format!("SELECT {COLONNE_NOTA} FROM gs_nota WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

pub struct AnnotazioneRepository {
    connection_pool: MySqlPool,
}

impl AnnotazioneRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Annotazioni della classe; `solo_visibili` esclude quelle riservate ai docenti
    #[instrument(skip(self))]
    pub async fn find_by_classe(
        &self,
        classe_id: &i32,
        solo_visibili: bool,
    ) -> Result<Vec<Annotazione>, Error> {
        debug!("Listing annotations of class");
        sqlx::query_as::<_, Annotazione>(
            r#"
            SELECT id, creato, modificato, data, testo, visibile, avviso_id, classe_id, docente_id
            FROM gs_annotazione
            WHERE classe_id = ? AND (visibile = TRUE OR ? = FALSE)
            ORDER BY data DESC, id DESC
            "#,
        )
        .bind(classe_id)
        .bind(solo_visibili)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Annotazione, CreateAnnotazioneDTO> for AnnotazioneRepository {
    #[instrument(skip(self, data), fields(classe_id = %data.classe_id))]
    async fn create(&self, data: &CreateAnnotazioneDTO) -> Result<Annotazione, Error> {
        debug!("Creating annotation");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_annotazione (creato, modificato, data, testo, visibile, avviso_id, classe_id, docente_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.data)
        .bind(&data.testo)
        .bind(data.visibile)
        .bind(data.avviso_id)
        .bind(data.classe_id)
        .bind(data.docente_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Annotation created with id {}", new_id);

        Ok(Annotazione {
            id: new_id,
            timestamps,
            data: data.data,
            testo: data.testo.clone(),
            visibile: data.visibile,
            avviso_id: data.avviso_id,
            classe_id: data.classe_id,
            docente_id: data.docente_id,
        })
    }
}
