//! ValutazioneRepository - Voti e giudizi delle verifiche

use super::presenze::filtra_intervallo;
use super::{Create, Delete, Read};
use crate::dtos::{CreateValutazioneDTO, IntervalloQuery, ValutazioniQuery};
use crate::entities::{Timestamps, Valutazione};
use chrono::Utc;
use sqlx::{Error, MySqlPool, QueryBuilder};
use tracing::{debug, info, instrument};

const COLONNE_VALUTAZIONE: &str = "id, creato, modificato, tipo, visibile, media, voto, giudizio, \
    argomento, data, docente_id, alunno_id, classe_id, materia_id";

pub struct ValutazioneRepository {
    connection_pool: MySqlPool,
}

impl ValutazioneRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Valutazioni dell'alunno, filtrate per materia e intervallo di date
    ///
    /// `solo_visibili` esclude le valutazioni non ancora mostrate alle famiglie.
    #[instrument(skip(self, filtro))]
    pub async fn find_by_alunno(
        &self,
        alunno_id: &i32,
        filtro: &ValutazioniQuery,
        solo_visibili: bool,
    ) -> Result<Vec<Valutazione>, Error> {
        debug!("Listing grades of student");
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT {COLONNE_VALUTAZIONE} FROM gs_valutazione WHERE alunno_id = "
        ));
        query_builder.push_bind(alunno_id);

        if let Some(materia_id) = filtro.materia_id {
            query_builder.push(" AND materia_id = ");
            query_builder.push_bind(materia_id);
        }
        if solo_visibili {
            query_builder.push(" AND visibile = TRUE");
        }
        filtra_intervallo(
            &mut query_builder,
            &IntervalloQuery {
                dal: filtro.dal,
                al: filtro.al,
            },
        );
        query_builder.push(" ORDER BY data DESC, id DESC");

        query_builder
            .build_query_as::<Valutazione>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Valutazioni dell'alunno in una materia, per il calcolo della media
    #[instrument(skip(self))]
    pub async fn find_by_alunno_materia(
        &self,
        alunno_id: &i32,
        materia_id: &i32,
    ) -> Result<Vec<Valutazione>, Error> {
        sqlx::query_as::<_, Valutazione>(&format!(
            "SELECT {COLONNE_VALUTAZIONE} FROM gs_valutazione \
             WHERE alunno_id = ? AND materia_id = ? ORDER BY data"
        ))
        .bind(alunno_id)
        .bind(materia_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Valutazione, CreateValutazioneDTO> for ValutazioneRepository {
    #[instrument(skip(self, data), fields(alunno_id = %data.alunno_id, materia_id = %data.materia_id))]
    async fn create(&self, data: &CreateValutazioneDTO) -> Result<Valutazione, Error> {
        debug!("Creating grade");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_valutazione
                (creato, modificato, tipo, visibile, media, voto, giudizio, argomento, data,
                 docente_id, alunno_id, classe_id, materia_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.tipo)
        .bind(data.visibile)
        .bind(data.media)
        .bind(data.voto)
        .bind(&data.giudizio)
        .bind(&data.argomento)
        .bind(data.data)
        .bind(data.docente_id)
        .bind(data.alunno_id)
        .bind(data.classe_id)
        .bind(data.materia_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Grade created with id {}", new_id);

        Ok(Valutazione {
            id: new_id,
            timestamps,
            tipo: data.tipo,
            visibile: data.visibile,
            media: data.media,
            voto: data.voto,
            giudizio: data.giudizio.clone(),
            argomento: data.argomento.clone(),
            data: data.data,
            docente_id: data.docente_id,
            alunno_id: data.alunno_id,
            classe_id: data.classe_id,
            materia_id: data.materia_id,
        })
    }
}

impl Read<Valutazione, i32> for ValutazioneRepository {
    #[instrument(skip(self), fields(valutazione_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Valutazione>, Error> {
        sqlx::query_as::<_, Valutazione>(&format!(
            "SELECT {COLONNE_VALUTAZIONE} FROM gs_valutazione WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i32> for ValutazioneRepository {
    #[instrument(skip(self), fields(valutazione_id = %id))]
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM gs_valutazione WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Grade deleted");
        Ok(())
    }
}
