//! ConfigurazioneRepository - Parametri di configurazione chiave/valore

use super::{Create, Update};
use crate::dtos::{CreateConfigurazioneDTO, UpdateConfigurazioneDTO};
use crate::entities::{Configurazione, Timestamps};
use chrono::Utc;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

const COLONNE_CONFIGURAZIONE: &str =
    "id, creato, modificato, categoria, parametro, descrizione, valore, gestito";

pub struct ConfigurazioneRepository {
    connection_pool: MySqlPool,
}

impl ConfigurazioneRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Configurazione>, Error> {
        sqlx::query_as::<_, Configurazione>(&format!(
            "SELECT {COLONNE_CONFIGURAZIONE} FROM gs_configurazione ORDER BY categoria, parametro"
        ))
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn find_by_parametro(&self, parametro: &str) -> Result<Option<Configurazione>, Error> {
        sqlx::query_as::<_, Configurazione>(&format!(
            "SELECT {COLONNE_CONFIGURAZIONE} FROM gs_configurazione WHERE parametro = ?"
        ))
        .bind(parametro)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Valore del parametro, `None` se non definito
    #[instrument(skip(self))]
    pub async fn valore(&self, parametro: &str) -> Result<Option<String>, Error> {
        let valore: Option<(String,)> =
            sqlx::query_as("SELECT valore FROM gs_configurazione WHERE parametro = ?")
                .bind(parametro)
                .fetch_optional(&self.connection_pool)
                .await?;
        Ok(valore.map(|(v,)| v))
    }
}

impl Create<Configurazione, CreateConfigurazioneDTO> for ConfigurazioneRepository {
    #[instrument(skip(self, data), fields(parametro = %data.parametro))]
    async fn create(&self, data: &CreateConfigurazioneDTO) -> Result<Configurazione, Error> {
        debug!("Creating configuration parameter");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_configurazione (creato, modificato, categoria, parametro, descrizione, valore, gestito)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(&data.categoria)
        .bind(&data.parametro)
        .bind(&data.descrizione)
        .bind(&data.valore)
        .bind(data.gestito)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Configuration parameter created with id {}", new_id);

        Ok(Configurazione {
            id: new_id,
            timestamps,
            categoria: data.categoria.clone(),
            parametro: data.parametro.clone(),
            descrizione: data.descrizione.clone(),
            valore: data.valore.clone(),
            gestito: data.gestito,
        })
    }
}

/// Il parametro è identificato dal nome, non dall'id
impl Update<Configurazione, UpdateConfigurazioneDTO, String> for ConfigurazioneRepository {
    #[instrument(skip(self, data), fields(parametro = %id))]
    async fn update(
        &self,
        id: &String,
        data: &UpdateConfigurazioneDTO,
    ) -> Result<Configurazione, Error> {
        debug!("Updating configuration parameter");
        let result = sqlx::query(
            "UPDATE gs_configurazione SET valore = ?, modificato = ? WHERE parametro = ?",
        )
        .bind(&data.valore)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Configuration parameter updated");

        self.find_by_parametro(id)
            .await?
            .ok_or(Error::RowNotFound)
    }
}
