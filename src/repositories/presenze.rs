//! Repository delle presenze: assenze, entrate in ritardo e uscite anticipate

use super::{Create, Read};
use crate::dtos::{CreateAssenzaDTO, CreateEntrataDTO, CreateUscitaDTO, IntervalloQuery};
use crate::entities::{Assenza, Entrata, Giustificazione, Timestamps, Uscita};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Error, MySql, MySqlPool, QueryBuilder};
use tracing::{debug, info, instrument, warn};

const COLONNE_GIUSTIFICAZIONE: &str =
    "giustificato, motivazione, docente_giustifica_id, utente_giustifica_id";

/// Aggiunge alla query le condizioni sull'intervallo di date
pub(super) fn filtra_intervallo(query_builder: &mut QueryBuilder<'_, MySql>, intervallo: &IntervalloQuery) {
    if let Some(dal) = intervallo.dal {
        query_builder.push(" AND data >= ");
        query_builder.push_bind(dal);
    }
    if let Some(al) = intervallo.al {
        query_builder.push(" AND data <= ");
        query_builder.push_bind(al);
    }
}

/// Condizione sullo stato letto: nessuna convalida e la stessa dichiarazione online
const STESSA_GIUSTIFICAZIONE: &str =
    "docente_giustifica_id IS NULL AND utente_giustifica_id <=> ?";

/// Scrive i campi di giustificazione di una riga di `tabella`
///
/// L'UPDATE avviene solo se la riga è ancora nello stato `precedente`; restituisce
/// `false` se nel frattempo un'altra richiesta l'ha giustificata o convalidata.
async fn salva_giustificazione(
    pool: &MySqlPool,
    tabella: &'static str,
    id: &i32,
    giustificazione: &Giustificazione,
    precedente: &Giustificazione,
    modificato: DateTime<Utc>,
) -> Result<bool, Error> {
    let result = sqlx::query(&format!(
        "UPDATE {tabella} SET giustificato = ?, motivazione = ?, docente_giustifica_id = ?, \
         utente_giustifica_id = ?, modificato = ? WHERE id = ? AND {STESSA_GIUSTIFICAZIONE}"
    ))
    .bind(giustificazione.giustificato)
    .bind(&giustificazione.motivazione)
    .bind(giustificazione.docente_giustifica_id)
    .bind(giustificazione.utente_giustifica_id)
    .bind(modificato)
    .bind(id)
    .bind(precedente.utente_giustifica_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

// ************************* ASSENZA ************************* //

pub struct AssenzaRepository {
    connection_pool: MySqlPool,
}

impl AssenzaRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self, intervallo))]
    pub async fn find_by_alunno(
        &self,
        alunno_id: &i32,
        intervallo: &IntervalloQuery,
    ) -> Result<Vec<Assenza>, Error> {
        debug!("Listing absences of student");
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT id, creato, modificato, data, {COLONNE_GIUSTIFICAZIONE}, dichiarazione, \
             certificati, alunno_id, docente_id FROM gs_assenza WHERE alunno_id = "
        ));
        query_builder.push_bind(alunno_id);
        filtra_intervallo(&mut query_builder, intervallo);
        query_builder.push(" ORDER BY data");

        query_builder
            .build_query_as::<Assenza>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Salva giustificazione e autodichiarazioni dell'assenza, se ancora nello stato `precedente`
    #[instrument(skip(self, assenza, precedente), fields(assenza_id = %assenza.id))]
    pub async fn salva_giustificazione(
        &self,
        assenza: &Assenza,
        precedente: &Giustificazione,
    ) -> Result<bool, Error> {
        debug!("Saving absence justification");
        let giustificazione = &assenza.giustificazione;
        let result = sqlx::query(&format!(
            "UPDATE gs_assenza SET giustificato = ?, motivazione = ?, docente_giustifica_id = ?, \
             utente_giustifica_id = ?, dichiarazione = ?, modificato = ? \
             WHERE id = ? AND {STESSA_GIUSTIFICAZIONE}"
        ))
        .bind(giustificazione.giustificato)
        .bind(&giustificazione.motivazione)
        .bind(giustificazione.docente_giustifica_id)
        .bind(giustificazione.utente_giustifica_id)
        .bind(Json(&assenza.dichiarazione.0))
        .bind(assenza.timestamps.modificato)
        .bind(assenza.id)
        .bind(precedente.utente_giustifica_id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("Absence changed by another request");
            return Ok(false);
        }
        info!("Absence justification saved");
        Ok(true)
    }
}

impl Create<Assenza, CreateAssenzaDTO> for AssenzaRepository {
    #[instrument(skip(self, data), fields(alunno_id = %data.alunno_id, data = %data.data))]
    async fn create(&self, data: &CreateAssenzaDTO) -> Result<Assenza, Error> {
        debug!("Recording absence");
        let timestamps = Timestamps::pre_persist(Utc::now());
        // il vincolo (data, alunno_id) impedisce una seconda assenza nello stesso giorno
        let result = sqlx::query(
            r#"
            INSERT INTO gs_assenza (creato, modificato, data, dichiarazione, certificati, alunno_id, docente_id)
            VALUES (?, ?, ?, JSON_ARRAY(), JSON_ARRAY(), ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.data)
        .bind(data.alunno_id)
        .bind(data.docente_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Absence recorded with id {}", new_id);

        Ok(Assenza {
            id: new_id,
            timestamps,
            data: data.data,
            giustificazione: Giustificazione::default(),
            dichiarazione: Json(Vec::new()),
            certificati: Json(Vec::new()),
            alunno_id: data.alunno_id,
            docente_id: data.docente_id,
        })
    }
}

impl Read<Assenza, i32> for AssenzaRepository {
    #[instrument(skip(self), fields(assenza_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Assenza>, Error> {
        sqlx::query_as::<_, Assenza>(&format!(
            "SELECT id, creato, modificato, data, {COLONNE_GIUSTIFICAZIONE}, dichiarazione, \
             certificati, alunno_id, docente_id FROM gs_assenza WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* ENTRATA ************************* //

pub struct EntrataRepository {
    connection_pool: MySqlPool,
}

impl EntrataRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self, intervallo))]
    pub async fn find_by_alunno(
        &self,
        alunno_id: &i32,
        intervallo: &IntervalloQuery,
    ) -> Result<Vec<Entrata>, Error> {
        debug!("Listing late entries of student");
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT id, creato, modificato, data, ora, ritardo_breve, note, valido, \
             {COLONNE_GIUSTIFICAZIONE}, alunno_id, docente_id FROM gs_entrata WHERE alunno_id = "
        ));
        query_builder.push_bind(alunno_id);
        filtra_intervallo(&mut query_builder, intervallo);
        query_builder.push(" ORDER BY data");

        query_builder
            .build_query_as::<Entrata>()
            .fetch_all(&self.connection_pool)
            .await
    }

    #[instrument(skip(self, entrata, precedente), fields(entrata_id = %entrata.id))]
    pub async fn salva_giustificazione(
        &self,
        entrata: &Entrata,
        precedente: &Giustificazione,
    ) -> Result<bool, Error> {
        debug!("Saving late entry justification");
        let salvata = salva_giustificazione(
            &self.connection_pool,
            "gs_entrata",
            &entrata.id,
            &entrata.giustificazione,
            precedente,
            entrata.timestamps.modificato,
        )
        .await?;
        if salvata {
            info!("Late entry justification saved");
        } else {
            warn!("Late entry changed by another request");
        }
        Ok(salvata)
    }
}

impl Create<Entrata, CreateEntrataDTO> for EntrataRepository {
    #[instrument(skip(self, data), fields(alunno_id = %data.alunno_id, data = %data.data))]
    async fn create(&self, data: &CreateEntrataDTO) -> Result<Entrata, Error> {
        debug!("Recording late entry");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_entrata (creato, modificato, data, ora, ritardo_breve, note, valido, alunno_id, docente_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.data)
        .bind(data.ora)
        .bind(data.ritardo_breve)
        .bind(&data.note)
        .bind(data.valido)
        .bind(data.alunno_id)
        .bind(data.docente_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Late entry recorded with id {}", new_id);

        Ok(Entrata {
            id: new_id,
            timestamps,
            data: data.data,
            ora: data.ora,
            ritardo_breve: data.ritardo_breve,
            note: data.note.clone(),
            valido: data.valido,
            giustificazione: Giustificazione::default(),
            alunno_id: data.alunno_id,
            docente_id: data.docente_id,
        })
    }
}

impl Read<Entrata, i32> for EntrataRepository {
    #[instrument(skip(self), fields(entrata_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Entrata>, Error> {
        sqlx::query_as::<_, Entrata>(&format!(
            "SELECT id, creato, modificato, data, ora, ritardo_breve, note, valido, \
             {COLONNE_GIUSTIFICAZIONE}, alunno_id, docente_id FROM gs_entrata WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* USCITA ************************* //

pub struct UscitaRepository {
    connection_pool: MySqlPool,
}

impl UscitaRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self, intervallo))]
    pub async fn find_by_alunno(
        &self,
        alunno_id: &i32,
        intervallo: &IntervalloQuery,
    ) -> Result<Vec<Uscita>, Error> {
        debug!("Listing early exits of student");
        let mut query_builder = QueryBuilder::new(format!(
            "SELECT id, creato, modificato, data, ora, note, valido, {COLONNE_GIUSTIFICAZIONE}, \
             alunno_id, docente_id FROM gs_uscita WHERE alunno_id = "
        ));
        query_builder.push_bind(alunno_id);
        filtra_intervallo(&mut query_builder, intervallo);
        query_builder.push(" ORDER BY data");

        query_builder
            .build_query_as::<Uscita>()
            .fetch_all(&self.connection_pool)
            .await
    }

    #[instrument(skip(self, uscita, precedente), fields(uscita_id = %uscita.id))]
    pub async fn salva_giustificazione(
        &self,
        uscita: &Uscita,
        precedente: &Giustificazione,
    ) -> Result<bool, Error> {
        debug!("Saving early exit justification");
        let salvata = salva_giustificazione(
            &self.connection_pool,
            "gs_uscita",
            &uscita.id,
            &uscita.giustificazione,
            precedente,
            uscita.timestamps.modificato,
        )
        .await?;
        if salvata {
            info!("Early exit justification saved");
        } else {
            warn!("Early exit changed by another request");
        }
        Ok(salvata)
    }
}

impl Create<Uscita, CreateUscitaDTO> for UscitaRepository {
    #[instrument(skip(self, data), fields(alunno_id = %data.alunno_id, data = %data.data))]
    async fn create(&self, data: &CreateUscitaDTO) -> Result<Uscita, Error> {
        debug!("Recording early exit");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_uscita (creato, modificato, data, ora, note, valido, alunno_id, docente_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.data)
        .bind(data.ora)
        .bind(&data.note)
        .bind(data.valido)
        .bind(data.alunno_id)
        .bind(data.docente_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Early exit recorded with id {}", new_id);

        Ok(Uscita {
            id: new_id,
            timestamps,
            data: data.data,
            ora: data.ora,
            note: data.note.clone(),
            valido: data.valido,
            giustificazione: Giustificazione::default(),
            alunno_id: data.alunno_id,
            docente_id: data.docente_id,
        })
    }
}

impl Read<Uscita, i32> for UscitaRepository {
    #[instrument(skip(self), fields(uscita_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Uscita>, Error> {
        sqlx::query_as::<_, Uscita>(&format!(
            "SELECT id, creato, modificato, data, ora, note, valido, {COLONNE_GIUSTIFICAZIONE}, \
             alunno_id, docente_id FROM gs_uscita WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn giorno(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("registro")))]
    async fn test_dichiarazione_dopo_convalida_non_sovrascrive(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = AssenzaRepository::new(pool);
        let assenza = repo
            .create(&CreateAssenzaDTO {
                data: giorno(3),
                alunno_id: 10,
                docente_id: 20,
            })
            .await?;

        // due richieste leggono la stessa assenza non giustificata
        let mut docente = repo.read(&assenza.id).await?.unwrap();
        let mut genitore = repo.read(&assenza.id).await?.unwrap();
        let letta = docente.giustificazione.clone();

        docente.giustificazione.convalida(20, giorno(4), Some("Visita medica")).unwrap();
        assert!(repo.salva_giustificazione(&docente, &letta).await?);

        // la dichiarazione del genitore parte dallo stato ormai superato
        genitore.giustificazione.dichiara(11, giorno(4), "Influenza").unwrap();
        assert!(!repo.salva_giustificazione(&genitore, &letta).await?);

        let salvata = repo.read(&assenza.id).await?.unwrap();
        assert_eq!(salvata.giustificazione.docente_giustifica_id, Some(20));
        assert_eq!(salvata.giustificazione.utente_giustifica_id, None);
        assert_eq!(salvata.giustificazione.motivazione.as_deref(), Some("Visita medica"));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("registro")))]
    async fn test_doppia_convalida_entrata(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = EntrataRepository::new(pool);
        let entrata = repo
            .create(&CreateEntrataDTO {
                data: giorno(5),
                ora: NaiveTime::from_hms_opt(9, 10, 0).unwrap(),
                ritardo_breve: false,
                note: None,
                valido: true,
                alunno_id: 10,
                docente_id: 20,
            })
            .await?;

        let mut prima = repo.read(&entrata.id).await?.unwrap();
        let mut seconda = repo.read(&entrata.id).await?.unwrap();
        let letta = prima.giustificazione.clone();

        prima.giustificazione.convalida(20, giorno(5), Some("Treno in ritardo")).unwrap();
        seconda.giustificazione.convalida(21, giorno(5), Some("Altro")).unwrap();

        assert!(repo.salva_giustificazione(&prima, &letta).await?);
        assert!(!repo.salva_giustificazione(&seconda, &letta).await?);

        let salvata = repo.read(&entrata.id).await?.unwrap();
        assert_eq!(salvata.giustificazione.docente_giustifica_id, Some(20));

        Ok(())
    }
}
