//! Repository degli utenti
//!
//! Tutti i ruoli condividono la tabella `gs_utente`: la riga base viene inserita con
//! `inserisci_utente`, le colonne del ruolo sono poi valorizzate nella stessa transazione.
//! Le letture dei ruoli filtrano sempre sulla colonna discriminante `ruolo`.

use super::{Create, Read, Update};
use crate::dtos::{
    CreateAlunnoDTO, CreateAtaDTO, CreateDocenteDTO, CreateGenitoreDTO, CreateUtenteDTO,
    UpdateUtenteDTO,
};
use crate::entities::{Alunno, Ata, ChiaviAccesso, Docente, Genitore, Ruolo, Timestamps, Utente};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Error, MySqlConnection, MySqlPool};
use tracing::{debug, info, instrument};

const COLONNE_UTENTE: &str = "id, creato, modificato, ruolo, username, password, email, token, \
    token_creato, ultimo_accesso, abilitato, spid, nome, cognome, sesso, data_nascita, \
    comune_nascita, codice_fiscale, citta, indirizzo, numeri_telefono";

const COLONNE_ALUNNO: &str = "bes, note_bes, autorizza_entrata, autorizza_uscita, note, \
    frequenza_estero, religione, credito3, credito4, giustifica_online, richiesta_certificato, \
    foto, classe_id";

const COLONNE_DOCENTE: &str =
    "responsabile_bes, responsabile_bes_sede_id, otp, ultimo_otp, chiave1, chiave2, chiave3, sede_id";

const COLONNE_GENITORE: &str = "giustifica_online, alunno_id";

const COLONNE_ATA: &str = "tipo_ata, segreteria, sede_id";

// ruoli che corrispondono a una riga Docente
const RUOLI_DOCENTE: &str = "('DOCENTE', 'STAFF', 'PRESIDE')";

/// Inserisce la riga base dell'utente e restituisce l'id generato
async fn inserisci_utente(
    conn: &mut MySqlConnection,
    ruolo: Ruolo,
    data: &CreateUtenteDTO,
    now: DateTime<Utc>,
) -> Result<i32, Error> {
    let timestamps = Timestamps::pre_persist(now);
    let result = sqlx::query(
        r#"
        INSERT INTO gs_utente (creato, modificato, ruolo, username, password, email, abilitato,
            spid, nome, cognome, sesso, data_nascita, comune_nascita, codice_fiscale, citta,
            indirizzo, numeri_telefono)
        VALUES (?, ?, ?, ?, ?, ?, ?, FALSE, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(timestamps.creato)
    .bind(timestamps.modificato)
    .bind(ruolo)
    .bind(&data.username)
    .bind(&data.password)
    .bind(&data.email)
    .bind(data.abilitato)
    .bind(&data.nome)
    .bind(&data.cognome)
    .bind(data.sesso)
    .bind(data.data_nascita)
    .bind(&data.comune_nascita)
    .bind(&data.codice_fiscale)
    .bind(&data.citta)
    .bind(&data.indirizzo)
    .bind(Json(&data.numeri_telefono))
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_id() as i32)
}

// ************************* UTENTE ************************* //

pub struct UtenteRepository {
    connection_pool: MySqlPool,
}

impl UtenteRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Lo username è univoco per tutti i ruoli
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Utente>, Error> {
        debug!("Finding user by username");
        let utente = sqlx::query_as::<_, Utente>(&format!(
            "SELECT {COLONNE_UTENTE} FROM gs_utente WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(utente)
    }

    #[instrument(skip(self))]
    pub async fn aggiorna_ultimo_accesso(&self, id: &i32, now: DateTime<Utc>) -> Result<(), Error> {
        // l'accesso non è una modifica dei dati: modificato resta invariato
        sqlx::query("UPDATE gs_utente SET ultimo_accesso = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

/// Gli utenti senza specializzazione sono gli amministratori
impl Create<Utente, CreateUtenteDTO> for UtenteRepository {
    #[instrument(skip(self, data), fields(username = %data.username))]
    async fn create(&self, data: &CreateUtenteDTO) -> Result<Utente, Error> {
        debug!("Creating administrator");
        let mut conn = self.connection_pool.acquire().await?;
        let id = inserisci_utente(&mut *conn, Ruolo::Amministratore, data, Utc::now()).await?;
        info!("Administrator created with id {}", id);

        self.read(&id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Utente, i32> for UtenteRepository {
    #[instrument(skip(self), fields(utente_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Utente>, Error> {
        debug!("Reading user by id");
        sqlx::query_as::<_, Utente>(&format!("SELECT {COLONNE_UTENTE} FROM gs_utente WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Utente, UpdateUtenteDTO, i32> for UtenteRepository {
    #[instrument(skip(self, data), fields(utente_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateUtenteDTO) -> Result<Utente, Error> {
        debug!("Updating user");
        let mut utente = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.password.is_none()
            && data.email.is_none()
            && data.abilitato.is_none()
            && data.citta.is_none()
            && data.indirizzo.is_none()
            && data.numeri_telefono.is_none()
        {
            debug!("No fields to update, returning current user");
            return Ok(utente);
        }

        utente.timestamps.pre_update(Utc::now());

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE gs_utente SET ");
        let mut separated = query_builder.separated(", ");
        separated.push("modificato = ");
        separated.push_bind_unseparated(utente.timestamps.modificato);
        if let Some(ref password) = data.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref email) = data.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(abilitato) = data.abilitato {
            separated.push("abilitato = ");
            separated.push_bind_unseparated(abilitato);
        }
        if let Some(ref citta) = data.citta {
            separated.push("citta = ");
            separated.push_bind_unseparated(citta);
        }
        if let Some(ref indirizzo) = data.indirizzo {
            separated.push("indirizzo = ");
            separated.push_bind_unseparated(indirizzo);
        }
        if let Some(ref numeri) = data.numeri_telefono {
            separated.push("numeri_telefono = ");
            separated.push_bind_unseparated(Json(numeri));
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(id);

        query_builder.build().execute(&self.connection_pool).await?;

        info!("User updated successfully");
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

// ************************* ALUNNO ************************* //

pub struct AlunnoRepository {
    connection_pool: MySqlPool,
}

impl AlunnoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Alunni iscritti alla classe, in ordine alfabetico
    #[instrument(skip(self))]
    pub async fn find_by_classe(&self, classe_id: &i32) -> Result<Vec<Alunno>, Error> {
        debug!("Listing students of class");
        let alunni = sqlx::query_as::<_, Alunno>(&format!(
            "SELECT {COLONNE_UTENTE}, {COLONNE_ALUNNO} FROM gs_utente \
             WHERE ruolo = 'ALUNNO' AND classe_id = ? ORDER BY cognome, nome"
        ))
        .bind(classe_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Found {} students", alunni.len());
        Ok(alunni)
    }
}

impl Create<Alunno, CreateAlunnoDTO> for AlunnoRepository {
    #[instrument(skip(self, data), fields(username = %data.utente.username))]
    async fn create(&self, data: &CreateAlunnoDTO) -> Result<Alunno, Error> {
        debug!("Creating student");
        let mut tx = self.connection_pool.begin().await?;
        let id = inserisci_utente(&mut *tx, Ruolo::Alunno, &data.utente, Utc::now()).await?;

        sqlx::query(
            r#"
            UPDATE gs_utente SET bes = ?, note_bes = ?, religione = ?, frequenza_estero = ?,
                giustifica_online = ?, richiesta_certificato = FALSE, classe_id = ?
            WHERE id = ?
            "#,
        )
        .bind(data.bes)
        .bind(&data.note_bes)
        .bind(data.religione)
        .bind(data.frequenza_estero)
        .bind(data.giustifica_online)
        .bind(data.classe_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Student created with id {}", id);

        self.read(&id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Alunno, i32> for AlunnoRepository {
    #[instrument(skip(self), fields(alunno_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Alunno>, Error> {
        debug!("Reading student by id");
        sqlx::query_as::<_, Alunno>(&format!(
            "SELECT {COLONNE_UTENTE}, {COLONNE_ALUNNO} FROM gs_utente WHERE id = ? AND ruolo = 'ALUNNO'"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* DOCENTE ************************* //

pub struct DocenteRepository {
    connection_pool: MySqlPool,
}

impl DocenteRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Memorizza le chiavi di accesso generate per il docente
    #[instrument(skip(self, chiavi), fields(docente_id = %id))]
    pub async fn salva_chiavi(&self, id: &i32, chiavi: &ChiaviAccesso) -> Result<(), Error> {
        debug!("Saving access keys");
        let result = sqlx::query(&format!(
            "UPDATE gs_utente SET chiave1 = ?, chiave2 = ?, chiave3 = ?, modificato = ? \
             WHERE id = ? AND ruolo IN {RUOLI_DOCENTE}"
        ))
        .bind(&chiavi.chiave1)
        .bind(&chiavi.chiave2)
        .bind(&chiavi.chiave3)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Access keys saved");
        Ok(())
    }
}

/// Crea docenti, staff e presidi: il ruolo viene dal DTO
impl Create<Docente, CreateDocenteDTO> for DocenteRepository {
    #[instrument(skip(self, data), fields(username = %data.utente.username, ruolo = ?data.ruolo))]
    async fn create(&self, data: &CreateDocenteDTO) -> Result<Docente, Error> {
        debug!("Creating teacher");
        let mut tx = self.connection_pool.begin().await?;
        let id = inserisci_utente(&mut *tx, data.ruolo, &data.utente, Utc::now()).await?;

        sqlx::query(
            "UPDATE gs_utente SET responsabile_bes = ?, responsabile_bes_sede_id = ?, sede_id = ? WHERE id = ?",
        )
        .bind(data.responsabile_bes)
        .bind(data.responsabile_bes_sede_id)
        .bind(data.sede_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Teacher created with id {}", id);

        self.read(&id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Docente, i32> for DocenteRepository {
    #[instrument(skip(self), fields(docente_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Docente>, Error> {
        debug!("Reading teacher by id");
        sqlx::query_as::<_, Docente>(&format!(
            "SELECT {COLONNE_UTENTE}, {COLONNE_DOCENTE} FROM gs_utente WHERE id = ? AND ruolo IN {RUOLI_DOCENTE}"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* GENITORE ************************* //

pub struct GenitoreRepository {
    connection_pool: MySqlPool,
}

impl GenitoreRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Genitore, CreateGenitoreDTO> for GenitoreRepository {
    #[instrument(skip(self, data), fields(username = %data.utente.username, alunno_id = %data.alunno_id))]
    async fn create(&self, data: &CreateGenitoreDTO) -> Result<Genitore, Error> {
        debug!("Creating parent");
        let mut tx = self.connection_pool.begin().await?;
        let id = inserisci_utente(&mut *tx, Ruolo::Genitore, &data.utente, Utc::now()).await?;

        sqlx::query("UPDATE gs_utente SET giustifica_online = ?, alunno_id = ? WHERE id = ?")
            .bind(data.giustifica_online)
            .bind(data.alunno_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Parent created with id {}", id);

        self.read(&id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Genitore, i32> for GenitoreRepository {
    #[instrument(skip(self), fields(genitore_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Genitore>, Error> {
        debug!("Reading parent by id");
        sqlx::query_as::<_, Genitore>(&format!(
            "SELECT {COLONNE_UTENTE}, {COLONNE_GENITORE} FROM gs_utente WHERE id = ? AND ruolo = 'GENITORE'"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* ATA ************************* //

pub struct AtaRepository {
    connection_pool: MySqlPool,
}

impl AtaRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Ata, CreateAtaDTO> for AtaRepository {
    #[instrument(skip(self, data), fields(username = %data.utente.username, tipo_ata = ?data.tipo_ata))]
    async fn create(&self, data: &CreateAtaDTO) -> Result<Ata, Error> {
        debug!("Creating ATA staff member");
        let mut tx = self.connection_pool.begin().await?;
        let id = inserisci_utente(&mut *tx, Ruolo::Ata, &data.utente, Utc::now()).await?;

        sqlx::query("UPDATE gs_utente SET tipo_ata = ?, segreteria = ?, sede_id = ? WHERE id = ?")
            .bind(data.tipo_ata)
            .bind(data.segreteria)
            .bind(data.sede_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("ATA staff member created with id {}", id);

        self.read(&id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Ata, i32> for AtaRepository {
    #[instrument(skip(self), fields(ata_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Ata>, Error> {
        debug!("Reading ATA staff member by id");
        sqlx::query_as::<_, Ata>(&format!(
            "SELECT {COLONNE_UTENTE}, {COLONNE_ATA} FROM gs_utente WHERE id = ? AND ruolo = 'ATA'"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
