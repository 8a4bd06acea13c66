//! Repository delle comunicazioni (circolari, avvisi, documenti) e degli allegati
//!
//! Le tre specializzazioni condividono `gs_comunicazione`: la riga comune viene
//! inserita da `inserisci_comunicazione`, le colonne proprie della categoria sono
//! scritte subito dopo nella stessa transazione.

use super::{Create, Read};
use crate::dtos::{
    CreateAllegatoDTO, CreateAvvisoDTO, CreateCircolareDTO, CreateComunicazioneDTO,
    CreateDocumentoDTO,
};
use crate::entities::{
    Allegato, Avviso, Categoria, Circolare, Comunicazione, Documento, StatoComunicazione,
    Timestamps,
};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Error, MySqlConnection, MySqlPool};
use tracing::{debug, info, instrument};

const COLONNE_COMUNICAZIONE: &str = "id, creato, modificato, categoria, titolo, data, anno, stato, \
    sedi, speciali, ata, coordinatori, filtro_coordinatori, docenti, filtro_docenti, genitori, \
    filtro_genitori, alunni, filtro_alunni, esterni, autore_id";

async fn inserisci_comunicazione(
    conn: &mut MySqlConnection,
    categoria: Categoria,
    data: &CreateComunicazioneDTO,
    timestamps: &Timestamps,
) -> Result<i32, Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO gs_comunicazione
            (creato, modificato, categoria, titolo, data, anno, stato, sedi, speciali, ata,
             coordinatori, filtro_coordinatori, docenti, filtro_docenti, genitori, filtro_genitori,
             alunni, filtro_alunni, esterni, autore_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(timestamps.creato)
    .bind(timestamps.modificato)
    .bind(categoria)
    .bind(&data.titolo)
    .bind(data.data)
    .bind(data.anno)
    .bind(data.stato)
    .bind(Json(&data.sedi))
    .bind(Json(&data.speciali))
    .bind(Json(&data.ata))
    .bind(data.coordinatori)
    .bind(Json(&data.filtro_coordinatori))
    .bind(data.docenti)
    .bind(Json(&data.filtro_docenti))
    .bind(data.genitori)
    .bind(Json(&data.filtro_genitori))
    .bind(data.alunni)
    .bind(Json(&data.filtro_alunni))
    .bind(Json(&data.esterni))
    .bind(data.autore_id)
    .execute(conn)
    .await?;

    Ok(result.last_insert_id() as i32)
}

fn comunicazione_creata(
    id: i32,
    categoria: Categoria,
    timestamps: Timestamps,
    data: &CreateComunicazioneDTO,
) -> Comunicazione {
    Comunicazione {
        id,
        timestamps,
        categoria,
        titolo: data.titolo.clone(),
        data: data.data,
        anno: data.anno,
        stato: data.stato,
        sedi: Json(data.sedi.clone()),
        speciali: Json(data.speciali.clone()),
        ata: Json(data.ata.clone()),
        coordinatori: data.coordinatori,
        filtro_coordinatori: Json(data.filtro_coordinatori.clone()),
        docenti: data.docenti,
        filtro_docenti: Json(data.filtro_docenti.clone()),
        genitori: data.genitori,
        filtro_genitori: Json(data.filtro_genitori.clone()),
        alunni: data.alunni,
        filtro_alunni: Json(data.filtro_alunni.clone()),
        esterni: Json(data.esterni.clone()),
        autore_id: data.autore_id,
    }
}

// ************************* COMUNICAZIONE ************************* //

pub struct ComunicazioneRepository {
    connection_pool: MySqlPool,
}

impl ComunicazioneRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Candidati per la bacheca: le comunicazioni pubblicate e quelle dell'autore
    ///
    /// I filtri sui destinatari vengono poi applicati con `Comunicazione::destinata_a`.
    #[instrument(skip(self))]
    pub async fn find_bacheca(
        &self,
        utente_id: &i32,
        categoria: Option<Categoria>,
    ) -> Result<Vec<Comunicazione>, Error> {
        debug!("Loading board candidates");
        sqlx::query_as::<_, Comunicazione>(&format!(
            "SELECT {COLONNE_COMUNICAZIONE} FROM gs_comunicazione \
             WHERE (stato = ? OR autore_id = ?) AND (? IS NULL OR categoria = ?) \
             ORDER BY data DESC, id DESC"
        ))
        .bind(StatoComunicazione::Pubblicato)
        .bind(utente_id)
        .bind(categoria)
        .bind(categoria)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Salva lo stato (pubblicazione o archiviazione) e l'istante di modifica
    #[instrument(skip(self, comunicazione), fields(comunicazione_id = %comunicazione.id))]
    pub async fn aggiorna_stato(&self, comunicazione: &Comunicazione) -> Result<(), Error> {
        let result = sqlx::query("UPDATE gs_comunicazione SET stato = ?, modificato = ? WHERE id = ?")
            .bind(comunicazione.stato)
            .bind(comunicazione.timestamps.modificato)
            .bind(comunicazione.id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Communication state changed to {:?}", comunicazione.stato);
        Ok(())
    }
}

impl Read<Comunicazione, i32> for ComunicazioneRepository {
    #[instrument(skip(self), fields(comunicazione_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Comunicazione>, Error> {
        sqlx::query_as::<_, Comunicazione>(&format!(
            "SELECT {COLONNE_COMUNICAZIONE} FROM gs_comunicazione WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* CIRCOLARE ************************* //

pub struct CircolareRepository {
    connection_pool: MySqlPool,
}

impl CircolareRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Primo numero libero per le circolari dell'anno
    #[instrument(skip(self))]
    pub async fn prossimo_numero(&self, anno: &i32) -> Result<i32, Error> {
        let (numero,): (Option<i32>,) = sqlx::query_as(
            "SELECT MAX(numero) FROM gs_comunicazione WHERE categoria = ? AND anno = ?",
        )
        .bind(Categoria::Circolare)
        .bind(anno)
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(numero.unwrap_or(0) + 1)
    }
}

impl Create<Circolare, CreateCircolareDTO> for CircolareRepository {
    #[instrument(skip(self, data), fields(anno = %data.comunicazione.anno, numero = %data.numero))]
    async fn create(&self, data: &CreateCircolareDTO) -> Result<Circolare, Error> {
        debug!("Creating circular");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let mut tx = self.connection_pool.begin().await?;

        let new_id =
            inserisci_comunicazione(&mut *tx, Categoria::Circolare, &data.comunicazione, &timestamps)
                .await?;
        sqlx::query("UPDATE gs_comunicazione SET numero = ? WHERE id = ?")
            .bind(data.numero)
            .bind(new_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Circular created with id {}", new_id);

        Ok(Circolare {
            comunicazione: comunicazione_creata(
                new_id,
                Categoria::Circolare,
                timestamps,
                &data.comunicazione,
            ),
            numero: data.numero,
        })
    }
}

impl Read<Circolare, i32> for CircolareRepository {
    #[instrument(skip(self), fields(circolare_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Circolare>, Error> {
        sqlx::query_as::<_, Circolare>(&format!(
            "SELECT {COLONNE_COMUNICAZIONE}, numero FROM gs_comunicazione \
             WHERE id = ? AND categoria = ?"
        ))
        .bind(id)
        .bind(Categoria::Circolare)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* AVVISO ************************* //

pub struct AvvisoRepository {
    connection_pool: MySqlPool,
}

impl AvvisoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Avviso, CreateAvvisoDTO> for AvvisoRepository {
    #[instrument(skip(self, data), fields(tipo = ?data.tipo_avviso))]
    async fn create(&self, data: &CreateAvvisoDTO) -> Result<Avviso, Error> {
        debug!("Creating notice");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let mut tx = self.connection_pool.begin().await?;

        let new_id =
            inserisci_comunicazione(&mut *tx, Categoria::Avviso, &data.comunicazione, &timestamps)
                .await?;
        sqlx::query(
            r#"
            UPDATE gs_comunicazione
            SET tipo_avviso = ?, ora = ?, ora_fine = ?, cattedra_id = ?, materia_id = ?
            WHERE id = ?
            "#,
        )
        .bind(data.tipo_avviso)
        .bind(data.ora)
        .bind(data.ora_fine)
        .bind(data.cattedra_id)
        .bind(data.materia_id)
        .bind(new_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Notice created with id {}", new_id);

        Ok(Avviso {
            comunicazione: comunicazione_creata(
                new_id,
                Categoria::Avviso,
                timestamps,
                &data.comunicazione,
            ),
            tipo_avviso: data.tipo_avviso,
            ora: data.ora,
            ora_fine: data.ora_fine,
            cattedra_id: data.cattedra_id,
            materia_id: data.materia_id,
        })
    }
}

impl Read<Avviso, i32> for AvvisoRepository {
    #[instrument(skip(self), fields(avviso_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Avviso>, Error> {
        sqlx::query_as::<_, Avviso>(&format!(
            "SELECT {COLONNE_COMUNICAZIONE}, tipo_avviso, ora, ora_fine, cattedra_id, materia_id \
             FROM gs_comunicazione WHERE id = ? AND categoria = ?"
        ))
        .bind(id)
        .bind(Categoria::Avviso)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* DOCUMENTO ************************* //

pub struct DocumentoRepository {
    connection_pool: MySqlPool,
}

impl DocumentoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Documento, CreateDocumentoDTO> for DocumentoRepository {
    #[instrument(skip(self, data), fields(tipo = ?data.tipo_documento))]
    async fn create(&self, data: &CreateDocumentoDTO) -> Result<Documento, Error> {
        debug!("Creating document");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let mut tx = self.connection_pool.begin().await?;

        let new_id =
            inserisci_comunicazione(&mut *tx, Categoria::Documento, &data.comunicazione, &timestamps)
                .await?;
        sqlx::query(
            r#"
            UPDATE gs_comunicazione
            SET tipo_documento = ?, classe_id = ?, materia_id = ?, alunno_id = ?, cifrato = ?
            WHERE id = ?
            "#,
        )
        .bind(data.tipo_documento)
        .bind(data.classe_id)
        .bind(data.materia_id)
        .bind(data.alunno_id)
        .bind(data.cifrato)
        .bind(new_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Document created with id {}", new_id);

        Ok(Documento {
            comunicazione: comunicazione_creata(
                new_id,
                Categoria::Documento,
                timestamps,
                &data.comunicazione,
            ),
            tipo_documento: data.tipo_documento,
            classe_id: data.classe_id,
            materia_id: data.materia_id,
            alunno_id: data.alunno_id,
            cifrato: data.cifrato,
        })
    }
}

impl Read<Documento, i32> for DocumentoRepository {
    #[instrument(skip(self), fields(documento_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Documento>, Error> {
        sqlx::query_as::<_, Documento>(&format!(
            "SELECT {COLONNE_COMUNICAZIONE}, tipo_documento, classe_id, materia_id, alunno_id, cifrato \
             FROM gs_comunicazione WHERE id = ? AND categoria = ?"
        ))
        .bind(id)
        .bind(Categoria::Documento)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* ALLEGATO ************************* //

pub struct AllegatoRepository {
    connection_pool: MySqlPool,
}

impl AllegatoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_comunicazione(
        &self,
        comunicazione_id: &i32,
    ) -> Result<Vec<Allegato>, Error> {
        sqlx::query_as::<_, Allegato>(
            r#"
            SELECT id, creato, modificato, titolo, nome, estensione, dimensione, file, comunicazione_id
            FROM gs_allegato
            WHERE comunicazione_id = ?
            ORDER BY id
            "#,
        )
        .bind(comunicazione_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Allegato, CreateAllegatoDTO> for AllegatoRepository {
    #[instrument(skip(self, data), fields(comunicazione_id = %data.comunicazione_id))]
    async fn create(&self, data: &CreateAllegatoDTO) -> Result<Allegato, Error> {
        debug!("Creating attachment");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_allegato
                (creato, modificato, titolo, nome, estensione, dimensione, file, comunicazione_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(&data.titolo)
        .bind(&data.nome)
        .bind(&data.estensione)
        .bind(data.dimensione)
        .bind(&data.file)
        .bind(data.comunicazione_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Attachment created with id {}", new_id);

        Ok(Allegato {
            id: new_id,
            timestamps,
            titolo: data.titolo.clone(),
            nome: data.nome.clone(),
            estensione: data.estensione.clone(),
            dimensione: data.dimensione,
            file: data.file.clone(),
            comunicazione_id: data.comunicazione_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("registro")))]
    async fn test_aggiorna_stato_salva_modifica(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = ComunicazioneRepository::new(pool);
        let mut bozza = repo.read(&3).await?.unwrap();
        let creato = bozza.timestamps.creato;
        let modificato = bozza.timestamps.modificato;

        bozza.stato = StatoComunicazione::Pubblicato;
        bozza.timestamps.pre_update(Utc::now());
        repo.aggiorna_stato(&bozza).await?;

        let salvata = repo.read(&3).await?.unwrap();
        assert_eq!(salvata.stato, StatoComunicazione::Pubblicato);
        assert_eq!(salvata.timestamps.creato, creato);
        assert!(salvata.timestamps.modificato > modificato);

        bozza.id = 99;
        assert!(matches!(repo.aggiorna_stato(&bozza).await, Err(Error::RowNotFound)));

        Ok(())
    }
}
