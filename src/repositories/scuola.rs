//! Repository della struttura scolastica: sedi, corsi, materie, classi e cattedre

use super::{Create, Read, ReadMany, Update};
use crate::dtos::{
    CreateCattedraDTO, CreateClasseDTO, CreateCorsoDTO, CreateMateriaDTO, CreateSedeDTO,
    UpdateClasseDTO,
};
use crate::entities::{Cattedra, Classe, Corso, Materia, Sede, Timestamps};
use chrono::Utc;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

// ************************* SEDE ************************* //

pub struct SedeRepository {
    connection_pool: MySqlPool,
}

impl SedeRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Sede, CreateSedeDTO> for SedeRepository {
    #[instrument(skip(self, data), fields(nome = %data.nome))]
    async fn create(&self, data: &CreateSedeDTO) -> Result<Sede, Error> {
        debug!("Creating site");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_sede (creato, modificato, nome, nome_breve, citta, indirizzo1, indirizzo2,
                telefono, ordinamento)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(&data.nome)
        .bind(&data.nome_breve)
        .bind(&data.citta)
        .bind(&data.indirizzo1)
        .bind(&data.indirizzo2)
        .bind(&data.telefono)
        .bind(data.ordinamento)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Site created with id {}", new_id);

        Ok(Sede {
            id: new_id,
            timestamps,
            nome: data.nome.clone(),
            nome_breve: data.nome_breve.clone(),
            citta: data.citta.clone(),
            indirizzo1: data.indirizzo1.clone(),
            indirizzo2: data.indirizzo2.clone(),
            telefono: data.telefono.clone(),
            ordinamento: data.ordinamento,
        })
    }
}

impl Read<Sede, i32> for SedeRepository {
    #[instrument(skip(self), fields(sede_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Sede>, Error> {
        sqlx::query_as::<_, Sede>(
            r#"
            SELECT id, creato, modificato, nome, nome_breve, citta, indirizzo1, indirizzo2,
                telefono, ordinamento
            FROM gs_sede WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* CORSO ************************* //

pub struct CorsoRepository {
    connection_pool: MySqlPool,
}

impl CorsoRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Corso, CreateCorsoDTO> for CorsoRepository {
    #[instrument(skip(self, data), fields(nome = %data.nome))]
    async fn create(&self, data: &CreateCorsoDTO) -> Result<Corso, Error> {
        debug!("Creating course");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            "INSERT INTO gs_corso (creato, modificato, nome, nome_breve) VALUES (?, ?, ?, ?)",
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(&data.nome)
        .bind(&data.nome_breve)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Course created with id {}", new_id);

        Ok(Corso {
            id: new_id,
            timestamps,
            nome: data.nome.clone(),
            nome_breve: data.nome_breve.clone(),
        })
    }
}

// ************************* MATERIA ************************* //

pub struct MateriaRepository {
    connection_pool: MySqlPool,
}

impl MateriaRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl Create<Materia, CreateMateriaDTO> for MateriaRepository {
    #[instrument(skip(self, data), fields(nome = %data.nome))]
    async fn create(&self, data: &CreateMateriaDTO) -> Result<Materia, Error> {
        debug!("Creating subject");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_materia (creato, modificato, nome, nome_breve, tipo, valutazione, media, ordinamento)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(&data.nome)
        .bind(&data.nome_breve)
        .bind(data.tipo)
        .bind(data.valutazione)
        .bind(data.media)
        .bind(data.ordinamento)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Subject created with id {}", new_id);

        Ok(Materia {
            id: new_id,
            timestamps,
            nome: data.nome.clone(),
            nome_breve: data.nome_breve.clone(),
            tipo: data.tipo,
            valutazione: data.valutazione,
            media: data.media,
            ordinamento: data.ordinamento,
        })
    }
}

impl Read<Materia, i32> for MateriaRepository {
    #[instrument(skip(self), fields(materia_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Materia>, Error> {
        sqlx::query_as::<_, Materia>(
            r#"
            SELECT id, creato, modificato, nome, nome_breve, tipo, valutazione, media, ordinamento
            FROM gs_materia WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

// ************************* CLASSE ************************* //

const COLONNE_CLASSE: &str =
    "id, creato, modificato, anno, sezione, ore_settimanali, sede_id, corso_id, coordinatore_id, segretario_id";

pub struct ClasseRepository {
    connection_pool: MySqlPool,
}

impl ClasseRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Tutte le classi, ordinate per anno e sezione
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Classe>, Error> {
        debug!("Listing classes");
        sqlx::query_as::<_, Classe>(&format!(
            "SELECT {COLONNE_CLASSE} FROM gs_classe ORDER BY anno, sezione"
        ))
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Classi di cui il docente è coordinatore
    #[instrument(skip(self))]
    pub async fn find_by_coordinatore(&self, docente_id: &i32) -> Result<Vec<Classe>, Error> {
        sqlx::query_as::<_, Classe>(&format!(
            "SELECT {COLONNE_CLASSE} FROM gs_classe WHERE coordinatore_id = ?"
        ))
        .bind(docente_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Classe, CreateClasseDTO> for ClasseRepository {
    #[instrument(skip(self, data), fields(anno = %data.anno, sezione = %data.sezione))]
    async fn create(&self, data: &CreateClasseDTO) -> Result<Classe, Error> {
        debug!("Creating class");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_classe (creato, modificato, anno, sezione, ore_settimanali, sede_id,
                corso_id, coordinatore_id, segretario_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.anno)
        .bind(&data.sezione)
        .bind(data.ore_settimanali)
        .bind(data.sede_id)
        .bind(data.corso_id)
        .bind(data.coordinatore_id)
        .bind(data.segretario_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Class created with id {}", new_id);

        Ok(Classe {
            id: new_id,
            timestamps,
            anno: data.anno,
            sezione: data.sezione.clone(),
            ore_settimanali: data.ore_settimanali,
            sede_id: data.sede_id,
            corso_id: data.corso_id,
            coordinatore_id: data.coordinatore_id,
            segretario_id: data.segretario_id,
        })
    }
}

impl Read<Classe, i32> for ClasseRepository {
    #[instrument(skip(self), fields(classe_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Classe>, Error> {
        debug!("Reading class by id");
        sqlx::query_as::<_, Classe>(&format!("SELECT {COLONNE_CLASSE} FROM gs_classe WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl ReadMany<Classe, i32> for ClasseRepository {
    #[instrument(skip(self), fields(count = ids.len()))]
    async fn read_many(&self, ids: &[i32]) -> Result<Vec<Classe>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::new(format!(
            "SELECT {COLONNE_CLASSE} FROM gs_classe WHERE id IN ("
        ));
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<Classe>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Update<Classe, UpdateClasseDTO, i32> for ClasseRepository {
    #[instrument(skip(self, data), fields(classe_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateClasseDTO) -> Result<Classe, Error> {
        debug!("Updating class");
        let mut classe = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.ore_settimanali.is_none()
            && data.coordinatore_id.is_none()
            && data.segretario_id.is_none()
        {
            debug!("No fields to update, returning current class");
            return Ok(classe);
        }

        classe.timestamps.pre_update(Utc::now());

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE gs_classe SET ");
        let mut separated = query_builder.separated(", ");
        separated.push("modificato = ");
        separated.push_bind_unseparated(classe.timestamps.modificato);
        if let Some(ore) = data.ore_settimanali {
            separated.push("ore_settimanali = ");
            separated.push_bind_unseparated(ore);
        }
        if let Some(coordinatore_id) = data.coordinatore_id {
            separated.push("coordinatore_id = ");
            separated.push_bind_unseparated(coordinatore_id);
        }
        if let Some(segretario_id) = data.segretario_id {
            separated.push("segretario_id = ");
            separated.push_bind_unseparated(segretario_id);
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(id);

        query_builder.build().execute(&self.connection_pool).await?;

        info!("Class updated successfully");
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

// ************************* CATTEDRA ************************* //

const COLONNE_CATTEDRA: &str =
    "id, creato, modificato, attiva, supplenza, tipo, materia_id, docente_id, classe_id, alunno_id";

pub struct CattedraRepository {
    connection_pool: MySqlPool,
}

impl CattedraRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Cattedre attive del docente
    #[instrument(skip(self))]
    pub async fn find_attive_by_docente(&self, docente_id: &i32) -> Result<Vec<Cattedra>, Error> {
        debug!("Listing active teaching assignments of teacher");
        sqlx::query_as::<_, Cattedra>(&format!(
            "SELECT {COLONNE_CATTEDRA} FROM gs_cattedra WHERE docente_id = ? AND attiva = TRUE"
        ))
        .bind(docente_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Il docente insegna la materia nella classe con una cattedra attiva
    #[instrument(skip(self))]
    pub async fn esiste_attiva(
        &self,
        docente_id: &i32,
        classe_id: &i32,
        materia_id: &i32,
    ) -> Result<bool, Error> {
        let (numero,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM gs_cattedra
            WHERE docente_id = ? AND classe_id = ? AND materia_id = ? AND attiva = TRUE
            "#,
        )
        .bind(docente_id)
        .bind(classe_id)
        .bind(materia_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(numero > 0)
    }
}

impl Create<Cattedra, CreateCattedraDTO> for CattedraRepository {
    #[instrument(skip(self, data), fields(docente_id = %data.docente_id, classe_id = %data.classe_id))]
    async fn create(&self, data: &CreateCattedraDTO) -> Result<Cattedra, Error> {
        debug!("Creating teaching assignment");
        let timestamps = Timestamps::pre_persist(Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO gs_cattedra (creato, modificato, attiva, supplenza, tipo, materia_id,
                docente_id, classe_id, alunno_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(timestamps.creato)
        .bind(timestamps.modificato)
        .bind(data.attiva)
        .bind(data.supplenza)
        .bind(data.tipo)
        .bind(data.materia_id)
        .bind(data.docente_id)
        .bind(data.classe_id)
        .bind(data.alunno_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;
        info!("Teaching assignment created with id {}", new_id);

        Ok(Cattedra {
            id: new_id,
            timestamps,
            attiva: data.attiva,
            supplenza: data.supplenza,
            tipo: data.tipo,
            materia_id: data.materia_id,
            docente_id: data.docente_id,
            classe_id: data.classe_id,
            alunno_id: data.alunno_id,
        })
    }
}
