//! Trait comuni dei repository
//!
//! Interfacce generiche per le operazioni sul database. Gli id sono sempre generati
//! dal database e i timestamp `creato`/`modificato` sono impostati dal repository,
//! quindi i DTO di creazione non li contengono.

/// Inserimento di una nuova entità
///
/// # Type Parameters
/// * `Entity` - Entità restituita, con l'id assegnato dal database
/// * `CreateDTO` - Dati per la creazione (senza id né timestamp)
pub trait Create<Entity, CreateDTO> {
    /// Inserisce l'entità e la rilegge dal database
    ///
    /// # Returns
    /// * `Ok(Entity)` - Entità creata
    /// * `Err(sqlx::Error)` - Errore in inserimento (es. vincolo di unicità violato)
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Lettura di una singola entità per chiave primaria
pub trait Read<Entity, Id> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Entità trovata
    /// * `Ok(None)` - Nessuna entità con quell'id
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Lettura di più entità a partire da una lista di chiavi primarie
///
/// L'ordine del risultato non segue quello degli id richiesti.
pub trait ReadMany<Entity, Id> {
    async fn read_many(&self, ids: &[Id]) -> Result<Vec<Entity>, sqlx::Error>;
}

/// Aggiornamento parziale di un'entità esistente
///
/// Vengono modificati solo i campi `Some(_)` del DTO; `modificato` viene sempre aggiornato.
pub trait Update<Entity, UpdateDTO, Id> {
    /// # Returns
    /// * `Ok(Entity)` - Entità aggiornata
    /// * `Err(sqlx::Error::RowNotFound)` - Entità inesistente
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Cancellazione di un'entità
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
