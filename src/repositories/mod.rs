//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! I repository sono raggruppati per area del registro (utenti, struttura della scuola,
//! presenze, disciplina, valutazioni, scrutini, comunicazioni, configurazione).
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SULLE QUERY ************************* //

/*
   Le query sono scritte con sqlx::query / sqlx::query_as::<_, Entity>(...) e non con le
   macro query! / query_as!: le macro verificano la query a compile time ma richiedono un
   database raggiungibile (o la cache offline) durante la build.
   La mappatura riga -> struct la fa #[derive(sqlx::FromRow)] sulle entity, quindi la
   lista di colonne della SELECT deve coincidere con i campi della struct (compresi quelli
   dentro #[sqlx(flatten)], come creato/modificato).

   Metodo da chiamare in base alle righe attese:
   .execute(...)         INSERT/UPDATE/DELETE, restituisce rows_affected e last_insert_id
   .fetch_optional(...)  zero o una riga -> Option<T>
   .fetch_one(...)       esattamente una riga, tipico per COUNT/MAX
   .fetch_all(...)       tutte le righe -> Vec<T>

   Gli errori sono sempre sqlx::Error propagati con ? fino al service, dove diventano AppError.
   Se un UPDATE non tocca righe restituiamo Error::RowNotFound (-> 404).
   Gli UPDATE di uno stato (giustificazioni, passi dello scrutinio) ripetono nella WHERE lo
   stato letto e restituiscono bool: false se un'altra richiesta l'ha già cambiato (-> 409).
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod comunicazione;
pub mod configurazione;
pub mod disciplina;
pub mod presenze;
pub mod scrutinio;
pub mod scuola;
pub mod traits;
pub mod utente;
pub mod valutazione;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, ReadMany, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use comunicazione::{
    AllegatoRepository, AvvisoRepository, CircolareRepository, ComunicazioneRepository,
    DocumentoRepository,
};
pub use configurazione::ConfigurazioneRepository;
pub use disciplina::{AnnotazioneRepository, NotaRepository};
pub use presenze::{AssenzaRepository, EntrataRepository, UscitaRepository};
pub use scrutinio::{
    EsitoRepository, PropostaVotoRepository, ScrutinioRepository, StoricoRepository,
    VotoScrutinioRepository,
};
pub use scuola::{
    CattedraRepository, ClasseRepository, CorsoRepository, MateriaRepository, SedeRepository,
};
pub use utente::{
    AlunnoRepository, AtaRepository, DocenteRepository, GenitoreRepository, UtenteRepository,
};
pub use valutazione::ValutazioneRepository;
