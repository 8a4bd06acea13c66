//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository e la configurazione condivisa
//! necessari per gestire le richieste.

use crate::repositories::{
    AllegatoRepository, AlunnoRepository, AnnotazioneRepository, AssenzaRepository, AtaRepository,
    AvvisoRepository, CattedraRepository, CircolareRepository, ClasseRepository,
    ComunicazioneRepository, ConfigurazioneRepository, CorsoRepository, DocenteRepository,
    DocumentoRepository, EntrataRepository, EsitoRepository, GenitoreRepository,
    MateriaRepository, NotaRepository, PropostaVotoRepository, ScrutinioRepository,
    SedeRepository, StoricoRepository, UscitaRepository, UtenteRepository,
    ValutazioneRepository, VotoScrutinioRepository,
};
use sqlx::MySqlPool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    // utenti
    pub utente: UtenteRepository,
    pub alunno: AlunnoRepository,
    pub docente: DocenteRepository,
    pub genitore: GenitoreRepository,
    pub ata: AtaRepository,

    // struttura della scuola
    pub sede: SedeRepository,
    pub corso: CorsoRepository,
    pub materia: MateriaRepository,
    pub classe: ClasseRepository,
    pub cattedra: CattedraRepository,

    // presenze e disciplina
    pub assenza: AssenzaRepository,
    pub entrata: EntrataRepository,
    pub uscita: UscitaRepository,
    pub nota: NotaRepository,
    pub annotazione: AnnotazioneRepository,

    // valutazioni e scrutini
    pub valutazione: ValutazioneRepository,
    pub scrutinio: ScrutinioRepository,
    pub proposta: PropostaVotoRepository,
    pub voto_scrutinio: VotoScrutinioRepository,
    pub esito: EsitoRepository,
    pub storico: StoricoRepository,

    // comunicazioni
    pub comunicazione: ComunicazioneRepository,
    pub circolare: CircolareRepository,
    pub avviso: AvvisoRepository,
    pub documento: DocumentoRepository,
    pub allegato: AllegatoRepository,

    pub configurazione: ConfigurazioneRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni MySQL condiviso
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    pub fn new(pool: MySqlPool, jwt_secret: String) -> Self {
        Self {
            utente: UtenteRepository::new(pool.clone()),
            alunno: AlunnoRepository::new(pool.clone()),
            docente: DocenteRepository::new(pool.clone()),
            genitore: GenitoreRepository::new(pool.clone()),
            ata: AtaRepository::new(pool.clone()),
            sede: SedeRepository::new(pool.clone()),
            corso: CorsoRepository::new(pool.clone()),
            materia: MateriaRepository::new(pool.clone()),
            classe: ClasseRepository::new(pool.clone()),
            cattedra: CattedraRepository::new(pool.clone()),
            assenza: AssenzaRepository::new(pool.clone()),
            entrata: EntrataRepository::new(pool.clone()),
            uscita: UscitaRepository::new(pool.clone()),
            nota: NotaRepository::new(pool.clone()),
            annotazione: AnnotazioneRepository::new(pool.clone()),
            valutazione: ValutazioneRepository::new(pool.clone()),
            scrutinio: ScrutinioRepository::new(pool.clone()),
            proposta: PropostaVotoRepository::new(pool.clone()),
            voto_scrutinio: VotoScrutinioRepository::new(pool.clone()),
            esito: EsitoRepository::new(pool.clone()),
            storico: StoricoRepository::new(pool.clone()),
            comunicazione: ComunicazioneRepository::new(pool.clone()),
            circolare: CircolareRepository::new(pool.clone()),
            avviso: AvvisoRepository::new(pool.clone()),
            documento: DocumentoRepository::new(pool.clone()),
            allegato: AllegatoRepository::new(pool.clone()),
            configurazione: ConfigurazioneRepository::new(pool),
            jwt_secret,
        }
    }
}
