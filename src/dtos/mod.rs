//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod comunicazione;
pub mod configurazione;
pub mod disciplina;
pub mod presenze;
pub mod query;
pub mod scrutinio;
pub mod scuola;
pub mod utente;
pub mod valutazione;

pub use comunicazione::{
    AllegatoDTO, ComunicazioneDTO, CreateAllegatoDTO, CreateAvvisoDTO, CreateCircolareDTO,
    CreateComunicazioneDTO, CreateDocumentoDTO,
};
pub use configurazione::{
    CreateConfigurazioneDTO, UpdateConfigurazioneDTO, ValoreConfigurazioneDTO,
};
pub use disciplina::{CreateAnnotazioneDTO, CreateNotaDTO, NotaDTO};
pub use presenze::{
    CreateAssenzaDTO, CreateEntrataDTO, CreateUscitaDTO, GiustificaDTO, PresenzeAlunnoDTO,
};
pub use query::{BachecaQuery, IntervalloQuery, ProposteQuery, ValutazioniQuery};
pub use scrutinio::{
    CambiaStatoDTO, CreateEsitoDTO, CreatePropostaVotoDTO, CreateScrutinioDTO,
    CreateStoricoEsitoDTO, CreateStoricoVotoDTO, CreateVotoScrutinioDTO,
};
pub use scuola::{
    ClasseDTO, CreateCattedraDTO, CreateClasseDTO, CreateCorsoDTO, CreateMateriaDTO,
    CreateSedeDTO, UpdateClasseDTO,
};
pub use utente::{
    AlunnoDTO, CreateAlunnoDTO, CreateAtaDTO, CreateDocenteDTO, CreateGenitoreDTO,
    CreateUtenteDTO, DocenteDTO, LoginDTO, UpdateUtenteDTO, UtenteDTO,
};
pub use valutazione::{CreateValutazioneDTO, MediaDTO, ValutazioneDTO};
