//! Normalizador del fichero fuente del directorio (`artists.toml`).
//!
//! Ordena las entradas, calcula el fingerprint que se publica como
//! `artists.hash` y, opcionalmente, exporta el árbol binario del bridge con
//! las redes y el avatar ya resueltos.

pub mod canonical;
pub mod config;
pub mod errors;
pub mod export;
pub mod fingerprint;
pub mod ordering;
pub mod runner;
pub mod socials;

pub use config::NormalizerConfig;
pub use errors::NormalizeError;
pub use fingerprint::Fingerprint;
pub use runner::{Mode, Normalizer, Options, RunReport};
