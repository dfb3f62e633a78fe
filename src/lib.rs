pub mod config;
pub mod digest;
pub mod humanize;
pub mod observability;
pub mod worker;

pub use digest::{Algorithm, ContentDigest, DigestError, Digester, ErrorKind, RunReport};
pub use worker::{Fetch, HttpConfig, HttpFetcher};
