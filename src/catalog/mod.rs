// Catalog services (Sonarr/Radarr) and the HTTP seam used to reach them

pub mod client;
pub mod kind;
pub mod models;

#[cfg(test)]
pub mod testing;

pub use client::{CatalogClient, ReqwestTransport, Transport};
pub use kind::CatalogKind;
