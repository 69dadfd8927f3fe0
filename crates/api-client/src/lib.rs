pub mod client;
pub mod error;
pub mod repository;

pub use clinicase_api;
pub use client::ApiClient;
pub use error::ClientError;
pub use repository::CaseRepository;
