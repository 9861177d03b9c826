pub mod config;
pub mod error;
pub mod library;
pub mod multipart;
pub mod netinfo;
pub mod response;
pub mod server;
pub mod state;
pub mod utils;

mod session;

pub use error::{ParseError, ServerError};
pub use server::BookServer;
pub use state::{ReceivedFile, ServerState, UploadProgress};
