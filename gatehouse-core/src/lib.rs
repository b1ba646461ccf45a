// Gatehouse core: the HTTP surface shared by the other crates

pub mod error;
pub mod guard;
pub mod http;
pub mod status;

pub use error::{Error, Result};
pub use guard::{Guard, GuardContext, run_guards};
pub use http::{HttpRequest, HttpResponse};
pub use status::HttpStatus;
