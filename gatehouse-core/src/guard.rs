// Guards for route protection

use crate::{Error, HttpRequest};
use async_trait::async_trait;

/// Execution context handed to guards
pub struct GuardContext<'a> {
    pub request: &'a HttpRequest,
}

impl<'a> GuardContext<'a> {
    pub fn new(request: &'a HttpRequest) -> Self {
        Self { request }
    }

    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.request.header(name)
    }

    pub fn get_param(&self, name: &str) -> Option<&String> {
        self.request.param(name)
    }
}

/// Guard trait for protecting routes
#[async_trait]
pub trait Guard: Send + Sync {
    /// Determine if the request can proceed
    async fn can_activate(&self, context: &GuardContext<'_>) -> Result<bool, Error>;
}

/// Runs guards in order; the first rejection wins.
pub async fn run_guards(guards: &[&dyn Guard], request: &HttpRequest) -> Result<(), Error> {
    let context = GuardContext::new(request);
    for guard in guards {
        if !guard.can_activate(&context).await? {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
    }
    Ok(())
}
