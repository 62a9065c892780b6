pub mod agents;
pub mod health;
pub mod upload;

use actix_web::{HttpRequest, HttpResponse};

use crate::error::{Result, ServerError};

/// Fallback for routes that only accept POST.
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse> {
    Err(ServerError::MethodNotAllowed {
        method: req.method().to_string(),
        path: req.path().to_string(),
    })
}
