//! Hooks run around every request made by [`crate::ApiClient`]

use reqwest::{Method, Request, StatusCode};
use tracing::{debug, error};

use crate::error::ApiException;

/// Runs before a request is sent and may change it
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: &mut Request);
}

/// Observes responses and failures
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, method: &Method, url: &str, status: StatusCode);

    fn on_error(&self, _method: &Method, _url: &str, _error: &ApiException) {}
}

/// Logs requests, responses and errors through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterceptor;

impl RequestInterceptor for LoggingInterceptor {
    fn on_request(&self, request: &mut Request) {
        debug!("API Request: {} {}", request.method(), request.url().path());
    }
}

impl ResponseInterceptor for LoggingInterceptor {
    fn on_response(&self, method: &Method, url: &str, status: StatusCode) {
        debug!("API Response: {} {} -> {}", method, url, status.as_u16());
    }

    fn on_error(&self, method: &Method, url: &str, error: &ApiException) {
        error!(
            "API Error: {} {} -> {} {} ({})",
            method, url, error.status_code, error.code, error.message
        );
    }
}
