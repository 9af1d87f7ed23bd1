// TrainerHub client
//
// Typed access to the TrainerHub REST API and function endpoints. Error responses are
// normalized into `ApiException`; `retry_request` re-runs calls that failed for reasons
// other than a 4xx.

pub mod api;
pub mod client;
pub mod error;
pub mod interceptor;
pub mod retry;

pub use api::{AuthApi, FunctionsApi, TraineeApi, TrainerApi};
pub use client::{ApiClient, ClientConfig};
pub use error::{ApiException, ApiResult, ErrorCode};
pub use interceptor::{LoggingInterceptor, RequestInterceptor, ResponseInterceptor};
pub use retry::{retry_request, RetryPolicy};
