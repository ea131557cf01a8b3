#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod config;
pub mod error;
pub mod http;
pub mod quiz_runner;
pub mod session_client;

pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use config::ClientConfig;
pub use error::{ApiError, AuthError, ErrorBody, QuizRunError, TransportError};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use quiz_runner::{QuizCompletion, QuizRunner};
pub use session_client::{AccessToken, ResponseBody, SessionClient};
