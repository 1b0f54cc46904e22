use derive_more::Display;
use diesel::result::{DatabaseErrorKind, Error as DBError};
use actix_web::{ResponseError, web::HttpResponse, http::header};
use std::convert::Into;

#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error: {}", _0)]
    InternalServerError(String),

    #[display(fmt = "Invalid input: {}", _0)]
    Validation(String),

    #[display(fmt = "{} Not Found", _0)]
    NotFound(String),

    #[display(fmt = "Not authorized")]
    Unauthorized,

    #[display(fmt = "Invalid email or password")]
    InvalidCredentials,

    #[display(fmt = "Login Required")]
    LoginRequired,

    #[display(fmt = "{} Already Present", _0)]
    AlreadyPresent(String),
}

impl From<DBError> for ServiceError {
    fn from(error: DBError) -> ServiceError {
        match error {
            DBError::DatabaseError(kind, info) => {
                let message = info.details().unwrap_or_else(|| info.message()).to_string();
                if let DatabaseErrorKind::UniqueViolation = kind {
                    ServiceError::AlreadyPresent(message)
                } else {
                    ServiceError::InternalServerError(format!("DB error, {:?} {:?}", kind, info))
                }
            }
            err => ServiceError::InternalServerError(format!("DB error, {}", err)),
        }
    }
}

impl From<r2d2::Error> for ServiceError {
    fn from(error: r2d2::Error) -> ServiceError {
        ServiceError::InternalServerError(format!("Pool error: {}", error))
    }
}

fn redirect_to_login(error: &str) -> HttpResponse {
    let query = serde_urlencoded::to_string(&[("error", error)]).unwrap_or_default();
    HttpResponse::Found()
        .header(header::LOCATION, format!("/login?{}", query))
        .finish()
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError(x) => {
                log::error!("internal error: {}", x);
                HttpResponse::InternalServerError().message_body("Internal server error".into())
            },
            ServiceError::Validation(x) => HttpResponse::BadRequest().message_body(format!("Invalid input: {}", x).into()),
            ServiceError::NotFound(x) => HttpResponse::NotFound().message_body(format!("{} Not Found", x).into()),
            // Denied requests bounce back to the login page, they never surface an error page
            ServiceError::Unauthorized => redirect_to_login("Not authorized."),
            ServiceError::InvalidCredentials => redirect_to_login("Invalid email or password."),
            ServiceError::LoginRequired => HttpResponse::Found()
                .header(header::LOCATION, "/login")
                .finish(),
            ServiceError::AlreadyPresent(x) => HttpResponse::BadRequest().message_body(format!("{} Already Present", x).into()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
