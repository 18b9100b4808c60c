use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;
use thiserror::Error;

/// Failure to render the metrics page. Device errors never get this far.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("unable to build metric registry: {0}")]
    Registry(String),
    #[error("metric exposition is not valid utf-8")]
    Utf8,
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        log::error!("{}", self);

        let error = format!(
            "<html><body><h3>500 Internal Server Error</h3>Unable to render metrics: <code>{}</code></body></html>",
            self
        );
        Response::build()
            .status(Status::InternalServerError)
            .sized_body(error.len(), Cursor::new(error))
            .header(ContentType::new("text", "html"))
            .ok()
    }
}

/// Errors that stop the exporter before it serves anything.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid listen address {0:?}: {1}")]
    ListenAddress(String, std::net::AddrParseError),
    #[error(transparent)]
    Api(#[from] fronius_exporter::Error),
    #[error(transparent)]
    Rocket(#[from] rocket::Error),
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn render_error_messages() {
        assert_eq!("metric exposition is not valid utf-8", Error::Utf8.to_string());
        assert_eq!(
            "unable to build metric registry: duplicate",
            Error::Registry(String::from("duplicate")).to_string()
        );
    }
}
