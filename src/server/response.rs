use actix_web::http::header::{
    ContentDisposition, ContentType, DispositionParam, DispositionType,
};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::builder::Artifact;
use crate::types::response::CommonResponse;

/// A wrapper struct for HTTP responses that provides convenient methods
/// for creating common response types
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    /// Failures never leak details to the caller, the cause is only logged.
    pub fn error() -> Self {
        Self {
            http_response: HttpResponse::InternalServerError().finish(),
        }
    }

    pub fn not_found(message: String) -> Self {
        Self::err_response(StatusCode::NOT_FOUND, message)
    }

    pub fn json<T: Serialize>(data: T) -> Self {
        Self {
            http_response: HttpResponse::Ok().json(data),
        }
    }

    pub fn html(body: Vec<u8>) -> Self {
        Self {
            http_response: HttpResponse::Ok()
                .insert_header(ContentType::html())
                .body(body),
        }
    }

    pub fn download(artifact: Artifact) -> Self {
        let disposition = ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(artifact.file_name)],
        };
        Self {
            http_response: HttpResponse::Ok()
                .insert_header(ContentType::octet_stream())
                .insert_header(disposition)
                .body(artifact.data),
        }
    }

    fn err_response(status: StatusCode, message: String) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(message),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::header;

    use crate::types::revision::Revision;

    use super::*;

    #[actix_web::test]
    async fn test_error() {
        let resp: HttpResponse = Response::error().into();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn test_json() {
        let resp: HttpResponse = Response::json(vec![Revision::new("master", "master")]).into();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(body, r#"[{"name":"master","reference":"master"}]"#);
    }

    #[actix_web::test]
    async fn test_download() {
        let artifact = Artifact {
            file_name: String::from("insights-core-3.0.8.egg"),
            data: b"egg".to_vec(),
        };
        let resp: HttpResponse = Response::download(artifact).into();
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(
            disposition,
            r#"attachment; filename="insights-core-3.0.8.egg""#
        );
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );

        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(body, "egg");
    }

    #[actix_web::test]
    async fn test_not_found() {
        let resp: HttpResponse = Response::not_found(String::from("No route to GET /x")).into();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(body, r#"{"code":404,"message":"No route to GET /x"}"#);
    }
}
