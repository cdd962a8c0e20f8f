use crate::utils::auth::decode_session_token;
use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

/// Session verifier. Every request passing through must carry a valid
/// `Authorization: Bearer <token>` header; the decoded claims are placed
/// in request extensions so handlers can extract them with
/// `web::ReqData<Claims>`. Rejection happens before any handler or store
/// access runs.
pub struct SessionAuth;

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService { service }))
    }
}

pub struct SessionAuthService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|t| t.to_string());

        let claims = match token {
            Some(t) => match decode_session_token(&t) {
                Ok(claims) => claims,
                Err(_) => {
                    let (req, _pl) = req.into_parts();
                    let res = actix_web::HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "Invalid or expired session"
                    }));
                    return Box::pin(async move {
                        Ok(ServiceResponse::new(req, res).map_into_right_body())
                    });
                }
            },
            None => {
                let (req, _pl) = req.into_parts();
                let res = actix_web::HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Unauthorized"
                }));
                return Box::pin(
                    async move { Ok(ServiceResponse::new(req, res).map_into_right_body()) },
                );
            }
        };

        req.extensions_mut().insert(claims);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
