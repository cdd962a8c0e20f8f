use crate::db::user_repository::UserRepository;
use crate::db::StoreError;
use crate::handlers::auth::UserResponse;
use crate::models::user::Claims;
use crate::utils::auth::create_session_token;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserResponse,
    /// Fresh session token carrying the updated claims. Existing tokens
    /// keep the stale cached profile until the client swaps to this one.
    pub token: String,
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn update_profile(
    claims: web::ReqData<Claims>,
    user_repo: web::Data<UserRepository>,
    payload: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    let name_len = payload.name.chars().count();
    if name_len < 2 || name_len > 60 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Name must be between 2 and 60 characters"
        }));
    }

    let user = match user_repo
        .update_profile(
            &claims.sub,
            &payload.name,
            payload.age,
            payload.phone.clone(),
            payload.image.clone(),
        )
        .await
    {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            // Valid token for an account that no longer exists
            warn!(user_id = %claims.sub, "Profile update for missing user");
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Unauthorized"
            }));
        }
        Err(e) => {
            error!(error = %e, user_id = %claims.sub, "Failed to update profile");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error"
            }));
        }
    };

    // Re-issue the session so its cached profile claims match the store
    let token = match create_session_token(&user) {
        Ok(t) => t,
        Err(e) => {
            error!(error = ?e, user_id = %user.id, "Failed to mint refreshed session token");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error"
            }));
        }
    };

    info!(user_id = %user.id, "Profile updated");

    HttpResponse::Ok().json(ProfileResponse {
        message: "Profile updated".to_string(),
        user: UserResponse::from(&user),
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::middleware::auth::SessionAuth;
    use crate::models::user::User;
    use crate::utils::auth::decode_session_token;
    use actix_web::{test, App};
    use chrono::Utc;

    async fn seeded_repo() -> (web::Data<UserRepository>, User) {
        let repo = UserRepository::new(Database::temporary().unwrap());
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "hash".to_string(),
            image: None,
            age: None,
            phone: None,
            created_at: Utc::now(),
        };
        repo.create(user.clone()).await.unwrap();
        (web::Data::new(repo), user)
    }

    #[actix_web::test]
    async fn test_update_profile_refreshes_claims() {
        let (repo, user) = seeded_repo().await;
        let app = test::init_service(
            App::new().app_data(repo.clone()).service(
                web::scope("/api")
                    .wrap(SessionAuth)
                    .route("/profile", web::put().to(update_profile)),
            ),
        )
        .await;

        let token = create_session_token(&user).unwrap();
        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({
                "name": "Dana Updated",
                "age": 41,
                "phone": "555-0199",
                "image": "https://example.com/dana.png"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Profile updated");
        assert_eq!(body["user"]["name"], "Dana Updated");
        assert_eq!(body["user"]["age"], 41);
        assert_eq!(body["user"]["image"], "https://example.com/dana.png");

        // The returned token carries the new cached profile fields,
        // while the old token still carries the stale ones
        let refreshed = decode_session_token(body["token"].as_str().unwrap()).unwrap();
        assert_eq!(refreshed.name, "Dana Updated");
        assert_eq!(refreshed.age, Some(41));
        let stale = decode_session_token(&token).unwrap();
        assert_eq!(stale.name, "Dana");

        let stored = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Dana Updated");
        assert_eq!(stored.phone.as_deref(), Some("555-0199"));
    }

    #[actix_web::test]
    async fn test_update_profile_rejects_short_name() {
        let (repo, user) = seeded_repo().await;
        let app = test::init_service(
            App::new().app_data(repo).service(
                web::scope("/api")
                    .wrap(SessionAuth)
                    .route("/profile", web::put().to(update_profile)),
            ),
        )
        .await;

        let token = create_session_token(&user).unwrap();
        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "name": "D" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_update_profile_requires_session() {
        let (repo, _) = seeded_repo().await;
        let app = test::init_service(
            App::new().app_data(repo).service(
                web::scope("/api")
                    .wrap(SessionAuth)
                    .route("/profile", web::put().to(update_profile)),
            ),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .set_json(serde_json::json!({ "name": "No Session" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
