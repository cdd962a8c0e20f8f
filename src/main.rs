mod db;
mod handlers;
mod middleware;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use db::task_repository::TaskRepository;
use db::user_repository::UserRepository;
use db::Database;
use dotenv::dotenv;
use middleware::rate_limit::RateLimitMiddleware;
use std::env;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::signup,
        handlers::auth::login,
        handlers::profile::update_profile,
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::health::HealthChecks,
            handlers::auth::SignupRequest,
            handlers::auth::LoginRequest,
            handlers::auth::SignupResponse,
            handlers::auth::AuthResponse,
            handlers::auth::UserResponse,
            handlers::profile::UpdateProfileRequest,
            handlers::profile::ProfileResponse,
            handlers::tasks::CreateTaskRequest,
            handlers::tasks::UpdateTaskRequest,
            models::task::Task,
            models::task::TaskStatus,
            models::user::Claims,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Authentication", description = "Signup and login"),
        (name = "Profile", description = "Profile management, requires a session token"),
        (name = "Tasks", description = "Per-user task CRUD, requires a session token")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from login or profile update"))
                        .build(),
                ),
            );
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .json()
        .init();

    let db_path = env::var("DB_PATH").unwrap_or_else(|_| "./data/taskflow.db".to_string());
    let database = Database::open(&db_path).expect("Failed to open database");
    info!(db_path = %db_path, "Database opened");

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("{}:{}", host, port);

    info!(bind_address = %bind_address, "Starting task tracking API server");
    info!("Available endpoints:");
    info!("   GET    /api/health       - Health check (public)");
    info!("   POST   /api/auth/signup  - Register new user (public)");
    info!("   POST   /api/auth/login   - Login user (public)");
    info!("   PUT    /api/profile      - Update profile (protected)");
    info!("   GET    /api/tasks        - List own tasks (protected)");
    info!("   POST   /api/tasks        - Create task (protected)");
    info!("   PUT    /api/tasks/{{id}}   - Update own task (protected)");
    info!("   DELETE /api/tasks/{{id}}   - Delete own task (protected)");
    info!(
        swagger_url = format!("http://{}/swagger-ui/", bind_address),
        "Swagger UI available"
    );

    HttpServer::new(move || {
        let user_repo = UserRepository::new(database.clone());
        let task_repo = TaskRepository::new(database.clone());

        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(user_repo))
            .app_data(web::Data::new(task_repo))
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Swagger UI
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Public routes
            .route("/api/health", web::get().to(handlers::health::health))
            // Credential routes with rate limiting (5 requests per minute per IP)
            .service(
                web::scope("/api/auth")
                    .wrap(RateLimitMiddleware::new(5))
                    .route("/signup", web::post().to(handlers::auth::signup))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            // Protected routes, session verified before any handler runs
            .service(
                web::scope("/api")
                    .wrap(middleware::auth::SessionAuth)
                    .route("/profile", web::put().to(handlers::profile::update_profile))
                    .route("/tasks", web::get().to(handlers::tasks::list_tasks))
                    .route("/tasks", web::post().to(handlers::tasks::create_task))
                    .route("/tasks/{id}", web::put().to(handlers::tasks::update_task))
                    .route(
                        "/tasks/{id}",
                        web::delete().to(handlers::tasks::delete_task),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
