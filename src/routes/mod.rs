mod files;
mod home;
mod jobs;
mod projects;
mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        upload::upload_files,
        files::list_files,
        files::get_file,
        files::get_file_content,
        files::delete_file,
        projects::create_project,
        projects::list_projects,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        jobs::submit_job,
        jobs::list_jobs,
        jobs::get_job,
    ),
    components(
        schemas(
            crate::models::FileRecord,
            crate::models::Project,
            crate::models::NewProject,
            crate::models::ProjectPatch,
            upload::UploadResponse,
            files::DeleteFileResponse,
            jobs::SubmitJobRequest,
            crate::services::jobs::Job,
            crate::services::jobs::JobStatus,
            crate::services::jobs::ProcessOutcome,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Files", description = "Upload, list and delete drawings"),
        (name = "Projects", description = "Project registry"),
        (name = "Jobs", description = "Processing jobs over uploaded files")
    ),
    info(
        title = "Drawing Vault API",
        version = "0.1.0",
        description = "Document upload, metadata and processing service for engineering drawings",
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let body_limit = state.config.max_upload_bytes;
    let uploads = ServeDir::new(&state.config.upload_dir);

    let app_routes = Router::new()
        .route("/", get(home::root))
        .route("/upload", post(upload::upload_files))
        .route("/files", get(files::list_files))
        .route("/files/{id}", get(files::get_file).delete(files::delete_file))
        .route("/files/{id}/content", get(files::get_file_content))
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/jobs", post(jobs::submit_job).get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
