//! OpenAPI document served at `/openapi.json`

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::routes::{self, HealthResponse};
use crate::translate::{TranslationRequest, TranslationResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LINKBRICKS HORIZON-AI PDF TRANSLATOR API ENGINE",
        version = "100.100.100",
        description = "## PDF TRANSLATOR FROM ORIGIAL PDF URL",
        contact(
            name = "Linkbricks Horizon-AI",
            url = "https://www.horizonai.ai",
            email = "contact@horizonai.ai"
        ),
        license(name = "GNU GPL 3.0", url = "https://www.gnu.org/licenses/gpl-3.0.html")
    ),
    paths(handlers::translate_pdf, handlers::download_file, routes::health_check),
    components(schemas(TranslationRequest, TranslationResponse, ErrorResponse, HealthResponse)),
    tags(
        (name = "translate", description = "PDF translation and download"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;
