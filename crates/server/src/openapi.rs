use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct MessageResponse { pub message: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub firstName: String,
    pub lastName: String,
    pub email: String,
    pub admin: Option<bool>,
}

#[derive(ToSchema)]
pub struct ErrorResponse { pub status_code: u16, pub message: String }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::root,
        crate::routes::api_root,
        crate::routes::account::login,
        crate::routes::account::register,
        crate::routes::account::delete_account,
    ),
    components(
        schemas(
            HealthResponse,
            MessageResponse,
            LoginRequest,
            RegisterRequest,
            ErrorResponse,
            crate::routes::account::LoginOutput,
            crate::routes::account::RegisterOutput,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "account")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_account_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/v1/login", "/api/v1/register", "/api/v1", "/"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
