pub mod create;
pub mod delete;
pub mod download;
pub mod get;
pub mod list;
pub mod saved;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/download_shopping_cart",
            get(download::download_shopping_cart),
        )
        .route("/{id}", get(get::get_recipe).delete(delete::delete_recipe))
        .route(
            "/{id}/favorite",
            post(saved::add_favorite).delete(saved::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(saved::add_to_shopping_cart).delete(saved::remove_from_shopping_cart),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        delete::delete_recipe,
        saved::add_favorite,
        saved::remove_favorite,
        saved::add_to_shopping_cart,
        saved::remove_from_shopping_cart,
        download::download_shopping_cart,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        create::RecipeIngredientRequest,
        create::CreateRecipeResponse,
        list::ListRecipesResponse,
        list::RecipeSummary,
        list::PaginationMetadata,
        get::RecipeResponse,
        get::RecipeIngredientResponse,
    ))
)]
pub struct ApiDoc;
