// Product endpoints
//
// Catalogue reads are public; create/update/delete and the featured toggle
// need the session token.

use serde_json::json;

use crate::error::Error;
use crate::models::ProductDraft;
use crate::request::ApiRequest;

/// Number of related products shown next to a product page.
pub const RELATED_LIMIT: u32 = 3;

/// List products matching the given filters.
///
/// `GET /api/products?{filters}` (public). Empty filter values are dropped.
pub fn list<'a>(filters: impl IntoIterator<Item = (&'a str, &'a str)>) -> ApiRequest {
    ApiRequest::get("products").public().filters(filters)
}

/// `GET /api/products/{product_id}` (public)
pub fn get(product_id: &str) -> ApiRequest {
    ApiRequest::get(format!("products/{product_id}")).public()
}

/// `GET /api/products/featured` (public)
pub fn featured() -> ApiRequest {
    ApiRequest::get("products/featured").public()
}

/// `GET /api/products/categories` (public)
pub fn categories() -> ApiRequest {
    ApiRequest::get("products/categories").public()
}

/// `GET /api/products/author/{author_id}?{filters}` (public)
pub fn by_author<'a>(
    author_id: &str,
    filters: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> ApiRequest {
    ApiRequest::get(format!("products/author/{author_id}"))
        .public()
        .filters(filters)
}

/// Candidates for "related products": same type, first category, capped at
/// [`RELATED_LIMIT`]. The caller filters out the product itself.
///
/// `GET /api/products?type=..&category=..&limit=3` (public)
pub fn related(product_type: &str, categories: &[String]) -> ApiRequest {
    let mut req = ApiRequest::get("products")
        .public()
        .query("type", product_type);
    if let Some(first) = categories.first() {
        req = req.query("category", first.as_str());
    }
    req.query("limit", RELATED_LIMIT.to_string())
}

/// `POST /api/products`
pub fn create(draft: &ProductDraft) -> Result<ApiRequest, Error> {
    ApiRequest::post("products").json(draft)
}

/// `PUT /api/products/{product_id}`
pub fn update(product_id: &str, draft: &ProductDraft) -> Result<ApiRequest, Error> {
    ApiRequest::put(format!("products/{product_id}")).json(draft)
}

/// `DELETE /api/products/{product_id}`
pub fn delete(product_id: &str) -> ApiRequest {
    ApiRequest::delete(format!("products/{product_id}"))
}

/// Flip the featured flag (admin only).
///
/// `PUT /api/products/{product_id}/featured` with an empty object body.
pub fn toggle_featured(product_id: &str) -> ApiRequest {
    ApiRequest::put(format!("products/{product_id}/featured")).with_body(json!({}))
}
