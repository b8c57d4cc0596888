// Products slice: catalogue listing, the product being viewed, and the
// side lists (featured, author, related) shown around it.

use serde::Serialize;
use soulseer_api::models::{Category, Pagination, Product};

use super::{remove_by_id, replace_in_place};
use crate::action::{Phase, ProductAction, ProductListing};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductsState {
    pub products: Vec<Product>,
    pub pagination: Option<Pagination>,
    pub product: Option<Product>,
    pub featured: Vec<Product>,
    pub categories: Vec<Category>,
    pub author_products: Vec<Product>,
    pub related: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProductsState {
    /// Every list that may hold a copy of a product.
    fn lists_mut(&mut self) -> [&mut Vec<Product>; 4] {
        [
            &mut self.products,
            &mut self.featured,
            &mut self.author_products,
            &mut self.related,
        ]
    }

    fn replace_everywhere(&mut self, product: &Product) {
        for list in self.lists_mut() {
            replace_in_place(list, product.clone());
        }
        if self.product.as_ref().is_some_and(|p| p.id == product.id) {
            self.product = Some(product.clone());
        }
    }

    fn remove_everywhere(&mut self, id: &str) {
        for list in self.lists_mut() {
            remove_by_id(list, id);
        }
        if self.product.as_ref().is_some_and(|p| p.id == id) {
            self.product = None;
        }
    }
}

pub fn reduce(mut state: ProductsState, action: ProductAction) -> ProductsState {
    let outcome = match action {
        ProductAction::FetchProducts(phase) => phase.map(|ProductListing { page, append }| {
            if append {
                state.products.extend(page.data);
            } else {
                state.products = page.data;
            }
            state.pagination = page.pagination;
        }),
        ProductAction::FetchProduct(phase) => phase.map(|product| state.product = Some(product)),
        ProductAction::FetchFeatured(phase) => phase.map(|products| state.featured = products),
        ProductAction::FetchCategories(phase) => {
            phase.map(|categories| state.categories = categories)
        }
        ProductAction::FetchAuthorProducts(phase) => {
            phase.map(|page| state.author_products = page.data)
        }
        ProductAction::FetchRelated(phase) => phase.map(|products| state.related = products),
        ProductAction::Create(phase) => phase.map(|product| state.products.push(product)),
        ProductAction::Update(phase) => phase.map(|product| state.replace_everywhere(&product)),
        ProductAction::ToggleFeatured(phase) => phase.map(|product| {
            state.replace_everywhere(&product);
            if product.featured {
                if !state.featured.iter().any(|p| p.id == product.id) {
                    state.featured.push(product);
                }
            } else {
                remove_by_id(&mut state.featured, &product.id);
            }
        }),
        ProductAction::Delete(phase) => phase.map(|id| state.remove_everywhere(&id)),
    };

    match outcome {
        Phase::Request => ProductsState {
            loading: true,
            error: None,
            ..state
        },
        Phase::Success(()) => ProductsState {
            loading: false,
            error: None,
            ..state
        },
        Phase::Failure(error) => ProductsState {
            loading: false,
            error: Some(error),
            ..state
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use soulseer_api::models::ProductPage;

    use super::*;

    fn product(id: &str, title: &str) -> Product {
        Product {
            id: id.into(),
            title: title.into(),
            ..Product::default()
        }
    }

    fn page(products: Vec<Product>, pages: u64) -> ProductPage {
        ProductPage {
            data: products,
            pagination: Some(Pagination {
                page: Some(1),
                limit: Some(12),
                total: None,
                pages: Some(pages),
            }),
        }
    }

    #[test]
    fn fetch_replaces_then_appends() {
        let state = reduce(
            ProductsState::default(),
            ProductAction::FetchProducts(Phase::Request),
        );
        assert!(state.loading);

        let state = reduce(
            state,
            ProductAction::FetchProducts(Phase::Success(ProductListing {
                page: page(vec![product("p1", "a"), product("p2", "b")], 2),
                append: false,
            })),
        );
        let state = reduce(
            state,
            ProductAction::FetchProducts(Phase::Success(ProductListing {
                page: page(vec![product("p3", "c")], 2),
                append: true,
            })),
        );

        let ids: Vec<&str> = state.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(state.pagination.unwrap().pages, Some(2));
        assert!(!state.loading);
    }

    #[test]
    fn failure_keeps_lists() {
        let previous = ProductsState {
            products: vec![product("p1", "a")],
            ..ProductsState::default()
        };
        let state = reduce(
            previous.clone(),
            ProductAction::Create(Phase::Failure("Error creating product".into())),
        );
        assert_eq!(state.products, previous.products);
        assert_eq!(state.error.as_deref(), Some("Error creating product"));
        assert!(!state.loading);
    }

    #[test]
    fn update_replaces_in_every_list() {
        let previous = ProductsState {
            products: vec![product("p1", "old"), product("p2", "other")],
            related: vec![product("p1", "old")],
            product: Some(product("p1", "old")),
            ..ProductsState::default()
        };

        let state = reduce(
            previous,
            ProductAction::Update(Phase::Success(product("p1", "new"))),
        );

        assert_eq!(state.products[0].title, "new");
        assert_eq!(state.products[1].title, "other");
        assert_eq!(state.related[0].title, "new");
        assert_eq!(state.product.unwrap().title, "new");
    }

    #[test]
    fn delete_removes_everywhere() {
        let previous = ProductsState {
            products: vec![product("p1", "a"), product("p2", "b")],
            featured: vec![product("p1", "a")],
            product: Some(product("p1", "a")),
            ..ProductsState::default()
        };

        let state = reduce(previous, ProductAction::Delete(Phase::Success("p1".into())));

        assert_eq!(state.products, vec![product("p2", "b")]);
        assert!(state.featured.is_empty());
        assert_eq!(state.product, None);
    }

    #[test]
    fn toggle_featured_maintains_featured_list() {
        let mut featured = product("p1", "a");
        featured.featured = true;

        let state = reduce(
            ProductsState {
                products: vec![product("p1", "a")],
                ..ProductsState::default()
            },
            ProductAction::ToggleFeatured(Phase::Success(featured.clone())),
        );
        assert_eq!(state.featured, vec![featured.clone()]);
        assert!(state.products[0].featured);

        let mut unfeatured = featured;
        unfeatured.featured = false;
        let state = reduce(
            state,
            ProductAction::ToggleFeatured(Phase::Success(unfeatured)),
        );
        assert!(state.featured.is_empty());
        assert!(!state.products[0].featured);
    }

    #[test]
    fn author_listing_keeps_page_data() {
        let body: ProductPage = serde_json::from_value(json!({
            "data": [{ "_id": "p9", "title": "Course" }],
            "pagination": { "page": 1, "pages": 1 }
        }))
        .unwrap();

        let state = reduce(
            ProductsState::default(),
            ProductAction::FetchAuthorProducts(Phase::Success(body)),
        );
        assert_eq!(state.author_products.len(), 1);
        assert_eq!(state.author_products[0].id, "p9");
    }
}
