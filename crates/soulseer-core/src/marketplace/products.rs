// Product action creators. Catalogue reads are public; writes need a session.

use soulseer_api::models::{Category, Product, ProductDraft, ProductPage};
use soulseer_api::products;

use super::Marketplace;
use crate::action::{ProductAction, ProductListing};
use crate::dispatch::{Envelope, Operation};
use crate::error::CoreError;

const FETCH_PRODUCTS: Operation<ProductListing> = Operation {
    wrap: |phase| ProductAction::FetchProducts(phase).into(),
    fallback: "Error fetching products",
};

const FETCH_PRODUCT: Operation<Product> = Operation {
    wrap: |phase| ProductAction::FetchProduct(phase).into(),
    fallback: "Error fetching product",
};

const FETCH_FEATURED: Operation<Vec<Product>> = Operation {
    wrap: |phase| ProductAction::FetchFeatured(phase).into(),
    fallback: "Error fetching featured products",
};

const FETCH_CATEGORIES: Operation<Vec<Category>> = Operation {
    wrap: |phase| ProductAction::FetchCategories(phase).into(),
    fallback: "Error fetching categories",
};

const FETCH_AUTHOR_PRODUCTS: Operation<ProductPage> = Operation {
    wrap: |phase| ProductAction::FetchAuthorProducts(phase).into(),
    fallback: "Error fetching author products",
};

const FETCH_RELATED: Operation<Vec<Product>> = Operation {
    wrap: |phase| ProductAction::FetchRelated(phase).into(),
    fallback: "Error fetching related products",
};

const CREATE_PRODUCT: Operation<Product> = Operation {
    wrap: |phase| ProductAction::Create(phase).into(),
    fallback: "Error creating product",
};

const UPDATE_PRODUCT: Operation<Product> = Operation {
    wrap: |phase| ProductAction::Update(phase).into(),
    fallback: "Error updating product",
};

const DELETE_PRODUCT: Operation<String> = Operation {
    wrap: |phase| ProductAction::Delete(phase).into(),
    fallback: "Error deleting product",
};

const TOGGLE_FEATURED: Operation<Product> = Operation {
    wrap: |phase| ProductAction::ToggleFeatured(phase).into(),
    fallback: "Error toggling featured status",
};

impl Marketplace {
    /// List products matching `filters` (empty values are dropped).
    ///
    /// With `reset` the listing in state is replaced and REQUEST is
    /// dispatched; without it the page is appended (pagination) and the
    /// listing does not flip to loading.
    pub async fn fetch_products(
        &self,
        filters: &[(&str, &str)],
        reset: bool,
    ) -> Result<ProductPage, CoreError> {
        let d = self.dispatcher();
        let request = products::list(filters.iter().copied());

        if reset {
            d.announce(&FETCH_PRODUCTS);
        }
        let page: ProductPage = d.call(&FETCH_PRODUCTS, &request, Envelope::Body).await?;

        d.complete(
            &FETCH_PRODUCTS,
            ProductListing {
                page: page.clone(),
                append: !reset,
            },
        );
        Ok(page)
    }

    pub async fn fetch_product(&self, product_id: &str) -> Result<Product, CoreError> {
        self.dispatcher()
            .run(&FETCH_PRODUCT, &products::get(product_id), Envelope::Data)
            .await
    }

    pub async fn fetch_featured_products(&self) -> Result<Vec<Product>, CoreError> {
        self.dispatcher()
            .run(&FETCH_FEATURED, &products::featured(), Envelope::Data)
            .await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, CoreError> {
        self.dispatcher()
            .run(&FETCH_CATEGORIES, &products::categories(), Envelope::Data)
            .await
    }

    /// A seller's catalogue, with pagination.
    pub async fn fetch_author_products(
        &self,
        author_id: &str,
        filters: &[(&str, &str)],
    ) -> Result<ProductPage, CoreError> {
        self.dispatcher()
            .run(
                &FETCH_AUTHOR_PRODUCTS,
                &products::by_author(author_id, filters.iter().copied()),
                Envelope::Body,
            )
            .await
    }

    /// Products of the same type and first category, excluding `product_id`.
    pub async fn fetch_related_products(
        &self,
        product_id: &str,
        product_type: &str,
        categories: &[String],
    ) -> Result<Vec<Product>, CoreError> {
        let d = self.dispatcher();
        let page: ProductPage = d
            .execute(
                &FETCH_RELATED,
                &products::related(product_type, categories),
                Envelope::Body,
            )
            .await?;

        let related: Vec<Product> = page
            .data
            .into_iter()
            .filter(|p| p.id != product_id)
            .collect();
        d.complete(&FETCH_RELATED, related.clone());
        Ok(related)
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CoreError> {
        let request = products::create(draft)
            .map_err(|e| self.dispatcher().fail(&CREATE_PRODUCT, CoreError::from(e)))?;
        self.dispatcher()
            .run(&CREATE_PRODUCT, &request, Envelope::Data)
            .await
    }

    pub async fn update_product(
        &self,
        product_id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, CoreError> {
        let request = products::update(product_id, draft)
            .map_err(|e| self.dispatcher().fail(&UPDATE_PRODUCT, CoreError::from(e)))?;
        self.dispatcher()
            .run(&UPDATE_PRODUCT, &request, Envelope::Data)
            .await
    }

    /// Delete a product; it is removed from every list in state.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), CoreError> {
        let d = self.dispatcher();
        d.execute_empty(&DELETE_PRODUCT, &products::delete(product_id))
            .await?;
        d.complete(&DELETE_PRODUCT, product_id.to_owned());
        Ok(())
    }

    /// Flip the featured flag (admin only).
    pub async fn toggle_product_featured(&self, product_id: &str) -> Result<Product, CoreError> {
        self.dispatcher()
            .run(
                &TOGGLE_FEATURED,
                &products::toggle_featured(product_id),
                Envelope::Data,
            )
            .await
    }
}
