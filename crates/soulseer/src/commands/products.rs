//! Product command handlers.

use tabled::Tabled;
use tracing::debug;

use soulseer_core::Marketplace;
use soulseer_core::models::{Category, Product, ProductDraft, ProductPage};

use crate::cli::{GlobalOpts, ProductFields, ProductFilters, ProductsArgs, ProductsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    product_type: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Featured")]
    featured: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            product_type: output::opt(p.product_type.as_deref()),
            price: output::money(p.price),
            featured: output::yes_no(p.featured),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Products")]
    count: String,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            name: c.name.clone(),
            count: output::opt(c.count),
        }
    }
}

fn detail(p: &Product) -> String {
    [
        format!("ID:          {}", p.id),
        format!("Title:       {}", p.title),
        format!("Type:        {}", output::opt(p.product_type.as_deref())),
        format!("Price:       {}", output::money(p.price)),
        format!("Categories:  {}", p.categories.join(", ")),
        format!("Featured:    {}", output::yes_no(p.featured)),
        format!("Description: {}", output::opt(p.description.as_deref())),
    ]
    .join("\n")
}

fn print_products(products: &[Product], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        products,
        |p| ProductRow::from(p),
        |p| p.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_product(product: &Product, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, product, detail, |p| p.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Argument translation ────────────────────────────────────────────

fn filter_values(filters: &ProductFilters) -> [(&'static str, Option<String>); 6] {
    [
        ("type", filters.product_type.clone()),
        ("category", filters.category.clone()),
        ("search", filters.search.clone()),
        ("sort", filters.sort.clone()),
        ("page", filters.page.map(|p| p.to_string())),
        ("limit", filters.limit.map(|l| l.to_string())),
    ]
}

/// Next page to request, if the listing reports more.
fn next_page(page: &ProductPage) -> Option<u64> {
    let pagination = page.pagination.as_ref()?;
    let current = pagination.page?;
    let pages = pagination.pages?;
    (current < pages).then_some(current + 1)
}

fn draft_from(fields: ProductFields) -> ProductDraft {
    ProductDraft {
        title: fields.title,
        description: fields.description,
        price: fields.price,
        product_type: fields.product_type,
        categories: fields.categories,
        image: fields.image,
        ..ProductDraft::default()
    }
}

fn read_draft(
    from_file: Option<&std::path::Path>,
    fields: ProductFields,
) -> Result<ProductDraft, CliError> {
    match from_file {
        Some(path) => Ok(serde_json::from_value(util::read_json_file(path)?)?),
        None => Ok(draft_from(fields)),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    market: &Marketplace,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProductsCommand::List { filters, all } => {
            let mut values = filter_values(&filters);
            let mut page = market
                .fetch_products(&util::filter_pairs(&values), true)
                .await?;

            if all {
                while let Some(next) = next_page(&page) {
                    debug!(page = next, "fetching next product page");
                    values[4].1 = Some(next.to_string());
                    page = market
                        .fetch_products(&util::filter_pairs(&values), false)
                        .await?;
                }
            }

            // The store holds the accumulated listing across pages.
            let state = market.state();
            print_products(&state.products.products, global)
        }

        ProductsCommand::Get { id } => {
            let product = market.fetch_product(&id).await?;
            print_product(&product, global)
        }

        ProductsCommand::Featured => {
            let products = market.fetch_featured_products().await?;
            print_products(&products, global)
        }

        ProductsCommand::Categories => {
            let categories = market.fetch_categories().await?;
            let out = output::render_list(
                &global.output,
                &categories,
                |c| CategoryRow::from(c),
                |c| c.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::Author { author, filters } => {
            let values = filter_values(&filters);
            let page = market
                .fetch_author_products(&author, &util::filter_pairs(&values))
                .await?;
            print_products(&page.data, global)
        }

        ProductsCommand::Related { id } => {
            let product = market.fetch_product(&id).await?;
            let product_type =
                product
                    .product_type
                    .as_deref()
                    .ok_or_else(|| CliError::Validation {
                        field: "type".into(),
                        reason: format!("product '{id}' has no type to match on"),
                    })?;
            let related = market
                .fetch_related_products(&id, product_type, &product.categories)
                .await?;
            print_products(&related, global)
        }

        ProductsCommand::Create { from_file, fields } => {
            let draft = read_draft(from_file.as_deref(), fields)?;
            let product = market.create_product(&draft).await?;
            output::success(
                &format!("Product created: {}", product.id),
                &global.color,
                global.quiet,
            );
            print_product(&product, global)
        }

        ProductsCommand::Update {
            id,
            from_file,
            fields,
        } => {
            let draft = read_draft(from_file.as_deref(), fields)?;
            let product = market.update_product(&id, &draft).await?;
            output::success("Product updated", &global.color, global.quiet);
            print_product(&product, global)
        }

        ProductsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete product {id}?"), global.yes)? {
                return Ok(());
            }
            market.delete_product(&id).await?;
            output::success("Product deleted", &global.color, global.quiet);
            Ok(())
        }

        ProductsCommand::Feature { id } => {
            let product = market.toggle_product_featured(&id).await?;
            let state = if product.featured {
                "featured"
            } else {
                "no longer featured"
            };
            output::success(
                &format!("Product {} is {state}", product.id),
                &global.color,
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use soulseer_core::models::Pagination;

    use super::*;

    fn page(current: Option<u64>, pages: Option<u64>) -> ProductPage {
        ProductPage {
            data: Vec::new(),
            pagination: Some(Pagination {
                page: current,
                pages,
                ..Pagination::default()
            }),
        }
    }

    #[test]
    fn next_page_stops_at_last() {
        assert_eq!(next_page(&page(Some(1), Some(3))), Some(2));
        assert_eq!(next_page(&page(Some(3), Some(3))), None);
        assert_eq!(next_page(&page(None, Some(3))), None);
        assert_eq!(next_page(&ProductPage::default()), None);
    }

    #[test]
    fn fields_become_draft() {
        let draft = draft_from(ProductFields {
            title: Some("Tarot deep dive".into()),
            price: Some(25.0),
            categories: vec!["tarot".into()],
            ..ProductFields::default()
        });
        assert_eq!(draft.title.as_deref(), Some("Tarot deep dive"));
        assert_eq!(draft.categories, vec!["tarot".to_owned()]);
        assert!(draft.description.is_none());
    }
}
