//! Catalog

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::fields::{self, category, paging, product};

/// Categories per page when the backend does not say.
pub const CATEGORY_PAGE_SIZE: u64 = 10;

/// Products per category page.
pub const PRODUCT_PAGE_SIZE: u64 = 12;

/// Number of pages needed for `records` at `page_size` per page. Never less
/// than one.
#[must_use]
pub fn total_pages(records: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }

    records.div_ceil(page_size).max(1)
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category image.
    pub image_url: Option<String>,
}

impl Category {
    /// Map one category record. Records without an id are skipped.
    #[must_use]
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = category::ID.string(record)?;

        Some(Self {
            name: category::NAME.string(record).unwrap_or_else(|| id.clone()),
            image_url: category::IMAGE.string(record),
            id,
        })
    }
}

/// One page of categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPage {
    /// Categories on this page.
    pub items: Vec<Category>,

    /// The page shown, starting at one.
    pub current_page: u64,

    /// Pages available.
    pub total_pages: u64,
}

impl Default for CategoryPage {
    fn default() -> Self {
        Self::empty(1)
    }
}

impl CategoryPage {
    /// An empty page, used before the first fetch and when a fetch fails.
    #[must_use]
    pub fn empty(current_page: u64) -> Self {
        Self {
            items: Vec::new(),
            current_page,
            total_pages: 1,
        }
    }

    /// Map a `cat_info` response for `requested` page.
    #[must_use]
    pub fn from_response(response: &Value, requested: u64) -> Self {
        let read = |keys: fields::FieldKeys| {
            keys.integer(response)
                .and_then(|value| u64::try_from(value).ok())
        };

        let items: Vec<_> = fields::records(response, "data")
            .iter()
            .filter_map(Category::from_record)
            .collect();

        let page_size = read(paging::PAGE_SIZE)
            .filter(|size| *size > 0)
            .unwrap_or(CATEGORY_PAGE_SIZE);

        let records = read(paging::TOTAL_RECORDS).unwrap_or(items.len() as u64);

        Self {
            current_page: read(paging::PAGE).unwrap_or(requested).max(1),
            total_pages: total_pages(records, page_size),
            items,
        }
    }

    /// Whether `page` is a page this listing can move to.
    #[must_use]
    pub fn accepts_page(&self, page: u64) -> bool {
        (1..=self.total_pages).contains(&page)
    }
}

/// A product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub id: String,

    /// Owning category.
    pub category_id: Option<String>,

    /// Display name.
    pub name: String,

    /// Long description.
    pub description: String,

    /// Listed price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Product image.
    pub image_url: Option<String>,
}

impl Product {
    /// Map one product record. Records without an id are skipped.
    #[must_use]
    pub fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            id: product::ID.string(record)?,
            category_id: product::CATEGORY_ID.string(record),
            name: product::NAME
                .string(record)
                .unwrap_or_else(|| crate::cart::DEFAULT_NAME.to_string()),
            description: product::DESCRIPTION.string(record).unwrap_or_default(),
            price: product::PRICE
                .decimal(record)
                .unwrap_or_default()
                .max(Decimal::ZERO),
            image_url: product::IMAGE.string(record),
        })
    }

    /// Map the `data` records of a product or search response. A response
    /// without a `data` array has no products.
    #[must_use]
    pub fn list_from_response(response: &Value) -> Vec<Self> {
        fields::records(response, "data")
            .iter()
            .filter_map(Self::from_record)
            .collect()
    }
}

/// Which product listing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductQuery {
    /// Products of one category.
    Category {
        /// Category id.
        id: String,
        /// Page, starting at one.
        page: u64,
    },

    /// Search results.
    Search(String),
}

impl ProductQuery {
    /// Pick the listing: a non-blank search query supersedes the category.
    #[must_use]
    pub fn resolve(category_id: &str, page: u64, search: &str) -> Self {
        let query = search.trim();

        if query.is_empty() {
            Self::Category {
                id: category_id.to_string(),
                page: page.max(1),
            }
        } else {
            Self::Search(query.to_string())
        }
    }
}

/// Why an admin catalog form cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogFormError {
    #[error("name is required")]
    BlankName,

    #[error("choose a category for the product")]
    MissingCategory,

    #[error("price cannot be negative")]
    NegativePrice,

    #[error("an image is required")]
    MissingImage,
}

/// An image uploaded with a category or product.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name sent with the upload.
    pub file_name: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Fields of a category create or edit. The backend always expects an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub image: ImageFile,
}

impl CategoryForm {
    /// Trimmed name, image required.
    ///
    /// # Errors
    ///
    /// Returns the first field that would be rejected.
    pub fn validate(&self) -> Result<(), CatalogFormError> {
        if self.name.trim().is_empty() {
            return Err(CatalogFormError::BlankName);
        }

        if self.image.bytes.is_empty() {
            return Err(CatalogFormError::MissingImage);
        }

        Ok(())
    }
}

/// Fields of a product create or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: ImageFile,
}

impl ProductForm {
    /// Category, name and image required; price at least zero.
    ///
    /// # Errors
    ///
    /// Returns the first field that would be rejected.
    pub fn validate(&self) -> Result<(), CatalogFormError> {
        if self.category_id.trim().is_empty() {
            return Err(CatalogFormError::MissingCategory);
        }

        if self.name.trim().is_empty() {
            return Err(CatalogFormError::BlankName);
        }

        if self.price < Decimal::ZERO {
            return Err(CatalogFormError::NegativePrice);
        }

        if self.image.bytes.is_empty() {
            return Err(CatalogFormError::MissingImage);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn default_page_is_the_first_of_one() {
        let page = CategoryPage::default();

        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.accepts_page(1));
        assert!(!page.accepts_page(0));
    }

    #[test]
    fn total_pages_rounds_up_with_a_floor_of_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 1);
    }

    #[test]
    fn category_page_from_response() {
        let response = json!({
            "page": 2,
            "page_size": 10,
            "total_records": 23,
            "data": [
                { "category_id": "CAT1", "category_name": "Lighting", "category_img": "l.png" },
                { "category_name": "No id" }
            ]
        });

        let page = CategoryPage::from_response(&response, 2);

        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        let names: Vec<_> = page.items.iter().map(|item| item.name.as_str()).collect();

        assert_eq!(names, ["Lighting"]);
        assert!(page.accepts_page(3));
        assert!(!page.accepts_page(4));
        assert!(!page.accepts_page(0));
    }

    #[test]
    fn category_page_without_data_is_empty() {
        let response = json!({ "message": "No categories found", "page": 5, "total_records": 0 });

        let page = CategoryPage::from_response(&response, 5);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn products_parse_string_prices() -> TestResult {
        let response = json!({
            "data": [{
                "product_id": "PRO1",
                "category_id": "CAT1",
                "product_name": "Bulb",
                "description": "9W LED",
                "price": "129.50",
                "product_img": "b.png"
            }]
        });

        let products = Product::list_from_response(&response);

        assert_eq!(products.len(), 1);

        let product = products.first().ok_or("no product")?;

        assert_eq!(product.price, Decimal::new(129_50, 2));
        assert_eq!(product.category_id.as_deref(), Some("CAT1"));

        Ok(())
    }

    #[test]
    fn products_response_without_data_is_empty() {
        assert!(Product::list_from_response(&json!({ "message": "No Data" })).is_empty());
    }

    #[test]
    fn search_supersedes_category() {
        assert_eq!(
            ProductQuery::resolve("CAT1", 2, "  bulb "),
            ProductQuery::Search("bulb".to_string())
        );
        assert_eq!(
            ProductQuery::resolve("CAT1", 0, "   "),
            ProductQuery::Category {
                id: "CAT1".to_string(),
                page: 1
            }
        );
    }

    fn image() -> ImageFile {
        ImageFile {
            file_name: "bulb.png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn product_form() -> ProductForm {
        ProductForm {
            category_id: "CAT1".to_string(),
            name: "Bulb".to_string(),
            description: "9W LED".to_string(),
            price: Decimal::new(129_50, 2),
            image: image(),
        }
    }

    #[test]
    fn product_form_rejects_first_bad_field() {
        assert_eq!(product_form().validate(), Ok(()));

        let free = ProductForm {
            price: Decimal::ZERO,
            ..product_form()
        };

        assert_eq!(free.validate(), Ok(()));

        let uncategorised = ProductForm {
            category_id: " ".to_string(),
            name: String::new(),
            ..product_form()
        };

        assert_eq!(uncategorised.validate(), Err(CatalogFormError::MissingCategory));

        let negative = ProductForm {
            price: Decimal::new(-1, 2),
            ..product_form()
        };

        assert_eq!(negative.validate(), Err(CatalogFormError::NegativePrice));
    }

    #[test]
    fn category_form_needs_name_and_image() {
        let form = CategoryForm {
            name: "  ".to_string(),
            image: image(),
        };

        assert_eq!(form.validate(), Err(CatalogFormError::BlankName));

        let imageless = CategoryForm {
            name: "Lighting".to_string(),
            image: ImageFile {
                bytes: Vec::new(),
                ..image()
            },
        };

        assert_eq!(imageless.validate(), Err(CatalogFormError::MissingImage));
    }

    #[test]
    fn image_debug_omits_contents() {
        assert_eq!(
            format!("{:?}", image()),
            r#"ImageFile { file_name: "bulb.png", len: 4 }"#
        );
    }
}
