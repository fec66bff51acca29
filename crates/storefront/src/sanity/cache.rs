//! Cache types for content backend responses.

use crate::sanity::types::{Brand, Category, Product};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Brands(Vec<Brand>),
    Categories(Vec<Category>),
    Category(Box<Category>),
}
