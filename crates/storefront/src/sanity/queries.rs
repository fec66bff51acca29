//! GROQ query documents for the Sanity content backend.
//!
//! All image fields are projected to plain URLs here so the domain types in
//! [`super::types`] never see asset references.

/// Standard product projection shared by the catalog queries.
const PRODUCT_PROJECTION: &str = r#"{
  _id,
  name,
  "slug": slug.current,
  price,
  discount,
  stock,
  status,
  variant,
  "images": images[].asset->url,
  brand->{
    title
  }
}"#;

/// All products, newest first.
pub fn all_products() -> String {
    format!(r#"*[_type == "product"] | order(_createdAt desc){PRODUCT_PROJECTION}"#)
}

/// Newest products, capped (home page "new arrivals" rail).
pub fn new_arrivals(limit: usize) -> String {
    format!(r#"*[_type == "product"] | order(_createdAt desc)[0...{limit}]{PRODUCT_PROJECTION}"#)
}

/// A single product by slug, with long-form fields.
pub const PRODUCT_BY_SLUG: &str = r#"*[_type == "product" && slug.current == $slug][0]{
  _id,
  name,
  "slug": slug.current,
  price,
  discount,
  stock,
  status,
  variant,
  description,
  "images": images[].asset->url,
  brand->{
    title
  }
}"#;

/// Products in a category, newest first.
pub fn products_by_category() -> String {
    format!(r#"*[_type == "product" && variant == $slug] | order(_createdAt desc){PRODUCT_PROJECTION}"#)
}

/// Related products: same category, excluding the current product.
pub fn related_products(limit: usize) -> String {
    format!(
        r#"*[_type == "product" && variant == $variant && _id != $currentProductId] | order(_createdAt desc)[0...{limit}]{PRODUCT_PROJECTION}"#
    )
}

/// Products by explicit id list (wishlist resolution).
pub fn products_by_id_list() -> String {
    format!(r#"*[_type == "product" && _id in $ids]{PRODUCT_PROJECTION}"#)
}

/// Authoritative checkout records: id, name, price, and image URLs only.
pub const CHECKOUT_PRODUCTS: &str =
    r#"*[_type == "product" && _id in $ids]{ _id, name, price, "images": images[].asset->url }"#;

/// All brands, alphabetical.
pub const BRANDS: &str = r#"*[_type == "brand"] | order(title asc) {
  _id,
  title,
  "slug": slug.current,
  description,
  "image": image.asset->url
}"#;

/// All categories, oldest first (stable merchandising order).
pub const CATEGORIES: &str = r#"*[_type == "category"] | order(_createdAt asc) {
  _id,
  title,
  "slug": slug.current,
  description,
  range,
  featured,
  "image": image.asset->url
}"#;

/// A single category by slug.
pub const CATEGORY_BY_SLUG: &str = r#"*[_type == "category" && slug.current == $slug][0]{
  _id,
  title,
  "slug": slug.current,
  description,
  range,
  featured,
  "image": image.asset->url
}"#;

/// Orders for a customer, newest first, with product references dereferenced.
pub const ORDERS_FOR_USER: &str = r#"*[_type == "order" && clerkUserId == $userId] | order(orderDate desc) {
  _id,
  orderNumber,
  customerName,
  email,
  totalPrice,
  currency,
  status,
  orderDate,
  address,
  "products": products[] {
    quantity,
    "product": product->{
      _id,
      name,
      "slug": slug.current,
      "images": images[].asset->url,
      price
    }
  }
}"#;

/// Cached addresses for an email (webhook address dedup).
pub const ADDRESSES_BY_EMAIL: &str = r#"*[_type == "address" && email == $email]{
  _id,
  _type,
  name,
  email,
  address,
  city,
  state,
  zip,
  default,
  createdAt
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_interpolated() {
        assert!(new_arrivals(8).contains("[0...8]"));
        assert!(related_products(4).contains("[0...4]"));
    }

    #[test]
    fn test_projections_use_url_dereference() {
        for query in [
            all_products(),
            products_by_category(),
            products_by_id_list(),
        ] {
            assert!(query.contains("images[].asset->url"), "missing projection in {query}");
        }
        assert!(PRODUCT_BY_SLUG.contains("images[].asset->url"));
        assert!(CHECKOUT_PRODUCTS.contains("images[].asset->url"));
    }
}
