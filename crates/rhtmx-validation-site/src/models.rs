// File: src/models.rs
// Purpose: Metadata for the Product / Software view models

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rhtmx_metadata::{
    ClassRule, FieldDescriptor, HeaderMatch, MetadataRegistry, Result, Rule, TypeMetadata, Value,
    Variant,
};

pub const PRODUCT_DETAILS: &str = "ProductDetails";
pub const PRODUCT: &str = "Product";
pub const SOFTWARE: &str = "Software";

/// Header carrying the client's product version
pub const VERSION_HEADER: &str = "version";

pub const PRODUCT_CLASS_MESSAGE: &str = "Country and Name fields don't have the right values";

static SHARED: OnceCell<Arc<MetadataRegistry>> = OnceCell::new();

/// Process-wide registry, built on first use and never rebuilt.
pub fn shared_registry() -> Result<Arc<MetadataRegistry>> {
    SHARED
        .get_or_try_init(|| build_registry().map(Arc::new))
        .cloned()
}

/// Register every view model used by the site. Bases come before derived types.
pub fn build_registry() -> Result<MetadataRegistry> {
    let mut registry = MetadataRegistry::new()
        .with(product_details())?
        .with(product())?
        .with(software()?)?;

    // Clients on version 2 or 2.x post software to the product endpoint too
    registry.add_variant(
        PRODUCT,
        Variant::new(VERSION_HEADER, HeaderMatch::Equals("2".into()), SOFTWARE),
    )?;
    registry.add_variant(
        PRODUCT,
        Variant::new(VERSION_HEADER, HeaderMatch::Prefix("2.".into()), SOFTWARE),
    )?;

    registry.verify()?;
    Ok(registry)
}

fn product_details() -> TypeMetadata {
    TypeMetadata::new(PRODUCT_DETAILS)
        .field(FieldDescriptor::text("Detail1").required())
        .field(FieldDescriptor::text("Detail2").required())
        .field(FieldDescriptor::text("Detail3").required())
}

fn product() -> TypeMetadata {
    TypeMetadata::new(PRODUCT)
        .field(FieldDescriptor::text("Name"))
        .field(FieldDescriptor::text("Contact").display("ContactUs").required())
        .field(FieldDescriptor::text("Category").required())
        .field(
            FieldDescriptor::text("CompanyName")
                .rule(Rule::required().with_message("CompanyName cannot be null")),
        )
        .field(FieldDescriptor::text("Country"))
        .field(FieldDescriptor::number("Price").rule(Rule::range(20.0, 100.0)))
        .field(FieldDescriptor::object("ProductDetails", PRODUCT_DETAILS).required())
        .class_rule(ClassRule::new(PRODUCT_CLASS_MESSAGE, country_and_name))
}

fn software() -> Result<TypeMetadata> {
    Ok(TypeMetadata::new(SOFTWARE)
        .extends(PRODUCT)
        .field(
            FieldDescriptor::text("Version")
                .from_header(VERSION_HEADER)
                .rule(Rule::pattern("Version", r"\d+(\.\d+)*")?),
        )
        .field(FieldDescriptor::date("DatePurchased"))
        .field(FieldDescriptor::number("Price").rule(Rule::range(100.0, 200.0)))
        .field(
            FieldDescriptor::text("Contact")
                .rule(Rule::max_length(10))
                .rule(Rule::min_length(7)),
        )
        .field(FieldDescriptor::object("ProductDetails", PRODUCT_DETAILS)))
}

fn country_and_name(product: &Value) -> bool {
    let country_ok = product.str_field("Country") == Some("USA");
    let name_ok = product
        .str_field("Name")
        .map_or(false, |name| !name.trim().is_empty());
    country_ok && name_ok
}
