//! Stream catalog
//!
//! The full Lightspeed eCom resource set as data-driven descriptors. Schemas
//! only declare the fields that need type coercion guarantees downstream;
//! anything the API adds beyond them passes through untouched.

use crate::schema::{
    any, array, boolean, date_time, integer, number, object, string, SchemaNode,
};
use crate::stream::StreamDescriptor;
use std::sync::LazyLock;

/// All known streams, parents before children
pub static CATALOG: LazyLock<Vec<StreamDescriptor>> = LazyLock::new(build_catalog);

/// Look up a stream by name
pub fn find(name: &str) -> Option<&'static StreamDescriptor> {
    CATALOG.iter().find(|s| s.name == name)
}

/// Streams without a parent, in catalog order
pub fn top_level() -> impl Iterator<Item = &'static StreamDescriptor> {
    CATALOG.iter().filter(|s| s.parent.is_none())
}

/// Child streams of the given parent, in catalog order
pub fn children_of(parent: &str) -> impl Iterator<Item = &'static StreamDescriptor> + '_ {
    CATALOG
        .iter()
        .filter(move |s| s.parent.as_deref() == Some(parent))
}

/// Linked sub-resource: `{"resource": {"id", "url", "link"}}`
fn resources() -> SchemaNode {
    object([(
        "resource",
        object([("id", integer()), ("url", string()), ("link", string())]),
    )])
}

fn tax_rates() -> SchemaNode {
    array(object([
        ("name", string()),
        ("rate", number()),
        ("amount", number()),
    ]))
}

fn country() -> SchemaNode {
    object([
        ("id", integer()),
        ("code", string()),
        ("code3", string()),
        ("title", string()),
    ])
}

fn option() -> SchemaNode {
    object([
        ("sortOrder", integer()),
        ("id", integer()),
        ("name", string()),
    ])
}

fn build_catalog() -> Vec<StreamDescriptor> {
    vec![
        shop(),
        orders(),
        order_lines(),
        order_metafields(),
        order_shipping_lines(),
        products(),
        variants(),
        products_images(),
        products_metafields(),
        categories(),
        categories_product(),
        suppliers(),
        customers(),
        returns(),
    ]
}

fn shop() -> StreamDescriptor {
    StreamDescriptor::new(
        "shop",
        "/shop.json",
        "$.shop",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("status", string()),
            ("isB2b", boolean()),
            ("isRetail", boolean()),
            ("subDomain", string()),
            ("mainDomain", string()),
            ("email", string()),
            ("phone", string()),
            ("fax", string()),
            ("street", string()),
            ("street2", string()),
            ("zipcode", string()),
            ("city", string()),
            ("region", string()),
            ("country", country()),
            ("vatNumber", string()),
            ("cocNumber", string()),
            ("industry", string()),
            (
                "currency",
                object([
                    ("shortcode", string()),
                    ("symbol", string()),
                    ("title", string()),
                    ("isDefault", boolean()),
                    ("currencyRate", string()),
                ]),
            ),
            ("company", resources()),
            ("limits", resources()),
            ("javascript", resources()),
            ("website", resources()),
            ("scripts", resources()),
            ("metafields", resources()),
        ]),
    )
}

fn orders() -> StreamDescriptor {
    StreamDescriptor::new(
        "orders",
        "/orders.json",
        "$.orders[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("number", string()),
            ("status", string()),
            ("customStatusId", integer()),
            ("channel", string()),
            ("remoteIp", string()),
            ("userAgent", string()),
            ("referralId", string()),
            ("priceCost", number()),
            ("priceExcl", number()),
            ("priceIncl", number()),
            ("weight", integer()),
            ("volume", integer()),
            ("colli", integer()),
            ("gender", string()),
            ("birthDate", date_time()),
            ("nationalId", string()),
            ("email", string()),
            ("firstname", string()),
            ("middlename", string()),
            ("lastname", string()),
            ("phone", string()),
            ("mobile", string()),
            ("isCompany", boolean()),
            ("companyName", string()),
            ("companyCoCNumber", string()),
            ("companyVatNumber", string()),
            ("addressBillingName", string()),
            ("addressBillingStreet", string()),
            ("addressBillingStreet2", string()),
            ("addressBillingNumber", string()),
            ("addressBillingExtension", string()),
            ("addressBillingZipcode", string()),
            ("addressBillingCity", string()),
            ("addressBillingRegion", string()),
            ("addressBillingCountry", country()),
            ("addressShippingCompany", string()),
            ("addressShippingName", string()),
            ("addressShippingStreet", string()),
            ("addressShippingStreet2", string()),
            ("addressShippingNumber", boolean()),
            ("addressShippingExtension", string()),
            ("addressShippingZipcode", string()),
            ("addressShippingCity", string()),
            ("addressShippingRegion", string()),
            ("addressShippingCountry", country()),
            ("paymentId", string()),
            ("paymentStatus", string()),
            ("paymentIsPost", boolean()),
            ("paymentIsInvoiceExternal", boolean()),
            ("paymentTaxRate", number()),
            ("paymentTaxRates", tax_rates()),
            ("paymentBasePriceExcl", number()),
            ("paymentBasePriceIncl", number()),
            ("paymentPriceExcl", number()),
            ("paymentPriceIncl", number()),
            ("paymentTitle", string()),
            ("paymentData", any()),
            ("shipmentId", string()),
            ("shipmentStatus", string()),
            ("shipmentIsCashOnDelivery", boolean()),
            ("shipmentIsPickup", boolean()),
            ("shipmentTaxRate", number()),
            ("shipmentTaxRates", tax_rates()),
            ("shipmentBasePriceExcl", number()),
            ("shipmentBasePriceIncl", number()),
            ("shipmentPriceExcl", number()),
            ("shipmentPriceIncl", number()),
            ("shipmentDiscountExcl", number()),
            ("shipmentDiscountIncl", number()),
            ("shipmentTitle", string()),
            ("shipmentData", any()),
            ("shippingDate", date_time()),
            ("taxRates", tax_rates()),
            ("deliveryDate", date_time()),
            ("isDiscounted", boolean()),
            ("discountType", string()),
            ("discountAmount", number()),
            ("discountPercentage", number()),
            ("discountCouponCode", string()),
            ("isNewCustomer", boolean()),
            ("comment", string()),
            ("memo", string()),
            ("doNotifyNew", boolean()),
            ("doNotifyReminder", boolean()),
            ("doNotifyCancelled", boolean()),
            (
                "language",
                object([
                    ("locale", string()),
                    ("id", integer()),
                    ("code", string()),
                    ("title", string()),
                ]),
            ),
            ("customer", resources()),
            ("invoices", resources()),
            ("shipments", resources()),
            ("products", resources()),
            ("metafields", resources()),
            ("quote", resources()),
            ("events", resources()),
        ]),
    )
    .incremental("updatedAt", "updated_at_min")
    .with_child_context("order_id", "id")
}

fn order_lines() -> StreamDescriptor {
    StreamDescriptor::new(
        "order_lines",
        "/orders/{order_id}/products.json",
        "$.orderProducts[*]",
        object([
            ("id", integer()),
            ("supplierTitle", string()),
            ("brandTitle", string()),
            ("productTitle", string()),
            ("variantTitle", string()),
            ("taxRate", number()),
            ("quantityOrdered", integer()),
            ("quantityInvoiced", integer()),
            ("quantityShipped", integer()),
            ("quantityRefunded", integer()),
            ("quantityReturned", integer()),
            ("articleCode", string()),
            ("ean", string()),
            ("sku", string()),
            ("weight", integer()),
            ("volume", integer()),
            ("colli", integer()),
            ("sizeX", integer()),
            ("sizeY", integer()),
            ("sizeZ", integer()),
            ("priceCost", number()),
            ("customExcl", number()),
            ("customIncl", number()),
            ("basePriceExcl", number()),
            ("basePriceIncl", number()),
            ("priceExcl", number()),
            ("priceIncl", number()),
            ("discountExcl", number()),
            ("discountIncl", number()),
            ("customFields", any()),
            ("order_id", integer()),
            ("product", resources()),
            ("variant", resources()),
        ]),
    )
    .with_parent("orders")
}

fn order_metafields() -> StreamDescriptor {
    StreamDescriptor::new(
        "order_metafields",
        "/orders/{order_id}/metafields.json",
        "$.orderMetafields[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("key", string()),
            ("value", string()),
            ("order_id", integer()),
        ]),
    )
    .with_parent("orders")
}

fn order_shipping_lines() -> StreamDescriptor {
    StreamDescriptor::new(
        "order_shipping_lines",
        "/shipments.json",
        "$.shipments[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("number", string()),
            ("status", string()),
            ("trackingCode", string()),
            ("doNotifyShipped", boolean()),
            ("doNotifyReadyForPickup", boolean()),
            ("doNotifyTrackingCode", boolean()),
            ("totalWeight", integer()),
            ("totalSizeX", integer()),
            ("totalSizeY", integer()),
            ("totalSizeZ", integer()),
            ("order_id", integer()),
            ("customer", resources()),
            ("order", resources()),
            ("products", resources()),
            ("metafields", resources()),
            ("events", resources()),
        ]),
    )
    .with_parent("orders")
    .with_context_param("order", "order_id")
}

fn products() -> StreamDescriptor {
    StreamDescriptor::new(
        "products",
        "/products.json",
        "$.products[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("isVisible", boolean()),
            ("visibility", string()),
            ("data01", string()),
            ("data02", string()),
            ("data03", string()),
            ("url", string()),
            ("title", string()),
            ("fulltitle", string()),
            ("description", string()),
            ("content", string()),
            ("set", any()),
            ("brand", resources()),
            ("categories", resources()),
            ("deliverydate", resources()),
            ("image", any()),
            ("images", any()),
            ("relations", resources()),
            ("metafields", resources()),
            ("reviews", resources()),
            ("type", resources()),
            ("attributes", resources()),
            ("supplier", resources()),
            ("tags", resources()),
            ("variants", resources()),
            ("movements", resources()),
        ]),
    )
    .incremental("updatedAt", "updated_at_min")
    .with_child_context("product_id", "id")
}

fn variants() -> StreamDescriptor {
    StreamDescriptor::new(
        "variants",
        "/variants.json",
        "$.variants[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("isDefault", boolean()),
            ("sortOrder", integer()),
            ("articleCode", string()),
            ("ean", string()),
            ("sku", string()),
            ("hs", string()),
            ("unitPrice", number()),
            ("unitUnit", string()),
            ("priceExcl", number()),
            ("priceIncl", number()),
            ("priceCost", number()),
            ("oldPriceExcl", number()),
            ("oldPriceIncl", number()),
            ("stockTracking", string()),
            ("stockLevel", number()),
            ("stockAlert", number()),
            ("stockMinimum", number()),
            ("stockSold", number()),
            ("stockBuyMininum", number()),
            ("stockBuyMaximum", number()),
            ("weight", number()),
            ("weightValue", string()),
            ("weightUnit", string()),
            ("volume", number()),
            ("volumeValue", number()),
            ("volumeUnit", string()),
            ("colli", number()),
            ("sizeX", number()),
            ("sizeY", number()),
            ("sizeZ", number()),
            ("sizeXValue", string()),
            ("sizeYValue", string()),
            ("sizeZValue", string()),
            ("sizeUnit", string()),
            ("matrix", string()),
            ("title", string()),
            ("taxType", string()),
            ("image", any()),
            ("additionalcost", boolean()),
            (
                "options",
                array(object([
                    ("values", array(option())),
                    ("sortOrder", integer()),
                    ("id", integer()),
                    ("value", option()),
                    ("createdAt", date_time()),
                    ("updatedAt", date_time()),
                    ("name", string()),
                ])),
            ),
            ("product_id", integer()),
            ("tax", resources()),
            ("product", resources()),
        ]),
    )
    .with_parent("products")
    .with_context_param("product", "product_id")
}

fn products_images() -> StreamDescriptor {
    StreamDescriptor::new(
        "products_images",
        "/products/{product_id}/images.json",
        "$.productImages[*]",
        object([
            ("id", integer()),
            ("sortOrder", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("extension", string()),
            ("size", integer()),
            ("title", string()),
            ("thumb", string()),
            ("src", string()),
            ("product_id", integer()),
        ]),
    )
    .with_parent("products")
}

fn products_metafields() -> StreamDescriptor {
    StreamDescriptor::new(
        "products_metafields",
        "/products/{product_id}/metafields.json",
        "$.productMetafields[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("key", string()),
            ("value", string()),
            ("product_id", integer()),
        ]),
    )
    .with_parent("products")
}

fn categories() -> StreamDescriptor {
    StreamDescriptor::new(
        "categories",
        "/categories.json",
        "$.categories[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("isVisible", boolean()),
            ("depth", integer()),
            ("path", array(string())),
            ("type", string()),
            ("sortOrder", integer()),
            ("sorting", string()),
            ("url", string()),
            ("title", string()),
            ("fulltitle", string()),
            ("description", string()),
            ("content", string()),
            ("image", any()),
            ("parent", resources()),
            ("children", resources()),
            ("products", resources()),
        ]),
    )
    .incremental("updatedAt", "updated_at_min")
}

fn categories_product() -> StreamDescriptor {
    StreamDescriptor::new(
        "categories_product",
        "/categories/products.json",
        "$.categoriesProducts[*]",
        object([
            ("id", integer()),
            ("sortOrder", integer()),
            ("product_id", integer()),
            ("category", resources()),
            ("product", resources()),
        ]),
    )
    .with_parent("products")
    .with_context_param("product", "product_id")
}

fn suppliers() -> StreamDescriptor {
    StreamDescriptor::new(
        "suppliers",
        "/suppliers.json",
        "$.suppliers[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("title", string()),
            ("attention_of", string()),
            ("street", string()),
            ("street2", string()),
            ("number", string()),
            ("extension", string()),
            ("zip_code", string()),
            ("city", string()),
            ("region", string()),
            ("country_id", country()),
        ]),
    )
    .incremental("updatedAt", "updated_at_min")
}

fn customers() -> StreamDescriptor {
    StreamDescriptor::new(
        "customers",
        "/customers.json",
        "$.customers[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("lastOnlineAt", date_time()),
            ("isConfirmed", boolean()),
            ("remoteIp", string()),
            ("userAgent", string()),
            ("referralId", string()),
            ("gender", string()),
            ("birthDate", string()),
            ("nationalId", string()),
            ("email", string()),
            ("firstname", string()),
            ("middlename", string()),
            ("lastname", string()),
            ("phone", string()),
            ("mobile", string()),
            ("isCompany", boolean()),
            ("companyName", string()),
            ("companyCoCNumber", string()),
            ("companyVatNumber", string()),
            ("addressBillingName", string()),
            ("addressBillingStreet", string()),
            ("addressBillingStreet2", string()),
            ("addressBillingNumber", string()),
            ("addressBillingExtension", string()),
            ("addressBillingZipcode", string()),
            ("addressBillingCity", boolean()),
            ("addressBillingRegion", string()),
            ("addressBillingCountry", country()),
            ("addressShippingCompany", string()),
            ("addressShippingName", string()),
            ("addressShippingStreet", string()),
            ("addressShippingStreet2", string()),
            ("addressShippingNumber", string()),
            ("addressShippingExtension", string()),
            ("addressShippingZipcode", string()),
            ("addressShippingCity", string()),
            ("addressShippingRegion", string()),
            ("addressShippingCountry", country()),
            ("memo", string()),
            ("doNotifyRegistered", boolean()),
            ("doNotifyConfirmed", boolean()),
            ("doNotifyPassword", boolean()),
            ("groups", resources()),
            ("invoices", resources()),
            ("orders", resources()),
            ("reviews", resources()),
            ("shipments", resources()),
            ("tickets", resources()),
            ("metafields", resources()),
            ("login", resources()),
        ]),
    )
    .incremental("updatedAt", "updated_at_min")
}

fn returns() -> StreamDescriptor {
    StreamDescriptor::new(
        "returns",
        "/returns.json",
        "$.returns[*]",
        object([
            ("id", integer()),
            ("createdAt", date_time()),
            ("updatedAt", date_time()),
            ("customerId", integer()),
            ("orderId", integer()),
            ("status", string()),
            ("numProducts", integer()),
            ("priceExcl", number()),
            ("priceIncl", number()),
            ("isStockAdjusted", boolean()),
            ("returnReason", string()),
            ("returnAction", string()),
            ("customerComment", string()),
            ("staffNote", string()),
            ("mailMessage", string()),
            ("notifyStatus", boolean()),
            (
                "orderProducts",
                array(object([("id", integer()), ("quantity", integer())])),
            ),
        ]),
    )
    .incremental("updatedAt", "updated_at_min")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = CATALOG.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_every_parent_exists_and_precedes_its_children() {
        for (index, stream) in CATALOG.iter().enumerate() {
            if let Some(parent) = &stream.parent {
                let position = CATALOG
                    .iter()
                    .position(|s| &s.name == parent)
                    .unwrap_or_else(|| panic!("unknown parent {parent}"));
                assert!(position < index, "{} listed before its parent", stream.name);
            }
        }
    }

    #[test]
    fn test_parents_produce_child_context() {
        for stream in CATALOG.iter() {
            if children_of(&stream.name).next().is_some() {
                assert!(
                    stream.child_context.is_some(),
                    "{} has children but no child context",
                    stream.name
                );
            }
        }
    }

    #[test]
    fn test_incremental_streams() {
        let incremental: Vec<&str> = CATALOG
            .iter()
            .filter(|s| s.is_incremental())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            incremental,
            vec![
                "orders",
                "products",
                "categories",
                "suppliers",
                "customers",
                "returns"
            ]
        );
    }

    #[test]
    fn test_lookup() {
        assert!(find("orders").is_some());
        assert!(find("invoices").is_none());
        assert_eq!(top_level().count(), 7);
        assert_eq!(children_of("orders").count(), 3);
        assert_eq!(children_of("products").count(), 4);
    }
}
