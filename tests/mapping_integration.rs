//! Full-pipeline tests over a realistic product/user domain: catalog in,
//! compiled mapping set, values pushed through the dispatcher.

use shapemap::catalog::{DeclaredCatalog, MarkerUse, TypeDecl};
use shapemap::markers::{MAP_FROM, MarkerCatalog};
use shapemap::runtime::{HookRegistry, Mapper, MappingSet};
use shapemap::shape::{PropertyDescriptor, TypeExpr, TypeShape};
use shapemap::value::{Record, Value};

const PRODUCT_CATALOG: &str = include_str!("../testdata/catalog.json");

// ------------------------------ Product side ------------------------------ //

fn product_catalog() -> DeclaredCatalog {
    DeclaredCatalog::from_json_str(PRODUCT_CATALOG).unwrap()
}

fn product_hooks() -> HookRegistry {
    let mut hooks = HookRegistry::new();
    hooks
        .register("ProductReadDto", |_, source| {
            let name = source.get("name").and_then(Value::as_str).unwrap_or_default();
            let sku = source.get("sku").and_then(Value::as_str).unwrap_or_default();
            let price = source.get("price").and_then(Value::as_f64).unwrap_or(0.0);
            let is_active = source.get("is_active").and_then(Value::as_bool).unwrap_or(false);
            let stock = source.get("stock_quantity").and_then(Value::as_i64).unwrap_or(0);
            let ratings: Vec<f64> = source
                .get("reviews")
                .and_then(Value::as_list)
                .unwrap_or(&[])
                .iter()
                .filter_map(|r| {
                    r.as_record().and_then(|rec| rec.get("rating")).and_then(Value::as_f64)
                })
                .collect();
            let average = if ratings.is_empty() {
                0.0
            } else {
                ratings.iter().sum::<f64>() / ratings.len() as f64
            };
            Record::new("ProductUnmappedProperties")
                .with("display_name", format!("{name} ({sku})"))
                .with("is_available", is_active && stock > 0)
                .with("formatted_price", format!("${price:.2}"))
                .with("review_count", ratings.len() as i64)
                .with("average_rating", average)
        })
        .unwrap();
    hooks
        .register("ReviewDto", |_, source| {
            let rating = source.get("rating").and_then(Value::as_i64).unwrap_or(0);
            Record::new("ReviewUnmappedProperties")
                .with("formatted_rating", format!("{rating}/5 stars"))
        })
        .unwrap();
    hooks
        .register("ProductCreateDto", |_, _| {
            Record::new("ProductUnmappedProperties")
                .with("id", 0i64)
                .with("internal_notes", "")
                .with("reviews", Vec::<Value>::new())
        })
        .unwrap();
    hooks
}

fn product_set() -> MappingSet {
    MappingSet::compile(&product_catalog(), MarkerCatalog::standard(), product_hooks()).unwrap()
}

fn category() -> Record {
    Record::new("Category")
        .with("id", 1i64)
        .with("name", "Electronics")
        .with("description", "Electronic devices")
}

fn review(id: i64, comment: &str, rating: i64) -> Value {
    Value::from(Record::new("Review").with("id", id).with("comment", comment).with("rating", rating))
}

fn laptop(reviews: Vec<Value>, stock_quantity: i64) -> Value {
    Value::from(
        Record::new("Product")
            .with("id", 100i64)
            .with("name", "Laptop")
            .with("description", "High performance laptop")
            .with("price", 999.99f64)
            .with("stock_quantity", stock_quantity)
            .with("sku", "LAP-001")
            .with("is_active", true)
            .with("internal_notes", "Premium product")
            .with("category", category())
            .with("reviews", reviews),
    )
}

#[test]
fn product_read_dto_maps_matching_and_computed_properties() {
    let set = product_set();
    let mapper = Mapper::new(&set);
    let product = laptop(vec![review(1, "Great!", 5), review(2, "Good", 4)], 10);

    let dto = mapper.convert(&product, &TypeExpr::named("ProductReadDto")).unwrap();
    let dto = dto.as_record().unwrap();
    assert_eq!(dto.shape(), "ProductReadDto");

    // Matching properties are copied unchanged.
    assert_eq!(dto.get("id"), Some(&Value::Int(100)));
    assert_eq!(dto.get("name"), Some(&Value::Str("Laptop".into())));
    assert_eq!(dto.get("price"), Some(&Value::Float(999.99)));
    assert_eq!(dto.get("sku"), Some(&Value::Str("LAP-001".into())));
    assert_eq!(dto.get("is_active"), Some(&Value::Bool(true)));

    // The entity-only property never reaches the DTO.
    assert!(dto.get("internal_notes").is_none());

    // Computed (unmapped) properties come from the factory hook.
    assert_eq!(dto.get("display_name"), Some(&Value::Str("Laptop (LAP-001)".into())));
    assert_eq!(dto.get("is_available"), Some(&Value::Bool(true)));
    assert_eq!(dto.get("formatted_price"), Some(&Value::Str("$999.99".into())));
    assert_eq!(dto.get("review_count"), Some(&Value::Int(2)));
    assert_eq!(dto.get("average_rating"), Some(&Value::Float(4.5)));
}

#[test]
fn nested_object_and_collection_are_mapped_transitively() {
    let set = product_set();
    let mapper = Mapper::new(&set);
    let product = laptop(vec![review(1, "Great!", 5), review(2, "Good", 4)], 10);

    let dto = mapper.convert(&product, &TypeExpr::named("ProductReadDto")).unwrap();
    let dto = dto.as_record().unwrap();

    // `category: Category` vs `category: CategoryDto` differs textually, so
    // the value re-enters the dispatcher.
    let category = dto.get("category").unwrap().as_record().unwrap();
    assert_eq!(category.shape(), "CategoryDto");
    assert_eq!(category.get("name"), Some(&Value::Str("Electronics".into())));

    let reviews = dto.get("reviews").unwrap().as_list().unwrap();
    assert_eq!(reviews.len(), 2);
    let first = reviews[0].as_record().unwrap();
    assert_eq!(first.shape(), "ReviewDto");
    assert_eq!(first.get("comment"), Some(&Value::Str("Great!".into())));
    assert_eq!(first.get("formatted_rating"), Some(&Value::Str("5/5 stars".into())));
    let second = reviews[1].as_record().unwrap();
    assert_eq!(second.get("formatted_rating"), Some(&Value::Str("4/5 stars".into())));
}

#[test]
fn zero_reviews_yield_zero_count_and_zero_average() {
    let set = product_set();
    let mapper = Mapper::new(&set);
    let product = laptop(vec![], 0);

    let dto = mapper.convert(&product, &TypeExpr::named("ProductReadDto")).unwrap();
    let dto = dto.as_record().unwrap();
    assert_eq!(dto.get("review_count"), Some(&Value::Int(0)));
    assert_eq!(dto.get("average_rating"), Some(&Value::Float(0.0)));
    assert_eq!(dto.get("reviews").unwrap().as_list().unwrap().len(), 0);
    // Active but out of stock.
    assert_eq!(dto.get("is_available"), Some(&Value::Bool(false)));
}

#[test]
fn top_level_container_requests_map_element_wise() {
    let set = product_set();
    let mapper = Mapper::new(&set);
    let reviews = Value::List(vec![review(1, "Great!", 5), review(2, "Good", 4)]);

    let dtos = mapper.convert(&reviews, &TypeExpr::parse("Vec<ReviewDto>")).unwrap();
    let dtos = dtos.as_list().unwrap();
    assert_eq!(dtos.len(), 2);
    assert_eq!(
        dtos[0].as_record().unwrap().get("formatted_rating"),
        Some(&Value::Str("5/5 stars".into()))
    );
}

#[test]
fn product_create_dto_converts_into_a_full_product() {
    let set = product_set();
    let mapper = Mapper::new(&set);
    let create = Value::from(
        Record::new("ProductCreateDto")
            .with("name", "T-Shirt")
            .with("description", "Cotton T-Shirt")
            .with("price", 29.99f64)
            .with("stock_quantity", 100i64)
            .with("sku", "TSH-001")
            .with("is_active", true)
            .with("category", category()),
    );

    let product = mapper.convert(&create, &TypeExpr::named("Product")).unwrap();
    let product = product.as_record().unwrap();
    assert_eq!(product.shape(), "Product");

    // Matched properties are assigned directly, including the nested record:
    // this direction performs no type-mismatch fallback.
    assert_eq!(product.get("name"), Some(&Value::Str("T-Shirt".into())));
    assert_eq!(product.get("sku"), Some(&Value::Str("TSH-001".into())));
    let nested = product.get("category").unwrap().as_record().unwrap();
    assert_eq!(nested.shape(), "Category");

    // Counterpart-only properties come from the hook.
    assert_eq!(product.get("id"), Some(&Value::Int(0)));
    assert_eq!(product.get("internal_notes"), Some(&Value::Str(String::new())));
    assert_eq!(product.get("reviews").unwrap().as_list().unwrap().len(), 0);
}

// -------------------------------- User side ------------------------------- //

fn user_catalog() -> DeclaredCatalog {
    let mut catalog = DeclaredCatalog::new();
    catalog.push(TypeDecl::plain(TypeShape::new(
        "Order",
        vec![
            PropertyDescriptor::new("id", "i64"),
            PropertyDescriptor::new("order_number", "String"),
            PropertyDescriptor::new("total_amount", "f64"),
        ],
    )));
    catalog.push(TypeDecl::plain(TypeShape::new(
        "User",
        vec![
            PropertyDescriptor::new("id", "i64"),
            PropertyDescriptor::new("username", "String"),
            PropertyDescriptor::new("email", "String"),
            PropertyDescriptor::new("first_name", "String"),
            PropertyDescriptor::new("last_name", "String"),
            PropertyDescriptor::new("is_email_verified", "bool"),
            PropertyDescriptor::new("password_hash", "String"),
            PropertyDescriptor::new("orders", "Vec<Order>"),
        ],
    )));
    catalog.push(TypeDecl::marked(
        TypeShape::new(
            "OrderDto",
            vec![
                PropertyDescriptor::new("id", "i64"),
                PropertyDescriptor::new("order_number", "String"),
                PropertyDescriptor::new("total_amount", "f64"),
            ],
        ),
        vec![MarkerUse::new(MAP_FROM, "Order")],
    ));
    catalog.push(TypeDecl::marked(
        TypeShape::new(
            "UserReadDto",
            vec![
                PropertyDescriptor::new("id", "i64"),
                PropertyDescriptor::new("username", "String"),
                PropertyDescriptor::new("email", "String"),
                PropertyDescriptor::new("first_name", "String"),
                PropertyDescriptor::new("last_name", "String"),
                PropertyDescriptor::new("is_email_verified", "bool"),
                PropertyDescriptor::new("orders", "Vec<OrderDto>"),
                PropertyDescriptor::new("full_name", "String"),
                PropertyDescriptor::new("total_orders", "i64"),
                PropertyDescriptor::new("masked_email", "String"),
            ],
        ),
        vec![MarkerUse::new(MAP_FROM, "User")],
    ));
    catalog
}

fn mask_email(email: &str) -> String {
    if email.is_empty() {
        return String::new();
    }
    match email.find('@') {
        Some(at) if at > 1 => format!("{}***{}", &email[..1], &email[at..]),
        _ => email.to_string(),
    }
}

fn user_set() -> MappingSet {
    let mut hooks = HookRegistry::new();
    hooks
        .register("UserReadDto", |_, source| {
            let first = source.get("first_name").and_then(Value::as_str).unwrap_or_default();
            let last = source.get("last_name").and_then(Value::as_str).unwrap_or_default();
            let email = source.get("email").and_then(Value::as_str).unwrap_or_default();
            let orders = source.get("orders").and_then(Value::as_list).map_or(0, |o| o.len());
            Record::new("UserUnmappedProperties")
                .with("full_name", format!("{first} {last}"))
                .with("total_orders", orders as i64)
                .with("masked_email", mask_email(email))
        })
        .unwrap();
    MappingSet::compile(&user_catalog(), MarkerCatalog::standard(), hooks).unwrap()
}

fn order(id: i64, number: &str, amount: f64) -> Value {
    Value::from(
        Record::new("Order")
            .with("id", id)
            .with("order_number", number)
            .with("total_amount", amount),
    )
}

fn john(orders: Vec<Value>, email: &str) -> Value {
    Value::from(
        Record::new("User")
            .with("id", 1i64)
            .with("username", "johndoe")
            .with("email", email)
            .with("first_name", "John")
            .with("last_name", "Doe")
            .with("is_email_verified", true)
            .with("password_hash", "hashed_password_should_not_be_mapped")
            .with("orders", orders),
    )
}

#[test]
fn user_read_dto_masks_email_and_counts_orders() {
    let set = user_set();
    let mapper = Mapper::new(&set);
    let user = john(
        vec![order(1, "ORD-001", 100.0), order(2, "ORD-002", 200.0)],
        "john.doe@example.com",
    );

    let dto = mapper.convert(&user, &TypeExpr::named("UserReadDto")).unwrap();
    let dto = dto.as_record().unwrap();

    assert_eq!(dto.get("username"), Some(&Value::Str("johndoe".into())));
    assert_eq!(dto.get("email"), Some(&Value::Str("john.doe@example.com".into())));
    assert!(dto.get("password_hash").is_none());

    assert_eq!(dto.get("full_name"), Some(&Value::Str("John Doe".into())));
    assert_eq!(dto.get("total_orders"), Some(&Value::Int(2)));
    assert_eq!(dto.get("masked_email"), Some(&Value::Str("j***@example.com".into())));

    let orders = dto.get("orders").unwrap().as_list().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(
        orders[1].as_record().unwrap().get("order_number"),
        Some(&Value::Str("ORD-002".into()))
    );
}

#[test]
fn empty_email_masks_to_empty_and_no_orders_count_zero() {
    let set = user_set();
    let mapper = Mapper::new(&set);
    let user = john(vec![], "");

    let dto = mapper.convert(&user, &TypeExpr::named("UserReadDto")).unwrap();
    let dto = dto.as_record().unwrap();
    assert_eq!(dto.get("masked_email"), Some(&Value::Str(String::new())));
    assert_eq!(dto.get("total_orders"), Some(&Value::Int(0)));
    assert_eq!(dto.get("orders").unwrap().as_list().unwrap().len(), 0);
}

#[test]
fn dto_field_order_follows_the_declared_shape() {
    let set = user_set();
    let mapper = Mapper::new(&set);
    let user = john(vec![], "jane@example.com");

    let dto = mapper.convert(&user, &TypeExpr::named("UserReadDto")).unwrap();
    let names: Vec<&str> = dto.as_record().unwrap().fields().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        [
            "id",
            "username",
            "email",
            "first_name",
            "last_name",
            "is_email_verified",
            "orders",
            "full_name",
            "total_orders",
            "masked_email"
        ]
    );
}
