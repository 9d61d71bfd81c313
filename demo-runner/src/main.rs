//! End-to-end walkthrough: declare a tiny user/document domain, compile the
//! mapping set, and push one value through both mapping directions, printing
//! each stage as JSON.

use shapemap::catalog::{DeclaredCatalog, MarkerUse, TypeDecl};
use shapemap::markers::{MAP_FROM, MAP_TO, MarkerCatalog};
use shapemap::runtime::{HookRegistry, Mapper, MappingSet};
use shapemap::shape::{PropertyDescriptor, TypeExpr, TypeShape};
use shapemap::value::{Record, Value};

fn catalog() -> DeclaredCatalog {
    let mut catalog = DeclaredCatalog::new();
    catalog.push(TypeDecl::plain(TypeShape::new(
        "User",
        vec![
            PropertyDescriptor::new("id", "i64"),
            PropertyDescriptor::new("name", "String"),
            PropertyDescriptor::new("guid", "Uuid"),
            PropertyDescriptor::new("documents", "Vec<Document>"),
        ],
    )));
    catalog.push(TypeDecl::plain(TypeShape::new(
        "Document",
        vec![
            PropertyDescriptor::new("id", "i64"),
            PropertyDescriptor::new("title", "String"),
            PropertyDescriptor::new("content", "String"),
        ],
    )));
    catalog.push(TypeDecl::marked(
        TypeShape::new(
            "DocumentDto",
            vec![
                PropertyDescriptor::new("title", "String"),
                PropertyDescriptor::new("content", "String"),
            ],
        ),
        vec![MarkerUse::new(MAP_FROM, "Document")],
    ));
    catalog.push(TypeDecl::marked(
        TypeShape::new(
            "UserReadDto",
            vec![
                PropertyDescriptor::new("id", "i64"),
                PropertyDescriptor::new("name", "String"),
                PropertyDescriptor::new("guid", "Uuid"),
                PropertyDescriptor::new("title", "String"),
                PropertyDescriptor::new("documents", "Vec<DocumentDto>"),
            ],
        ),
        vec![MarkerUse::new(MAP_FROM, "User")],
    ));
    catalog.push(TypeDecl::marked(
        TypeShape::new(
            "UserCreateDto",
            vec![
                PropertyDescriptor::new("name", "String"),
                PropertyDescriptor::new("guid", "Uuid"),
            ],
        ),
        vec![MarkerUse::new(MAP_TO, "User")],
    ));
    catalog
}

fn hooks() -> anyhow::Result<HookRegistry> {
    let mut hooks = HookRegistry::new();
    // UserReadDto needs a title the User entity does not carry.
    hooks.register("UserReadDto", |_, source| {
        let name = source.get("name").and_then(Value::as_str).unwrap_or_default();
        Record::new("UserUnmappedProperties").with("title", format!("{name}'s Title"))
    })?;
    // A freshly created User gets database defaults.
    hooks.register("UserCreateDto", |_, _| {
        Record::new("UserUnmappedProperties")
            .with("id", 0i64)
            .with("documents", Vec::<Value>::new())
    })?;
    Ok(hooks)
}

fn print_stage(label: &str, value: &Value) -> anyhow::Result<()> {
    println!("--- {label} ---");
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let set = MappingSet::compile(&catalog(), MarkerCatalog::standard(), hooks()?)?;
    let mapper = Mapper::new(&set);

    let user_create = Value::from(
        Record::new("UserCreateDto")
            .with("name", "John Doe")
            .with("guid", "a3a80c80-0d6e-4bb4-96a2-7d4f4b0b3c2e"),
    );
    print_stage("User Create", &user_create)?;

    let user = mapper.convert(&user_create, &TypeExpr::named("User"))?;
    print_stage("User", &user)?;

    let user_dto = mapper.convert(&user, &TypeExpr::named("UserReadDto"))?;
    print_stage("UserReadDto", &user_dto)?;

    Ok(())
}
