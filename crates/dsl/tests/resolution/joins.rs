use dsl::{
    error::DslError,
    join_dependency::{JoinDependency, Segment},
    nodes::Node,
    table::Member,
};
use planner::query::{
    ast::{
        common::JoinKind,
        expr::{BinaryOperator, Expr},
    },
    qualified,
};

use super::helpers::*;

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::binary(left, BinaryOperator::Eq, right)
}

#[test]
fn test_belongs_to_chain_produces_one_inner_join() {
    let cat = catalog();
    let orders = table(&cat, "Order");

    let Member::Column(name) = orders.path("customer.name").unwrap() else {
        panic!("expected a column");
    };

    let mut deps = JoinDependency::new(orders);
    let expr = deps.lower(&name.into()).unwrap();

    assert_eq!(expr, qualified("customers", "name"));
    assert_eq!(deps.len(), 1);

    let entry = &deps.entries()[0];
    assert_eq!(entry.kind, JoinKind::Inner);
    assert_eq!(entry.relation.qualifier(), "customers");
    assert_eq!(
        entry.on,
        eq(qualified("customers", "id"), qualified("orders", "customer_id"))
    );
    assert_eq!(
        entry.path,
        vec![Segment {
            name: "customer".into(),
            alias: None,
        }]
    );
}

#[test]
fn test_outer_join_with_explicit_condition() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let condition = orders
        .attribute("customer_id")
        .unwrap()
        .eq(Node::sql("customers.id"))
        .and(Node::sql("customers.email IS NOT NULL"));

    let customer = orders
        .association("customer")
        .unwrap()
        .outer()
        .on(condition.clone());

    let mut deps = JoinDependency::new(orders);
    deps.join_association(&customer).unwrap();

    assert_eq!(deps.len(), 1);
    let entry = &deps.entries()[0];
    assert_eq!(entry.kind, JoinKind::Left);
    assert_eq!(entry.on, condition.lower_detached().unwrap());
}

#[test]
fn test_has_many_maps_foreign_key_on_target() {
    let cat = catalog();
    let mut deps = table(&cat, "Customer").arel(&["orders"]).unwrap();

    assert_eq!(
        deps.entries()[0].on,
        eq(qualified("orders", "customer_id"), qualified("customers", "id"))
    );

    let relation = deps.join_path(&["orders", "line_items"]).unwrap();
    assert_eq!(relation.qualifier(), "line_items");
    assert_eq!(deps.len(), 2);
    assert_eq!(
        deps.entries()[1].on,
        eq(qualified("line_items", "order_id"), qualified("orders", "id"))
    );
}

#[test]
fn test_same_chain_twice_is_deduplicated() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let customer = orders.association("customer").unwrap();

    let mut deps = JoinDependency::new(orders.clone());
    deps.join_association(&customer).unwrap();
    deps.join_path(&["customer"]).unwrap();
    deps.lower(&customer.attribute("email").unwrap().like("%@example.com"))
        .unwrap();

    assert_eq!(deps.len(), 1);
}

#[test]
fn test_distinct_aliases_join_twice() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let customer = orders.association("customer").unwrap();
    let buyer = customer.alias("buyer");
    let payer = customer.alias("payer");

    let mut deps = JoinDependency::new(orders);
    let first = deps.join_association(&buyer).unwrap();
    let second = deps.join_association(&payer).unwrap();

    assert_eq!(deps.len(), 2);
    assert_eq!(first.qualifier(), "buyer");
    assert_eq!(second.qualifier(), "payer");
    assert_eq!(
        deps.entries()[1].on,
        eq(qualified("payer", "id"), qualified("orders", "customer_id"))
    );
}

#[test]
fn test_plan_order_is_deterministic() {
    let cat = catalog();
    let plan = || {
        let mut deps = table(&cat, "Order").arel(&["line_items", "product"]).unwrap();
        deps.join_path(&["customer", "region"]).unwrap();
        deps.join_path(&["customer", "referrer"]).unwrap();
        deps
    };

    let first = plan();
    let second = plan();

    assert_eq!(first.entries(), second.entries());
    let tables: Vec<_> = first
        .entries()
        .iter()
        .map(|e| e.relation.qualifier().to_string())
        .collect();
    assert_eq!(
        tables,
        vec![
            "line_items",
            "products",
            "customers",
            "regions",
            "referrer_customers",
        ]
    );
}

#[test]
fn test_self_reference_is_aliased_by_association() {
    let cat = catalog();
    let customers = table(&cat, "Customer");

    let Member::Column(name) = customers.path("referrer.name").unwrap() else {
        panic!("expected a column");
    };

    let mut deps = JoinDependency::new(customers);
    let expr = deps.lower(&name.into()).unwrap();

    assert_eq!(expr, qualified("referrer_customers", "name"));
    assert_eq!(
        deps.entries()[0].on,
        eq(
            qualified("referrer_customers", "id"),
            qualified("customers", "referrer_id")
        )
    );
}

#[test]
fn test_aliased_root_qualifies_conditions() {
    let cat = catalog();
    let orders = table(&cat, "Order").alias("o");
    let deps = orders.arel(&["customer"]).unwrap();

    assert_eq!(deps.base().qualifier(), "o");
    assert_eq!(
        deps.entries()[0].on,
        eq(qualified("customers", "id"), qualified("o", "customer_id"))
    );
}

#[test]
fn test_predeclared_condition_replaces_key_mapping() {
    let mut cat = dsl::catalog::Catalog::from_json(FIXTURE).unwrap();
    cat.register_join_condition(
        "Customer",
        "region",
        Node::sql("regions.id = customers.region_id AND regions.name <> ''"),
    )
    .unwrap();
    let cat = std::sync::Arc::new(cat);

    let deps = table(&cat, "Customer").arel(&["region"]).unwrap();
    assert_eq!(
        deps.entries()[0].on,
        Expr::Literal("regions.id = customers.region_id AND regions.name <> ''".into())
    );
}

#[test]
fn test_explicit_table_join() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let products = table(&cat, "Product")
        .alias("p")
        .outer()
        .on(Node::sql("p.id = orders.id"));

    let mut deps = JoinDependency::new(orders);
    let expr = deps
        .lower(&products.attribute("price").unwrap().into())
        .unwrap();
    deps.lower(&products.attribute("name").unwrap().into())
        .unwrap();

    assert_eq!(expr, qualified("p", "price"));
    assert_eq!(deps.len(), 1);
    assert_eq!(deps.entries()[0].kind, JoinKind::Left);
    assert!(deps.entries()[0].path.is_empty());
}

#[test]
fn test_unknown_hop_joins_nothing() {
    let cat = catalog();
    let mut deps = JoinDependency::new(table(&cat, "Order"));

    let err = deps.join_path(&["customer", "warehouse"]).unwrap_err();
    assert!(matches!(
        err,
        DslError::AssociationNotFound { ref model, ref name }
            if model == "Customer" && name == "warehouse"
    ));
    assert!(deps.is_empty());
}

#[test]
fn test_relation_reference_joins_association() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let region = orders.path("customer.region").unwrap();

    let mut deps = JoinDependency::new(orders);
    let expr = deps.lower(&region.into()).unwrap();

    assert_eq!(
        expr,
        Expr::Wildcard {
            qualifier: Some("regions".into())
        }
    );
    assert_eq!(deps.len(), 2);
}

#[test]
fn test_unjoined_table_in_filter_fails() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let products = table(&cat, "Product");
    let filter = products.attribute("name").unwrap().eq("x");

    let err = JoinDependency::new(orders)
        .build_select(&[], Some(&filter))
        .unwrap_err();
    assert!(matches!(
        err,
        DslError::RelationNotInPlan { ref table } if table == "products"
    ));
    assert_eq!(
        err.to_string(),
        "Relation 'products' is neither the root of the plan nor joined into it"
    );
}

#[test]
fn test_explicitly_joined_table_resolves_without_condition() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let products = table(&cat, "Product");
    let joined = products.on(Node::sql("products.id = orders.id"));

    let mut deps = JoinDependency::new(orders);
    deps.join_table(&joined).unwrap();
    let expr = deps
        .lower(&products.attribute("name").unwrap().into())
        .unwrap();

    assert_eq!(expr, qualified("products", "name"));
    assert_eq!(deps.len(), 1);
}

#[test]
fn test_predeclared_condition_is_not_requalified_for_alias() {
    let mut cat = dsl::catalog::Catalog::from_json(FIXTURE).unwrap();
    cat.register_join_condition(
        "Customer",
        "referrer",
        Node::sql("customers.id = customers.referrer_id"),
    )
    .unwrap();
    let cat = std::sync::Arc::new(cat);

    let deps = table(&cat, "Customer").arel(&["referrer"]).unwrap();
    let entry = &deps.entries()[0];
    assert_eq!(entry.relation.qualifier(), "referrer_customers");
    assert_eq!(
        entry.on,
        Expr::Literal("customers.id = customers.referrer_id".into())
    );
}
