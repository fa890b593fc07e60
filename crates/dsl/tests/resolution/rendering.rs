use dsl::{catalog::Catalog, join_dependency::JoinDependency, nodes::Node, to_sql};
use model::{
    core::value::Value,
    schema::{AssociationDef, ModelDef},
};
use planner::query::dialect::{MySql, Postgres};
use std::sync::Arc;

use super::helpers::*;

#[test]
fn test_association_column_with_filter() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let name = orders.path("customer.name").unwrap();
    let filter = orders.attribute("total").unwrap().gt(100);

    let select = orders
        .arel(&[])
        .unwrap()
        .build_select(&[Node::from(name)], Some(&filter))
        .unwrap();

    let (sql, params) = to_sql(&select, &Postgres);
    assert_eq!(
        sql,
        r#"SELECT "customers"."name" FROM "orders" INNER JOIN "customers" ON ("customers"."id" = "orders"."customer_id") WHERE ("orders"."total" > $1)"#
    );
    assert_eq!(params, vec![Value::Int(100)]);

    let (sql, _) = to_sql(&select, &MySql);
    assert_eq!(
        sql,
        "SELECT `customers`.`name` FROM `orders` INNER JOIN `customers` ON (`customers`.`id` = `orders`.`customer_id`) WHERE (`orders`.`total` > ?)"
    );
}

#[test]
fn test_empty_projection_selects_base_relation() {
    let cat = catalog();
    let select = JoinDependency::new(table(&cat, "Order"))
        .build_select(&[], None)
        .unwrap();

    assert_eq!(pg(&select), r#"SELECT "orders".* FROM "orders""#);
}

#[test]
fn test_aliased_outer_association_as_projection() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let customer = orders.association("customer").unwrap().alias("c").outer();

    let select = JoinDependency::new(orders)
        .build_select(&[Node::from(customer)], None)
        .unwrap();

    assert_eq!(
        pg(&select),
        r#"SELECT "c".* FROM "orders" LEFT OUTER JOIN "customers" AS "c" ON ("c"."id" = "orders"."customer_id")"#
    );
}

#[test]
fn test_functions_and_aliases() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let email = orders.path("customer.email").unwrap();

    let projection = [
        Node::func("LOWER", [email]).as_alias("email"),
        Node::count_all().as_alias("n"),
    ];
    let select = JoinDependency::new(orders)
        .build_select(&projection, None)
        .unwrap();

    assert_eq!(
        pg(&select),
        r#"SELECT LOWER("customers"."email") AS "email", COUNT(*) AS "n" FROM "orders" INNER JOIN "customers" ON ("customers"."id" = "orders"."customer_id")"#
    );
}

#[test]
fn test_sifter_and_in_list_bind_parameters_in_order() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let filter = orders.sift("big", &[Value::Int(250)]).unwrap()
        & orders
            .attribute("status")
            .unwrap()
            .in_list(["open", "paid"]);

    let select = orders.arel(&[]).unwrap().build_select(&[], Some(&filter)).unwrap();
    let (sql, params) = to_sql(&select, &Postgres);

    assert_eq!(
        sql,
        r#"SELECT "orders".* FROM "orders" WHERE (("orders"."total" > $1) AND ("orders"."status" IN ($2, $3)))"#
    );
    assert_eq!(
        params,
        vec![Value::Int(250), Value::from("open"), Value::from("paid")]
    );
}

#[test]
fn test_multi_hop_through_has_many() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let product = orders.path("line_items.product.name").unwrap();
    let filter = orders.path("line_items.quantity").unwrap();
    let filter = Node::from(filter).gt_eq(2);

    let select = orders
        .arel(&[])
        .unwrap()
        .build_select(&[Node::from(product)], Some(&filter))
        .unwrap();

    assert_eq!(
        pg(&select),
        r#"SELECT "products"."name" FROM "orders" INNER JOIN "line_items" ON ("line_items"."order_id" = "orders"."id") INNER JOIN "products" ON ("products"."id" = "line_items"."product_id") WHERE ("line_items"."quantity" >= $1)"#
    );
}

#[test]
fn test_schema_qualified_tables() {
    let cat = Catalog::new(vec![
        ModelDef::new("Invoice", "invoices")
            .schema("billing")
            .columns(&["id", "account_id", "amount"])
            .association(AssociationDef::belongs_to("account", "Account")),
        ModelDef::new("Account", "accounts")
            .schema("billing")
            .columns(&["id", "name"]),
    ])
    .unwrap();
    let cat = Arc::new(cat);

    let invoices = cat.table("Invoice").unwrap();
    let name = invoices.path("account.name").unwrap();
    let select = invoices
        .arel(&[])
        .unwrap()
        .build_select(&[Node::from(name)], None)
        .unwrap();

    assert_eq!(
        pg(&select),
        r#"SELECT "accounts"."name" FROM "billing"."invoices" INNER JOIN "billing"."accounts" ON ("accounts"."id" = "invoices"."account_id")"#
    );
}

#[test]
fn test_explicit_join_renders_condition_verbatim() {
    let cat = catalog();
    let orders = table(&cat, "Order");
    let regions = table(&cat, "Region").on(Node::sql("regions.name = 'EU'"));
    let projection = [Node::from(regions.attribute("name").unwrap())];

    let select = JoinDependency::new(orders)
        .build_select(&projection, None)
        .unwrap();

    assert_eq!(
        pg(&select),
        r#"SELECT "regions"."name" FROM "orders" INNER JOIN "regions" ON regions.name = 'EU'"#
    );
}
