mod common;

use autoquery::query::{
    ChainQuery, CmpOp, Filter, Order, QueryValue, SortSpec, compare_bson, compare_docs, eval_filter,
        execute,
    project_fields,
};
use autoquery::{QueryBuilder, QueryParams};
use bson::{Bson, Document, doc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

fn run(params: &QueryParams) -> Vec<Document> {
    let builder = QueryBuilder::with_dictionary(common::user_schema(), common::dictionary());
    execute(&builder.build(params), &common::users())
}

fn matching(key: &str, value: QueryValue) -> Option<BTreeMap<String, QueryValue>> {
    Some(BTreeMap::from([(key.to_string(), value)]))
}

fn names(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.get_str("name").unwrap()).collect()
}

#[test]
fn sort_skip_limit_select_together() {
    let docs = run(&QueryParams {
        matches: Some(BTreeMap::new()),
        sort: Some("-firstName".into()),
        skip: Some(1),
        limit: Some(1),
        select: Some(vec!["firstName".into(), "lastName".into()]),
        order: None,
    });
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0], doc! { "_id": 4, "name": "Jonas", "surname": "Manga" });
    assert!(docs[0].get("likes").is_none());
}

#[test]
fn empty_match_returns_everything() {
    let docs = run(&QueryParams { matches: Some(BTreeMap::new()), ..Default::default() });
    assert_eq!(docs.len(), 4);
}

#[test]
fn nested_match_through_dictionary() {
    let docs = run(&QueryParams {
        matches: matching("vehicle.model", "Kalahari".into()),
        ..Default::default()
    });
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get_str("surname").unwrap(), "Tomanga");
}

#[test]
fn array_field_equality_with_paging() {
    let all =
        run(&QueryParams { matches: matching("likes", "Dancing".into()), ..Default::default() });
    assert_eq!(names(&all), vec!["Jon", "Jane", "Jonas"]);
    let paged = run(&QueryParams {
        matches: matching("likes", "Dancing".into()),
        skip: Some(1),
        limit: Some(1),
        ..Default::default()
    });
    assert_eq!(names(&paged), vec!["Jane"]);
}

#[test]
fn range_operators_select_by_year() {
    let count = |raw: &str| {
        run(&QueryParams { matches: matching("vehicle.year", raw.into()), ..Default::default() })
            .len()
    };
    assert_eq!(count(">2007"), 2);
    assert_eq!(count(">:2007"), 3);
    assert_eq!(count("<2007"), 1);
    assert_eq!(count("<:2007"), 2);
    assert_eq!(count("2020"), 2);
}

#[test]
fn negated_scalar_excludes_value() {
    let docs = run(&QueryParams {
        matches: matching("lastName", "!Tomanga".into()),
        ..Default::default()
    });
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(|d| d.get_str("surname").unwrap() == "Manga"));
}

#[test]
fn negated_array_entries_exclude() {
    let likes: QueryValue = ["!Volleyball", "Dancing"].into_iter().collect();
    let docs = run(&QueryParams { matches: matching("likes", likes), ..Default::default() });
    assert_eq!(names(&docs), vec!["Jane", "Jonas"]);
}

#[test]
fn ascending_sort_on_nested_path() {
    let docs = run(&QueryParams { sort: Some("vehicle.year".into()), ..Default::default() });
    let ids: Vec<i32> = docs.iter().map(|d| d.get_i32("_id").unwrap()).collect();
    assert_eq!(ids, vec![2, 1, 3, 4]);
}

#[test]
fn select_nested_path_keeps_array_shape() {
    let docs = run(&QueryParams {
        matches: matching("firstName", "Jane".into()),
        select: Some(vec!["vehicle.model".into()]),
        ..Default::default()
    });
    assert_eq!(docs, vec![doc! { "_id": 3, "car": [{ "model": "Otavi" }] }]);
}

#[test]
fn ne_and_nin_match_missing_fields() {
    let d = doc! { "name": "x" };
    let ne = Filter::Cmp { path: "aim".into(), op: CmpOp::Ne, value: "Booting".into() };
    let nin = Filter::Nin { path: "aim".into(), values: vec!["Booting".into()] };
    let eq = Filter::Cmp { path: "aim".into(), op: CmpOp::Eq, value: "Booting".into() };
    assert!(eval_filter(&d, &ne));
    assert!(eval_filter(&d, &nin));
    assert!(!eval_filter(&d, &eq));
}

#[test]
fn range_ignores_mismatched_types() {
    let d = doc! { "year": "2020" };
    let gt = Filter::Cmp { path: "year".into(), op: CmpOp::Gt, value: Bson::Int64(1) };
    assert!(!eval_filter(&d, &gt));
    let numeric = doc! { "year": 2020.0 };
    let eq = Filter::Cmp { path: "year".into(), op: CmpOp::Eq, value: Bson::Int64(2020) };
    assert!(eval_filter(&numeric, &eq));
}

#[test]
fn and_requires_every_condition() {
    let query = ChainQuery::find_all("users")
        .where_cmp("surname", CmpOp::Eq, "Manga".into())
        .where_in("name", vec!["Jonas".into(), "Jane".into()])
        .where_nin("likes", vec!["Volleyball".into()]);
    assert!(matches!(query.filter(), Filter::And(ref fs) if fs.len() == 3));
    let docs = execute(&query, &common::users());
    assert_eq!(names(&docs), vec!["Jane", "Jonas"]);
}

#[test]
fn compare_helpers_order_values() {
    assert_eq!(compare_bson(&Bson::Int32(2), &Bson::Double(2.5)), Ordering::Less);
    assert_eq!(
        compare_bson(&Bson::String("b".into()), &Bson::String("a".into())),
        Ordering::Greater
    );
    assert_eq!(compare_bson(&Bson::Null, &Bson::Int32(0)), Ordering::Less);

    let a = doc! { "n": 1, "m": "x" };
    let b = doc! { "n": 1, "m": "y" };
    let sort = [
        SortSpec { field: "n".into(), order: Order::Asc },
        SortSpec { field: "m".into(), order: Order::Desc },
    ];
    assert_eq!(compare_docs(&a, &b, &sort), Ordering::Greater);
}

#[test]
fn project_fields_merges_siblings() {
    let d = doc! {
        "_id": 9,
        "car": { "model": "Otavi", "year": 2020, "color": "red" },
        "name": "x",
    };
    let out = project_fields(&d, &["car.model".to_string(), "car.year".to_string()]);
    assert_eq!(out, doc! { "_id": 9, "car": { "model": "Otavi", "year": 2020 } });
}

#[test]
fn large_exclusion_sets_are_kept_whole() {
    let mut likes: Vec<String> = (0..1000).map(|i| format!("!x{i}")).collect();
    likes.push("!Volleyball".into());
    let value: QueryValue = likes.iter().map(String::as_str).collect();
    let builder = QueryBuilder::with_dictionary(common::user_schema(), common::dictionary());
    let query =
        builder.build(&QueryParams { matches: matching("likes", value), ..Default::default() });
    let [Filter::Nin { values, .. }] = query.conditions() else {
        panic!("expected a single $nin condition");
    };
    assert_eq!(values.len(), 1001);
    let docs = execute(&query, &common::users());
    assert_eq!(names(&docs), vec!["Jane", "Jonas"]);
}

#[test]
fn execute_follows_the_merged_filter_document() {
    // `firstName` resolves to `name`, so both keys land on one path.
    let params = QueryParams {
        matches: Some(BTreeMap::from([
            ("firstName".to_string(), QueryValue::from("Jonas")),
            ("name".to_string(), QueryValue::from("!Jon")),
        ])),
        ..Default::default()
    };
    let builder = QueryBuilder::with_dictionary(common::user_schema(), common::dictionary());
    let query = builder.build(&params);
    assert_eq!(query.filter_document(), doc! { "name": { "$ne": "Jon" } });
    assert_eq!(
        query.filter(),
        Filter::Cmp { path: "name".into(), op: CmpOp::Ne, value: "Jon".into() }
    );
    let docs = execute(&query, &common::users());
    assert_eq!(names(&docs), vec!["Jonas", "Jane", "Jonas"]);
}

#[test]
fn merged_conditions_join_operators_per_path() {
    let ranged = ChainQuery::find_all("users")
        .where_cmp("car.year", CmpOp::Gt, Bson::Int64(1900))
        .where_cmp("car.year", CmpOp::Lt, Bson::Int64(2020));
    assert_eq!(ranged.merged_conditions().len(), 2);
    assert_eq!(names(&execute(&ranged, &common::users())), vec!["Jonas"]);

    let replaced = ChainQuery::find_all("users")
        .where_cmp("car.year", CmpOp::Gt, Bson::Int64(1900))
        .where_cmp("car.year", CmpOp::Gt, Bson::Int64(2010));
    assert_eq!(
        replaced.filter(),
        Filter::Cmp { path: "car.year".into(), op: CmpOp::Gt, value: Bson::Int64(2010) }
    );
    assert_eq!(replaced.filter_document(), doc! { "car.year": { "$gt": 2010_i64 } });
    assert_eq!(names(&execute(&replaced, &common::users())), vec!["Jane", "Jonas"]);

    let equality_wins = ChainQuery::find_all("users")
        .where_in("name", vec!["Jon".into()])
        .where_cmp("name", CmpOp::Eq, "Jane".into());
    assert_eq!(names(&execute(&equality_wins, &common::users())), vec!["Jane"]);
    assert_eq!(equality_wins.conditions().len(), 2);
}

#[test]
fn sort_uses_every_key() {
    let mut query = ChainQuery::find_all("users");
    for field in ["a", "b", "c", "d", "e", "f", "g", "h"] {
        query = query.sort(SortSpec { field: field.into(), order: Order::Asc });
    }
    query = query.sort(SortSpec { field: "_id".into(), order: Order::Desc });
    let ids: Vec<i32> =
        execute(&query, &common::users()).iter().map(|d| d.get_i32("_id").unwrap()).collect();
    assert_eq!(ids, vec![4, 3, 2, 1]);
}
