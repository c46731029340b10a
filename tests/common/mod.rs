#![allow(dead_code)]

use autoquery::{Dictionary, FieldKind, Schema};
use bson::{Document, doc};

pub fn user_schema() -> Schema {
    Schema::new("users")
        .field("name", FieldKind::String)
        .field("surname", FieldKind::String)
        .field("likes", FieldKind::String)
        .field("car.model", FieldKind::String)
        .field("car.year", FieldKind::Number)
}

pub fn dictionary() -> Dictionary {
    Dictionary::new([
        ("firstName", "name"),
        ("lastName", "surname"),
        ("vehicle.model", "car.model"),
        ("vehicle.year", "car.year"),
    ])
}

pub fn users() -> Vec<Document> {
    vec![
        doc! {
            "_id": 1,
            "name": "Jonas",
            "surname": "Tomanga",
            "likes": ["Football", "Volleyball"],
            "car": [{ "model": "Kalahari", "year": 2007 }],
            "aim": "Booting",
        },
        doc! {
            "_id": 2,
            "name": "Jon",
            "surname": "Manga",
            "likes": ["Dancing", "Volleyball"],
            "car": [{ "model": "Oshakati", "year": 1900 }],
        },
        doc! {
            "_id": 3,
            "name": "Jane",
            "surname": "Manga",
            "likes": ["Dancing", "Basketball"],
            "car": [{ "model": "Otavi", "year": 2020 }],
        },
        doc! {
            "_id": 4,
            "name": "Jonas",
            "surname": "Manga",
            "likes": ["Dancing", "Basketball"],
            "car": [{ "model": "Otavi", "year": 2020 }],
        },
    ]
}
