//! Loader behaviour across encodings and file formats.

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_latte::data::loader::load;
use rusty_latte::data::model::Nutrient;
use rusty_latte::error::IngestError;

const MENU: &str = "Beverage,Calories,Caffeine (mg)\nCrème Latte,190,150\nTé Verde,0,25\n";

#[test]
fn utf16le_with_bom_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.csv");
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(MENU.encode_utf16().flat_map(u16::to_le_bytes));
    std::fs::write(&path, bytes).unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.encoding.as_deref(), Some("UTF-16LE"));
    assert_eq!(table.items[0].name, "Crème Latte");
    assert_eq!(table.items[1].get(Nutrient::Caffeine), Some(25.0));
}

#[test]
fn utf16le_without_bom_loads_clean_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.csv");
    let bytes: Vec<u8> = "item_name,calories\nMocha,250\nTea,5\n"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    std::fs::write(&path, bytes).unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.encoding.as_deref(), Some("UTF-16LE"));
    assert_eq!(table.items[0].name, "Mocha");
    assert_eq!(table.items[0].get(Nutrient::Calories), Some(250.0));
    assert_eq!(table.items[1].get(Nutrient::Calories), Some(5.0));
}

#[test]
fn windows_1252_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.csv");
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(MENU);
    assert!(!unmappable);
    std::fs::write(&path, &*bytes).unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.encoding.as_deref(), Some("windows-1252"));
    assert_eq!(table.items[0].name, "Crème Latte");
    assert_eq!(table.items[1].name, "Té Verde");
}

#[test]
fn json_records_load_with_mixed_cell_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    std::fs::write(
        &path,
        r#"[
            {"item_name": "Latte", "Calories": 190, "Fat (g)": "7"},
            {"item_name": "Tea", "Calories": null, "Sodium": "1,050"},
            {"item_name": "latte", "Fat (g)": 8}
        ]"#,
    )
    .unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.len(), 2);
    let latte = &table.items[0];
    assert_eq!(latte.get(Nutrient::Calories), Some(190.0));
    assert_eq!(latte.get(Nutrient::FatG), Some(7.0));
    assert_eq!(table.items[1].get(Nutrient::Calories), None);
    assert_eq!(table.items[1].get(Nutrient::Sodium), Some(1050.0));
    assert_eq!(table.encoding, None);
}

#[test]
fn json_alias_clash_resolves_alphabetically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    std::fs::write(&path, r#"[{"item_name": "Latte", "fat_g": 1, "Fat (g)": 7}]"#).unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.items[0].get(Nutrient::FatG), Some(7.0));
}

#[test]
fn json_must_be_an_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    std::fs::write(&path, r#"{"item_name": "Latte"}"#).unwrap();
    assert!(matches!(load(&path), Err(IngestError::Parse { .. })));
}

#[test]
fn parquet_columns_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("item_name", DataType::Utf8, false),
        Field::new("calories", DataType::Int64, true),
        Field::new("sugar_g", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["Mocha", "Tea"])),
            Arc::new(Int64Array::from(vec![Some(250), None])),
            Arc::new(Float64Array::from(vec![Some(30.5), Some(0.0)])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.items[0].get(Nutrient::Calories), Some(250.0));
    assert_eq!(table.items[0].get(Nutrient::SugarG), Some(30.5));
    assert_eq!(table.items[1].get(Nutrient::Calories), None);
}

#[test]
fn header_aliases_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aliases.csv");
    std::fs::write(
        &path,
        "Product,Total Fat (g),Total Carbohydrates (g),Dietary Fiber (g),Sugars,Sodium (mg),Mystery\n\
         Scone,18,60,2,25,400,x\n",
    )
    .unwrap();

    let table = load(&path).unwrap();
    let scone = &table.items[0];
    assert_eq!(scone.get(Nutrient::FatG), Some(18.0));
    assert_eq!(scone.get(Nutrient::CarbsG), Some(60.0));
    assert_eq!(scone.get(Nutrient::FiberG), Some(2.0));
    assert_eq!(scone.get(Nutrient::SugarG), Some(25.0));
    assert_eq!(scone.get(Nutrient::Sodium), Some(400.0));
    assert!(!table.source_columns.contains(&Nutrient::Calories));
}

#[test]
fn header_only_file_has_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "item_name,calories\n\n").unwrap();
    assert!(matches!(load(&path), Err(IngestError::NoRows { .. })));
}

#[test]
fn file_without_name_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nameless.csv");
    std::fs::write(&path, "calories,fat_g\n100,2\n").unwrap();
    assert!(matches!(load(&path), Err(IngestError::NoNameColumn { .. })));
}
