//! CSV output for tables and rankings.

use std::io::Write;

use super::model::{MenuTable, Nutrient};
use crate::metrics::rank::Ranking;

/// Columns written for `table`: the nutrients its source supplied, or
/// every nutrient when that is unknown.
fn output_columns(table: &MenuTable) -> Vec<Nutrient> {
    if table.source_columns.is_empty() {
        Nutrient::ALL.to_vec()
    } else {
        table.source_columns.iter().copied().collect()
    }
}

/// Write `table` as CSV with an `item_name` column first. Missing values
/// are empty cells.
pub fn write_table<W: Write>(table: &MenuTable, out: W) -> csv::Result<()> {
    let columns = output_columns(table);
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["item_name"];
    header.extend(columns.iter().map(|n| n.key()));
    writer.write_record(&header)?;

    for item in &table.items {
        let mut record = vec![item.name.clone()];
        record.extend(
            columns
                .iter()
                .map(|&n| item.get(n).map(format_value).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a ranking as `rank,item_name,<column>`.
pub fn write_ranking<W: Write>(ranking: &Ranking, out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["rank", "item_name", ranking.column.key()])?;
    for (i, entry) in ranking.items.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), entry.name.clone(), format_value(entry.value)])?;
    }
    writer.flush()?;
    Ok(())
}

/// Integers print without a fractional part.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MenuItem;

    #[test]
    fn writes_source_columns_only() {
        let table = MenuTable::from_items(vec![
            MenuItem::new("Latte").with(Nutrient::Calories, 190.0).with(Nutrient::FatG, 7.5),
            MenuItem::new("Tea").with(Nutrient::Calories, 0.0),
        ]);
        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "item_name,calories,fat_g\nLatte,190,7.5\nTea,0,\n");
    }

    #[test]
    fn ranking_rows_are_numbered() {
        let table = MenuTable::from_items(vec![
            MenuItem::new("a").with(Nutrient::Caffeine, 75.0),
            MenuItem::new("b").with(Nutrient::Caffeine, 150.0),
        ]);
        let ranking = Ranking::build(&table, Nutrient::Caffeine, 10);
        let mut buf = Vec::new();
        write_ranking(&ranking, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "rank,item_name,caffeine\n1,b,150\n2,a,75\n");
    }
}
