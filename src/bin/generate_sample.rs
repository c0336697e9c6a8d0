//! Writes sample menu files exercising the loader's quirks:
//! a drinks CSV with a blank name header, duplicate rows and `-` markers,
//! a UTF-16LE food CSV without sugar, and the drinks table as Parquet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Scale `base` by a factor in `[1 - spread, 1 + spread]`, rounded.
    fn jitter(&mut self, base: f64, spread: f64) -> f64 {
        (base * (1.0 + spread * (2.0 * self.next_f64() - 1.0))).round()
    }
}

/// name, calories, fat, carbs, fiber, protein, sodium, sugar, caffeine
type DrinkRow = (&'static str, f64, f64, f64, f64, f64, f64, f64, f64);

const DRINKS: &[DrinkRow] = &[
    ("Caffè Latte", 190.0, 7.0, 19.0, 0.0, 13.0, 170.0, 18.0, 150.0),
    ("Caffè Mocha", 290.0, 8.0, 42.0, 4.0, 13.0, 140.0, 35.0, 175.0),
    ("Cappuccino", 120.0, 4.0, 12.0, 0.0, 8.0, 100.0, 10.0, 150.0),
    ("Caramel Macchiato", 250.0, 7.0, 35.0, 0.0, 10.0, 150.0, 33.0, 150.0),
    ("Iced Black Tea", 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 25.0),
    ("Hot Chocolate", 370.0, 16.0, 47.0, 4.0, 14.0, 1160.0, 43.0, 25.0),
    ("Vanilla Frappuccino", 380.0, 14.0, 58.0, 0.0, 6.0, 230.0, 56.0, 0.0),
    ("Espresso", 5.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 75.0),
];

/// name, calories, fat, carbs, fiber, protein
const FOOD: &[(&str, f64, f64, f64, f64, f64)] = &[
    ("Plain Bagel", 280.0, 1.5, 56.0, 2.0, 11.0),
    ("Butter Croissant", 260.0, 15.0, 28.0, 1.0, 5.0),
    ("Blueberry Muffin", 380.0, 16.0, 56.0, 1.0, 5.0),
    ("Egg & Cheese Sandwich", 450.0, 22.0, 40.0, 2.0, 22.0),
    ("Fruit Cup", 90.0, 0.0, 22.0, 3.0, 1.0),
    ("Crème Brûlée Cookie", 410.0, 21.0, 52.0, 1.0, 4.0),
];

fn fmt(v: f64) -> String {
    if v >= 1000.0 {
        // Thousands separators appear in real exports.
        let v = v as i64;
        format!("\"{},{:03}\"", v / 1000, v % 1000)
    } else {
        format!("{v}")
    }
}

fn drinks_csv(rng: &mut SimpleRng) -> String {
    // Blank first header: the name column has no label.
    let mut out = String::from(
        ",Calories,Fat (g),Carb. (g),Fiber (g),Protein,Sodium,Sugar (g),Caffeine (mg)\n",
    );
    for (i, &(name, cal, fat, carbs, fiber, protein, sodium, sugar, caffeine)) in
        DRINKS.iter().enumerate()
    {
        // Every third drink has no published caffeine figure.
        let caffeine = if i % 3 == 0 { "-".to_string() } else { fmt(caffeine) };
        out.push_str(&format!(
            "{name},{},{fat},{carbs},{fiber},{protein},{},{sugar},{caffeine}\n",
            fmt(rng.jitter(cal, 0.02)),
            fmt(sodium),
        ));
    }
    // Duplicate with different casing and spacing, filling a gap.
    out.push_str("  caffè   LATTE ,,,,,,,,150\n");
    out
}

fn food_csv() -> String {
    let mut out = String::from("Item,Calories,Fat (g),Carb. (g),Fiber (g),Protein (g)\n");
    for &(name, cal, fat, carbs, fiber, protein) in FOOD {
        out.push_str(&format!("{name},{cal},{fat},{carbs},{fiber},{protein}\n"));
    }
    out.push_str("Seasonal Pastry,N/A,-,-,-,-\n");
    out
}

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

fn write_drinks_parquet(path: &Path) -> Result<()> {
    let names: Vec<&str> = DRINKS.iter().map(|d| d.0).collect();
    let column = |f: fn(&DrinkRow) -> f64| Float64Array::from(DRINKS.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("item_name", DataType::Utf8, false),
        Field::new("calories", DataType::Float64, true),
        Field::new("fat_g", DataType::Float64, true),
        Field::new("carbs_g", DataType::Float64, true),
        Field::new("protein_g", DataType::Float64, true),
        Field::new("sugar_g", DataType::Float64, true),
        Field::new("caffeine_mg", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(names)),
            Arc::new(column(|d| d.1)),
            Arc::new(column(|d| d.2)),
            Arc::new(column(|d| d.3)),
            Arc::new(column(|d| d.5)),
            Arc::new(column(|d| d.7)),
            Arc::new(column(|d| d.8)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let drinks = dir.join("sample_drinks.csv");
    std::fs::write(&drinks, drinks_csv(&mut rng))?;

    let food = dir.join("sample_food.csv");
    std::fs::write(&food, utf16le_with_bom(&food_csv()))?;

    let parquet = dir.join("sample_drinks.parquet");
    write_drinks_parquet(&parquet)?;

    println!(
        "Wrote {} drinks and {} food items to {}",
        DRINKS.len(),
        FOOD.len(),
        dir.display()
    );
    Ok(())
}
