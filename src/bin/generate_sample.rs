use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Four-letter ticker from a running index, e.g. 0 → `AAAX`.
fn ticker(i: usize, quote: &str) -> String {
    let mut n = i;
    let mut s = String::new();
    for _ in 0..3 {
        s.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    s.push(if quote == "ETF" { 'E' } else { 'X' });
    s
}

#[derive(Default)]
struct Columns {
    symbol: Vec<String>,
    name: Vec<String>,
    quote: Vec<String>,
    investment: Vec<Option<String>>,
    size: Vec<Option<String>>,
    bonds: Vec<f64>,
    stocks: Vec<f64>,
    /// 3, 5, 10 years × stdev, return, alpha, beta
    metrics: [[Vec<Option<f64>>; 4]; 3],
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let n_funds = 600;

    let quotes = ["ETF", "MutualFund"];
    let investments = ["Value", "Growth", "Blend"];
    let sizes = ["Large", "Medium", "Small"];
    let families = ["Vanguard", "Fidelity", "iShares", "Schwab", "T. Rowe Price"];

    let mut cols = Columns::default();

    for i in 0..n_funds {
        let quote = rng.pick(&quotes);
        let investment = rng.pick(&investments);
        let size = rng.pick(&sizes);
        let family = rng.pick(&families);

        cols.symbol.push(ticker(i, quote));
        cols.name.push(format!("{family} {size} Cap {investment} Fund"));
        cols.quote.push(quote.to_string());
        // a few funds without style classification, as in the upstream data
        let classified = rng.next_f64() > 0.05;
        cols.investment.push(classified.then(|| investment.to_string()));
        cols.size.push(classified.then(|| size.to_string()));

        let bonds = (rng.next_f64() * 0.6).min(1.0);
        cols.bonds.push(bonds);
        cols.stocks.push(1.0 - bonds);

        let style_tilt = match investment {
            "Growth" => 0.03,
            "Value" => -0.01,
            _ => 0.0,
        };
        // younger funds lack the longer horizons
        let age_years = rng.next_f64() * 20.0;
        for (h, years) in [3.0, 5.0, 10.0].into_iter().enumerate() {
            let present = age_years >= years;
            let stdev = 8.0 + 14.0 * (1.0 - bonds) + rng.gauss(0.0, 2.0);
            let ret = 0.06 + style_tilt + rng.gauss(0.0, 0.04);
            let alpha = rng.gauss(0.0, 2.5);
            let beta = (0.2 + 0.9 * (1.0 - bonds) + rng.gauss(0.0, 0.1)).max(0.0);
            for (m, v) in [stdev.abs(), ret, alpha, beta].into_iter().enumerate() {
                cols.metrics[h][m].push(present.then_some(v));
            }
        }
    }

    let mut fields = vec![
        Field::new("fund_symbol", DataType::Utf8, false),
        Field::new("fund_long_name", DataType::Utf8, true),
        Field::new("quote_type", DataType::Utf8, true),
        Field::new("investment_type", DataType::Utf8, true),
        Field::new("size_type", DataType::Utf8, true),
        Field::new("asset_bonds", DataType::Float64, true),
        Field::new("asset_stocks", DataType::Float64, true),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(cols.symbol)),
        Arc::new(StringArray::from(cols.name)),
        Arc::new(StringArray::from(cols.quote)),
        Arc::new(StringArray::from(cols.investment)),
        Arc::new(StringArray::from(cols.size)),
        Arc::new(Float64Array::from(cols.bonds)),
        Arc::new(Float64Array::from(cols.stocks)),
    ];
    for (suffix, per_horizon) in ["3years", "5years", "10years"].into_iter().zip(cols.metrics) {
        for (metric, values) in ["stdev", "return", "alpha", "beta"].into_iter().zip(per_horizon) {
            fields.push(Field::new(format!("fund_{metric}_{suffix}"), DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(values)));
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    // Write Parquet
    let output_path = std::path::Path::new("data/data.parquet");
    if let Some(dir) = output_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(output_path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("Wrote {n_funds} funds to {}", output_path.display());
    Ok(())
}
