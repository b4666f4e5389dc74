use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Days, NaiveDate};
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

    fn pick<'a, T: ?Sized>(&mut self, items: &'a [&'a T]) -> &'a T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct IndustryProfile {
    name: &'static str,
    skills: &'static [&'static str],
    categories: &'static [&'static str],
    earnings_mu: f64,
    earnings_sigma: f64,
    rate_lo: f64,
    rate_hi: f64,
}

const PROFILES: &[IndustryProfile] = &[
    IndustryProfile {
        name: "IT",
        skills: &["Python", "Rust", "JavaScript", "SQL", "DevOps"],
        categories: &["Web Development", "Data Science", "Automation"],
        earnings_mu: 4200.0,
        earnings_sigma: 1500.0,
        rate_lo: 35.0,
        rate_hi: 90.0,
    },
    IndustryProfile {
        name: "Marketing",
        skills: &["SEO", "Copywriting", "Social Media", "Email Marketing"],
        categories: &["SEO", "Campaign Management"],
        earnings_mu: 2800.0,
        earnings_sigma: 900.0,
        rate_lo: 20.0,
        rate_hi: 60.0,
    },
    IndustryProfile {
        name: "Design",
        skills: &["Illustration", "UI Design", "Branding", "Motion Graphics"],
        categories: &["Logo Design", "Product Design"],
        earnings_mu: 3100.0,
        earnings_sigma: 1100.0,
        rate_lo: 25.0,
        rate_hi: 70.0,
    },
    IndustryProfile {
        name: "Finance",
        skills: &["Bookkeeping", "Tax Preparation", "Financial Modeling"],
        categories: &["Accounting", "Consulting"],
        earnings_mu: 3600.0,
        earnings_sigma: 1200.0,
        rate_lo: 30.0,
        rate_hi: 80.0,
    },
    IndustryProfile {
        name: "Writing",
        skills: &["Blog Writing", "Technical Writing", "Editing"],
        categories: &["Content Writing", "Ghostwriting"],
        earnings_mu: 2200.0,
        earnings_sigma: 700.0,
        rate_lo: 15.0,
        rate_hi: 45.0,
    },
    IndustryProfile {
        name: "Engineering",
        skills: &["CAD", "PCB Design", "Simulation"],
        categories: &["Mechanical Design", "Electronics"],
        earnings_mu: 3900.0,
        earnings_sigma: 1300.0,
        rate_lo: 30.0,
        rate_hi: 85.0,
    },
];

const ROWS: usize = 600;

struct Row {
    industry: &'static str,
    skill: Option<&'static str>,
    category: &'static str,
    earnings: f64,
    completed: i64,
    rate: f64,
    date: NaiveDate,
}

/// "$1,234.56" with thousands grouping, as some marketplace exports write it.
fn currency(v: f64) -> String {
    let cents = (v * 100.0).round() as i64;
    let mut digits = (cents / 100).to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let split = digits.len() - 3;
        grouped = format!(",{}{}", &digits[split..], grouped);
        digits.truncate(split);
    }
    format!("${digits}{grouped}.{:02}", cents % 100)
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");

    let rows: Vec<Row> = (0..ROWS)
        .map(|_| {
            let profile = &PROFILES[(rng.next_u64() % PROFILES.len() as u64) as usize];
            // ~3% of skill cells are left blank to exercise missing-value
            // reporting and the row-dropping pass.
            let skill = if rng.next_f64() < 0.03 {
                None
            } else {
                Some(rng.pick(profile.skills))
            };
            let earnings = rng.gauss(profile.earnings_mu, profile.earnings_sigma).max(25.0);
            Row {
                industry: profile.name,
                skill,
                category: rng.pick(profile.categories),
                earnings,
                completed: (rng.next_f64() * 150.0) as i64,
                rate: profile.rate_lo + rng.next_f64() * (profile.rate_hi - profile.rate_lo),
                date: first_day + Days::new(rng.next_u64() % 730),
            }
        })
        .collect();

    // ---- CSV (mixed-case headers, currency-formatted earnings) ----
    let csv_path = "freelancer_earnings_bd.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record([
            "Industry",
            "Skill",
            "Job Category",
            "Earnings_USD",
            "Job_Completed",
            "Hourly_Rate",
            "Date",
        ])
        .expect("Failed to write CSV header");
    for row in &rows {
        writer
            .write_record(vec![
                row.industry.to_string(),
                row.skill.unwrap_or("").to_string(),
                row.category.to_string(),
                currency(row.earnings),
                row.completed.to_string(),
                format!("{:.2}", row.rate),
                row.date.format("%Y-%m-%d").to_string(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // ---- Parquet (typed columns, nullable skill, Date32 dates) ----
    let industry_array =
        StringArray::from(rows.iter().map(|r| r.industry).collect::<Vec<_>>());
    let skill_array = StringArray::from(rows.iter().map(|r| r.skill).collect::<Vec<_>>());
    let category_array =
        StringArray::from(rows.iter().map(|r| r.category).collect::<Vec<_>>());
    let earnings_array = Float64Array::from(
        rows.iter()
            .map(|r| (r.earnings * 100.0).round() / 100.0)
            .collect::<Vec<_>>(),
    );
    let completed_array = Int64Array::from(rows.iter().map(|r| r.completed).collect::<Vec<_>>());
    let rate_array = Float64Array::from(
        rows.iter()
            .map(|r| (r.rate * 100.0).round() / 100.0)
            .collect::<Vec<_>>(),
    );
    let date_array = Date32Array::from(
        rows.iter()
            .map(|r| r.date.num_days_from_ce() - 719_163)
            .collect::<Vec<_>>(),
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new("Industry", DataType::Utf8, false),
        Field::new("Skill", DataType::Utf8, true),
        Field::new("Job Category", DataType::Utf8, false),
        Field::new("Earnings_USD", DataType::Float64, false),
        Field::new("Job_Completed", DataType::Int64, false),
        Field::new("Hourly_Rate", DataType::Float64, false),
        Field::new("Date", DataType::Date32, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(industry_array),
            Arc::new(skill_array),
            Arc::new(category_array),
            Arc::new(earnings_array),
            Arc::new(completed_array),
            Arc::new(rate_array),
            Arc::new(date_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "freelancer_earnings_bd.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut parquet_writer =
        ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    parquet_writer.write(&batch).expect("Failed to write batch");
    parquet_writer.close().expect("Failed to close writer");

    println!("Wrote {ROWS} records to {csv_path} and {parquet_path}");
}
