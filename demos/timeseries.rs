//! Recording a damped oscillator as an mv1 time series.
//!
//! Run with: cargo run --example timeseries

use mv1::de::read_table;
use mv1::{output_init_with_options, output_timeseries_with_options, Mv1Options};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let dir = std::env::temp_dir().join("mv1-oscillator");
    std::fs::create_dir_all(&dir)?;
    let options = Mv1Options::new().with_dir(&dir);
    let labels = "t; x, v";

    // no ranges known up front
    output_init_with_options(labels, &[0.0; 4], options.clone())?;

    let (k, c, dt) = (4.0, 0.3, 0.01);
    let (mut x, mut v) = (1.0f64, 0.0f64);
    for ti in 0..500u64 {
        let t = ti as f64 * dt;
        output_timeseries_with_options(labels, &[x, v], ti, t, options.clone())?;
        let a = -k * x - c * v;
        v += a * dt;
        x += v * dt;
    }

    let rows = read_table(dir.join("t--x-v.dat"), 3)?;
    println!("recorded {} rows, last: {:?}", rows.len(), rows.last());
    Ok(())
}
