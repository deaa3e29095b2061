//! 1D heat equation dumped as mv1 snapshots.
//!
//! Run with: cargo run --example heat_snapshot

use mv1::{Channel, Mv1Options, Point, PointSource};
use std::error::Error;

/// A uniform 1D grid holding one scalar field.
struct Rod {
    dx: f64,
    u: Vec<f64>,
}

impl PointSource for Rod {
    fn visit(&self, visitor: &mut dyn FnMut(Point<'_>) -> mv1::Result<()>) -> mv1::Result<()> {
        for (i, u) in self.u.iter().enumerate() {
            let x = i as f64 * self.dx;
            visitor(Point {
                coords: &[x],
                fields: std::slice::from_ref(u),
            })?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let dir = std::env::temp_dir().join("mv1-heat");
    std::fs::create_dir_all(&dir)?;
    let channel = Channel::open_with_options("x, t; u", Mv1Options::new().with_dir(&dir))?;

    let n = 51;
    let dx = 1.0 / (n - 1) as f64;
    let dt = 0.4 * dx * dx;
    let mut rod = Rod {
        dx,
        u: (0..n)
            .map(|i| (std::f64::consts::PI * i as f64 * dx).sin())
            .collect(),
    };

    channel.write_metadata(&[0.0, 1.0, 0.0, 1.0])?;

    let mut t = 0.0;
    for step in 0..=1000u64 {
        if step % 250 == 0 {
            channel.write_snapshot(&rod, step / 250, t)?;
        }
        let prev = rod.u.clone();
        for i in 1..n - 1 {
            rod.u[i] = prev[i] + dt / (dx * dx) * (prev[i - 1] - 2.0 * prev[i] + prev[i + 1]);
        }
        t += dt;
    }

    println!("wrote {} files to {}", channel.handle(), dir.display());
    Ok(())
}
