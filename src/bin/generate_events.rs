//! Synthetic event file for exercising the analyzer without a full
//! event-generator run: antinucleons are drawn around a shared jet axis and
//! passed through the coalescence rule.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use antinuclei_spectra::coalescence::{
    find_clusters, Antinucleon, Cluster, EventWriter, FinalState, FourMomentum, DEFAULT_P_COAL,
};

const M_NUCLEON: f64 = 0.938;
const CMS_MASSES: [f64; 5] = [2.0, 20.0, 200.0, 2000.0, 20000.0];

#[derive(Parser)]
#[command(name = "generate-events")]
#[command(about = "Write a synthetic antinucleus event file")]
struct Args {
    /// Event file to write
    output: PathBuf,

    /// Events simulated per CMS mass
    #[arg(long, default_value = "100000")]
    events: u64,

    /// PRNG seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Coalescence momentum (GeV)
    #[arg(long, default_value_t = DEFAULT_P_COAL)]
    p_coal: f64,

    /// Also write every antiproton/antineutron as an A=1 row
    #[arg(long)]
    with_singles: bool,
}

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
}

/// Antinucleons of one event, clustered around a random jet axis whose
/// momentum scales with the available energy.
fn simulate_event(rng: &mut SimpleRng, cms: f64) -> Vec<FinalState> {
    // Rare multi-antinucleon events; most events yield none.
    let n = match rng.next_f64() {
        u if u < 0.90 => 0,
        u if u < 0.97 => 1,
        u if u < 0.995 => 2,
        u if u < 0.999 => 3,
        _ => 4,
    };
    if n == 0 {
        return Vec::new();
    }

    let jet_p = rng.next_f64() * cms / 4.0;
    let axis = [rng.gauss(0.0, 1.0), rng.gauss(0.0, 1.0), rng.gauss(0.0, 1.0)];
    let norm = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2])
        .sqrt()
        .max(1e-12);
    let spread = 0.05 + 0.02 * cms.ln_1p();

    (0..n)
        .map(|_| {
            let kind = if rng.next_f64() < 0.5 {
                Antinucleon::Antiproton
            } else {
                Antinucleon::Antineutron
            };
            let share = jet_p / n as f64;
            let px = axis[0] / norm * share + rng.gauss(0.0, spread);
            let py = axis[1] / norm * share + rng.gauss(0.0, spread);
            let pz = axis[2] / norm * share + rng.gauss(0.0, spread);
            FinalState {
                kind,
                momentum: FourMomentum::on_shell(px, py, pz, M_NUCLEON),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = EventWriter::new(BufWriter::new(file));
    let mut rng = SimpleRng::new(args.seed);

    for &cms in &CMS_MASSES {
        let before = writer.rows();
        for _ in 0..args.events {
            let particles = simulate_event(&mut rng, cms);
            if args.with_singles {
                for p in &particles {
                    writer
                        .write_cluster(cms, &Cluster::from_members(&[p]))
                        .context("writing event row")?;
                }
            }
            for cluster in find_clusters(&particles, args.p_coal) {
                writer
                    .write_cluster(cms, &cluster)
                    .context("writing event row")?;
            }
        }
        log::info!("CMS {cms} GeV: {} rows", writer.rows() - before);
    }

    // Every CMS mass ran the same number of events, so one count normalises
    // each mass group.
    let rows = writer.rows();
    writer.finish(args.events).context("writing RUNDETAILS")?;

    println!(
        "Wrote {rows} rows for {} CMS masses to {}",
        CMS_MASSES.len(),
        args.output.display()
    );
    Ok(())
}
