use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use permeafig::config::SOURCE_DATA_DIR;
use permeafig::report::{LOGP_FILE, MOLECULES_FILE};

/// (type code, display name with `\n` markers, molecular weight)
const MOLECULES: [(&str, &str, f64); 13] = [
    ("nh3", "Ammonia", 17.03),
    ("h2o", "Water", 18.02),
    ("ch3f", "Fluoro-\\nmethane", 34.03),
    ("co2", "Carbon\\ndioxide", 44.01),
    ("c3h8", "Propane", 44.10),
    ("c2h6o", "Ethanol", 46.07),
    ("ch4n2o", "Urea", 60.06),
    ("c3h8o", "Iso-\\npropanol", 60.10),
    ("c2h5no2", "Glycine", 75.07),
    ("c6h6o", "Phenol", 94.11),
    ("c7h6o2", "Benzoic\\nacid", 122.12),
    ("c9h6o2", "Coumarin", 146.14),
    ("c8h9no2", "Paracetamol", 151.16),
];

const HBOND_SUBCLASSES: [&str; 3] = ["totals", "lipids", "waters"];

/// Positions span the whole bilayer so the non-negative filter has work
/// to do.
const POSITION_COUNT: usize = 55;

fn position(i: usize) -> f64 {
    -2.7 + 0.1 * i as f64
}

fn main() -> Result<()> {
    env_logger::init();

    let root = std::env::current_dir()?.join(SOURCE_DATA_DIR);
    let mut rng = SimpleRng::new(42);

    write_molecules(&root)?;

    for (idx, &(code, _, _)) in MOLECULES.iter().enumerate() {
        let depth = -4.0 + idx as f64 * 0.7;
        write_profile(
            &root.join("pmf").join(summary_name("pmf", code)),
            &mut rng,
            |z| depth * (-(z / 0.9).powi(2)).exp(),
            0.12,
        )?;
        write_profile(
            &root.join("diffusion").join(summary_name("diffusion", code)),
            &mut rng,
            |z| 0.6 + 1.8 * (1.0 - (-(z / 1.3).powi(2)).exp()),
            0.05,
        )?;
        write_profile(
            &root.join("resistance").join(summary_name("resistance", code)),
            &mut rng,
            |z| 10f64.powf((2.0 + 0.2 * idx as f64) * (-(z / 0.8).powi(2)).exp() - 1.0),
            0.02,
        )?;

        for subclass in HBOND_SUBCLASSES {
            let name = format!("ba-Summary--hbonds--{subclass}--vmd--{code}.dat");
            let waters = |z: f64| 1.4 / (1.0 + (-(z.abs() - 1.5) * 4.0).exp());
            let lipids = |z: f64| 1.2 * (-((z.abs() - 1.1) / 0.35).powi(2)).exp();
            write_profile(
                &root.join("hbonds").join(subclass).join(name),
                &mut rng,
                |z| match subclass {
                    "waters" => waters(z),
                    "lipids" => lipids(z),
                    _ => (waters(z) + lipids(z)).min(1.55),
                },
                0.04,
            )?;
        }
    }

    write_logp(&root, &mut rng)?;

    info!("sample data written to {}", root.display());
    println!(
        "Wrote {} molecules x 4 metrics ({POSITION_COUNT} positions each) under {}",
        MOLECULES.len(),
        root.display()
    );
    Ok(())
}

fn summary_name(metric: &str, code: &str) -> String {
    format!("ba-Summary--{metric}--{code}.dat")
}

fn write_molecules(root: &Path) -> Result<()> {
    fs::create_dir_all(root)?;
    let path = root.join(MOLECULES_FILE);
    let file = fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# Type,Name,MolWeight")?;
    // Written heaviest-first; the loader owns the weight ordering.
    let mut order: Vec<usize> = (0..MOLECULES.len()).collect();
    order.reverse();
    for idx in order {
        let (code, name, weight) = MOLECULES[idx];
        writeln!(out, "{code},{name},{weight}")?;
    }
    Ok(())
}

/// One tab-separated positional summary: the DOPC profile follows
/// `mean_at`, the mixed membrane tracks it at 92% with its own noise.
fn write_profile(
    path: &Path,
    rng: &mut SimpleRng,
    mean_at: impl Fn(f64) -> f64,
    noise: f64,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# position\tDOPC_mean\tDOPC_se\tMIX_mean\tMIX_se")?;
    for i in 0..POSITION_COUNT {
        let z = position(i);
        let dopc = mean_at(z) + rng.gauss(0.0, noise);
        let mix = mean_at(z) * 0.92 + rng.gauss(0.0, noise);
        let dopc_se = noise + rng.gauss(0.0, noise * 0.3).abs();
        let mix_se = noise + rng.gauss(0.0, noise * 0.3).abs();
        writeln!(out, "{z:.2}\t{dopc:.5}\t{dopc_se:.5}\t{mix:.5}\t{mix_se:.5}")?;
    }
    Ok(())
}

fn write_logp(root: &Path, rng: &mut SimpleRng) -> Result<()> {
    let path = root.join(LOGP_FILE);
    let file = fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# molecule\tDOPC_mean\tDOPC_se\tMIX_mean\tMIX_se")?;
    for (idx, &(code, _, _)) in MOLECULES.iter().enumerate() {
        let dopc = -6.4 + idx as f64 * 0.62 + rng.gauss(0.0, 0.15);
        let mix = dopc + rng.gauss(0.0, 0.4);
        let dopc_se = 0.15 + rng.gauss(0.0, 0.05).abs();
        let mix_se = 0.15 + rng.gauss(0.0, 0.05).abs();
        writeln!(out, "{code}\t{dopc:.4}\t{dopc_se:.4}\t{mix:.4}\t{mix_se:.4}")?;
    }
    Ok(())
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
