//! Antinucleon coalescence: which final-state antiprotons and antineutrons
//! bind into light antinuclei, and how they are written as event rows.

use std::io::{self, Write};
use std::ops::{Add, AddAssign};

use crate::data::loader::SENTINEL;

/// Coalescence momentum in GeV.
pub const DEFAULT_P_COAL: f64 = 0.160;

/// Largest cluster considered (antihelium-4).
pub const MAX_CLUSTER: usize = 4;

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourMomentum {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        FourMomentum { px, py, pz, e }
    }

    /// On-shell momentum for a particle of mass `m`.
    pub fn on_shell(px: f64, py: f64, pz: f64, m: f64) -> Self {
        let e = (px * px + py * py + pz * pz + m * m).sqrt();
        FourMomentum { px, py, pz, e }
    }

    /// Euclidean distance between the 3-momenta.
    pub fn distance3(&self, other: &FourMomentum) -> f64 {
        let dx = self.px - other.px;
        let dy = self.py - other.py;
        let dz = self.pz - other.pz;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn scale3(self, f: f64) -> Self {
        FourMomentum {
            px: self.px * f,
            py: self.py * f,
            pz: self.pz * f,
            e: self.e,
        }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, o: FourMomentum) -> FourMomentum {
        FourMomentum {
            px: self.px + o.px,
            py: self.py + o.py,
            pz: self.pz + o.pz,
            e: self.e + o.e,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, o: FourMomentum) {
        *self = *self + o;
    }
}

// ---------------------------------------------------------------------------
// Coalescence rule
// ---------------------------------------------------------------------------

/// True when every momentum lies within `p_coal / 2` of the 3-momentum
/// centroid.
pub fn coalesces(momenta: &[FourMomentum], p_coal: f64) -> bool {
    if momenta.is_empty() {
        return false;
    }
    let sum = momenta
        .iter()
        .fold(FourMomentum::default(), |acc, &p| acc + p);
    let centroid = sum.scale3(1.0 / momenta.len() as f64);
    momenta
        .iter()
        .all(|p| centroid.distance3(p) <= p_coal / 2.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antinucleon {
    Antiproton,
    Antineutron,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalState {
    pub kind: Antinucleon,
    pub momentum: FourMomentum,
}

/// A bound cluster, ready to be written as `cms A Z E`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub mass_number: u32,
    pub charge: u32,
    /// Total energy of the constituents.
    pub energy: f64,
}

impl Cluster {
    pub fn from_members(members: &[&FinalState]) -> Self {
        let mut total = FourMomentum::default();
        let mut charge = 0;
        for m in members {
            total += m.momentum;
            if m.kind == Antinucleon::Antiproton {
                charge += 1;
            }
        }
        Cluster {
            mass_number: members.len() as u32,
            charge,
            energy: total.e,
        }
    }
}

/// Every coalescing pair, and for each pair every coalescing triple and
/// quadruple built from later particles. Larger clusters are only tried on
/// top of a pair (or triple) that already coalesced.
pub fn find_clusters(particles: &[FinalState], p_coal: f64) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut members: Vec<&FinalState> = Vec::with_capacity(MAX_CLUSTER);
    for (i, p) in particles.iter().enumerate() {
        members.push(p);
        extend_cluster(particles, i + 1, p_coal, &mut members, &mut clusters);
        members.pop();
    }
    clusters
}

fn extend_cluster<'a>(
    particles: &'a [FinalState],
    start: usize,
    p_coal: f64,
    members: &mut Vec<&'a FinalState>,
    clusters: &mut Vec<Cluster>,
) {
    if members.len() == MAX_CLUSTER {
        return;
    }
    for (next, p) in particles.iter().enumerate().skip(start) {
        members.push(p);
        let momenta: Vec<FourMomentum> = members.iter().map(|m| m.momentum).collect();
        if coalesces(&momenta, p_coal) {
            clusters.push(Cluster::from_members(members));
            extend_cluster(particles, next + 1, p_coal, members, clusters);
        }
        members.pop();
    }
}

// ---------------------------------------------------------------------------
// Event-file writer
// ---------------------------------------------------------------------------

/// Writes clusters in the analyzer's input format.
pub struct EventWriter<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> EventWriter<W> {
    pub fn new(out: W) -> Self {
        EventWriter { out, rows: 0 }
    }

    pub fn write_cluster(&mut self, cms_mass: f64, cluster: &Cluster) -> io::Result<()> {
        self.rows += 1;
        writeln!(
            self.out,
            "{} {} {} {}",
            cms_mass, cluster.mass_number, cluster.charge, cluster.energy
        )
    }

    /// Append the run summary and hand back the sink.
    pub fn finish(mut self, events: u64) -> io::Result<W> {
        writeln!(self.out, "{SENTINEL} events {events}")?;
        self.out.flush()?;
        Ok(self.out)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}
