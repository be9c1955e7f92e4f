use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{EventDataset, EventRow, MassKey, Species};

// ---------------------------------------------------------------------------
// Entry weighting
// ---------------------------------------------------------------------------

/// How much each row contributes to its histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    /// Every row counts once.
    #[default]
    Unit,
    /// Five-field rows count with their coalescence probability, four-field
    /// rows count once.
    CoalescenceProbability,
}

impl Weighting {
    pub fn weight_of(self, row: &EventRow) -> f64 {
        match self {
            Weighting::Unit => 1.0,
            Weighting::CoalescenceProbability => row.coalescence_probability().unwrap_or(1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Mass groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub energy: f64,
    pub weight: f64,
}

/// All rows sharing one CMS mass, split by species.
#[derive(Debug, Clone, PartialEq)]
pub struct MassGroup {
    pub key: MassKey,
    /// Every species has an entry, possibly empty.
    pub species: BTreeMap<Species, Vec<Sample>>,
    /// Rows in this group whose (A, Z) matches no species.
    pub unclassified: usize,
}

impl MassGroup {
    fn new(key: MassKey) -> Self {
        MassGroup {
            key,
            species: Species::ALL.iter().map(|&s| (s, Vec::new())).collect(),
            unclassified: 0,
        }
    }

    pub fn samples(&self, species: Species) -> &[Sample] {
        self.species.get(&species).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, species: Species) -> usize {
        self.samples(species).len()
    }
}

/// Partition the dataset by CMS mass, then by species. Keys come back sorted.
pub fn group_by_mass(dataset: &EventDataset, weighting: Weighting) -> BTreeMap<MassKey, MassGroup> {
    let mut groups: BTreeMap<MassKey, MassGroup> = BTreeMap::new();

    for row in &dataset.rows {
        let record = row.record();
        let key = record.mass_key();
        let group = groups.entry(key).or_insert_with(|| MassGroup::new(key));

        match record.species() {
            Some(species) => group.species.entry(species).or_default().push(Sample {
                energy: record.energy,
                weight: weighting.weight_of(row),
            }),
            None => group.unclassified += 1,
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_str, LoadOptions};

    #[test]
    fn groups_match_distinct_masses() {
        let text = "20 2 1 1\n10 2 1 5\n20 1 0 3\n10 3 2 2\n2000 4 2 9\n";
        let ds = parse_str(text, LoadOptions::default()).unwrap();
        let groups = group_by_mass(&ds, Weighting::Unit);
        let keys: Vec<_> = groups.keys().copied().collect();
        let distinct: Vec<_> = ds.mass_keys().into_iter().collect();
        assert_eq!(keys, distinct);
        assert_eq!(
            keys.iter().map(|k| k.cms_mass()).collect::<Vec<_>>(),
            vec![10.0, 20.0, 2000.0]
        );
    }

    #[test]
    fn each_row_lands_in_at_most_one_species() {
        let text = "10 2 1 5\n10 2 1 7\n10 3 2 2\n10 2 2 4\n10 5 3 1\n";
        let ds = parse_str(text, LoadOptions::default()).unwrap();
        let groups = group_by_mass(&ds, Weighting::Unit);
        let g = &groups[&MassKey::from_cms(10.0)];
        assert_eq!(g.count(Species::Antideuteron), 2);
        assert_eq!(g.count(Species::Antihelium3), 1);
        assert_eq!(g.unclassified, 2);
        let classified: usize = Species::ALL.iter().map(|&s| g.count(s)).sum();
        assert_eq!(classified + g.unclassified, ds.len());
    }

    #[test]
    fn coalescence_weighting() {
        let text = "10 2 1 5 0.5\n10 2 1 6\n";
        let ds = parse_str(text, LoadOptions::default()).unwrap();
        let groups = group_by_mass(&ds, Weighting::CoalescenceProbability);
        let weights: Vec<f64> = groups[&MassKey::from_cms(10.0)]
            .samples(Species::Antideuteron)
            .iter()
            .map(|s| s.weight)
            .collect();
        assert_eq!(weights, vec![0.5, 1.0]);
    }
}
