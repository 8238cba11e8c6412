//! KO-list input (spec §6): either one KO per line, or a headerless
//! `genome_id`, `ko` table, auto-detected by column count. gzip-transparent.

use std::{
    collections::{HashMap, HashSet},
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{io::tsv::open_maybe_gzip, ko::Ko};

#[derive(Debug, Clone)]
pub enum KoListInput {
    /// One KO per line: a single, unnamed genome.
    SingleGenome(HashSet<Ko>),
    /// `genome_id \t ko` rows: possibly many genomes.
    MultiGenome(HashMap<String, HashSet<Ko>>),
}

impl KoListInput {
    /// Normalizes to a genome-keyed map, using `default_name` for the
    /// single-genome case (spec §6's CLI `--name` option).
    pub fn into_genomes(self, default_name: &str) -> HashMap<String, HashSet<Ko>> {
        match self {
            KoListInput::SingleGenome(kos) => {
                let mut map = HashMap::new();
                map.insert(default_name.to_string(), kos);
                map
            }
            KoListInput::MultiGenome(map) => map,
        }
    }
}

pub fn read_ko_list<P: AsRef<Path>>(path: P) -> anyhow::Result<KoListInput> {
    let reader = open_maybe_gzip(path)?;
    let mut lines = BufReader::new(reader).lines();

    let mut single = HashSet::new();
    let mut multi: HashMap<String, HashSet<Ko>> = HashMap::new();
    let mut is_multi: Option<bool> = None;

    while let Some(line) = lines.next() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        let multi_row = cols.len() >= 2;
        let is_multi = *is_multi.get_or_insert(multi_row);

        if is_multi {
            let genome = cols[0].to_string();
            let ko: Ko = cols[1].parse()?;
            multi.entry(genome).or_default().insert(ko);
        } else {
            let ko: Ko = cols[0].parse()?;
            single.insert(ko);
        }
    }

    if is_multi.unwrap_or(false) {
        Ok(KoListInput::MultiGenome(multi))
    } else {
        Ok(KoListInput::SingleGenome(single))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_column_is_one_genome() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "K00001\nK00002").unwrap();
        let input = read_ko_list(f.path()).unwrap();
        match input {
            KoListInput::SingleGenome(set) => assert_eq!(set.len(), 2),
            _ => panic!("expected single genome"),
        }
    }

    #[test]
    fn two_columns_is_multi_genome() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "genomeA\tK00001\ngenomeA\tK00002\ngenomeB\tK00001").unwrap();
        let input = read_ko_list(f.path()).unwrap();
        match input {
            KoListInput::MultiGenome(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map["genomeA"].len(), 2);
                assert_eq!(map["genomeB"].len(), 1);
            }
            _ => panic!("expected multi genome"),
        }
    }
}
