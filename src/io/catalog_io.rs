//! On-disk catalog container (spec §6): `gzip(serde_pickle(SerializedCatalog))`,
//! mirroring the teacher's `CawlrIO` save/load shape but wrapping the file
//! handle in flate2's reader/writer instead of writing raw bytes.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use flate2::{read::MultiGzDecoder, write::GzEncoder, Compression};

use crate::catalog::{Catalog, SerializedCatalog};

pub fn save_catalog<P: AsRef<Path>>(catalog: &Catalog, path: P) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let serialized = SerializedCatalog::from(catalog);
    serde_pickle::to_writer(&mut encoder, &serialized, Default::default())?;
    encoder.finish()?;
    Ok(())
}

/// Loads a catalog container, recompiling every entry. Entries whose
/// definition fails to parse are reported rather than causing the whole
/// load to fail (same contract as `SerializedCatalog::into_catalog`).
pub fn load_catalog<P: AsRef<Path>>(
    path: P,
) -> anyhow::Result<(Catalog, Vec<(String, crate::error::DefinitionError)>)> {
    let file = File::open(path)?;
    let decoder = MultiGzDecoder::new(BufReader::new(file));
    let serialized: SerializedCatalog = serde_pickle::from_reader(decoder, Default::default())?;
    Ok(serialized.into_catalog())
}
