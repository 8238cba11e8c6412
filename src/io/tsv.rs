//! Shared helpers for the headerless, tab-separated inputs of spec §6
//! (pathway definitions/names/classes, KO lists). gzip-transparent by
//! extension or magic bytes, following the teacher's `csv::ReaderBuilder`
//! usage in `collapse.rs`.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use flate2::read::MultiGzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Opens `path`, transparently unwrapping gzip if the extension is `.gz` or
/// the file starts with the gzip magic bytes.
pub fn open_maybe_gzip<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn Read>> {
    let path = path.as_ref();
    let mut file = BufReader::new(File::open(path)?);

    let looks_gz = path.extension().and_then(|e| e.to_str()) == Some("gz") || {
        let mut magic = [0u8; 2];
        let peeked = peek(&mut file, &mut magic)?;
        peeked == GZIP_MAGIC.len() && magic == GZIP_MAGIC
    };

    if looks_gz {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

fn peek<R: Read>(reader: &mut BufReader<R>, buf: &mut [u8]) -> std::io::Result<usize> {
    use std::io::BufRead;
    let available = reader.fill_buf()?;
    let n = available.len().min(buf.len());
    buf[..n].copy_from_slice(&available[..n]);
    Ok(n)
}

/// Builds a headerless tab-delimited reader over already-open bytes.
pub fn tab_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Reads a headerless two-column TSV (`id`, `value`) file, gzip-transparent.
pub fn read_two_column_map<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<(String, String)>> {
    let reader = open_maybe_gzip(path)?;
    let mut rdr = tab_reader(reader);
    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        out.push((record[0].to_string(), record[1].to_string()));
    }
    Ok(out)
}
