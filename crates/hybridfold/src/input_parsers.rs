use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Cursor};
use std::path::Path;

use anyhow::{anyhow, Result};
use paste::paste;

use hf_structure::RnaSequence;

/// Reads one FASTA-like `>header` / sequence block from `lines`, if any
/// remain. Blank lines separate blocks; a record with no header is
/// allowed (header is then `None`).
fn read_one_record<I: Iterator<Item = std::io::Result<String>>>(lines: &mut I) -> Result<Option<(Option<String>, String)>> {
    let mut header = None;
    let mut seq: Option<String> = None;
    for line in lines.by_ref() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            if seq.is_some() {
                break;
            }
            continue;
        }
        if let Some(h) = line.strip_prefix('>') {
            if seq.is_some() {
                // a new header starts the *next* record; this path is
                // unreachable because we break as soon as seq is filled
                // and a blank line intervenes, but guard anyway.
                return Err(anyhow!("unexpected header '>{}' before blank line", h));
            }
            header = Some(line.to_string());
        } else if seq.is_none() {
            seq = Some(line.split_whitespace().next().unwrap_or("").to_string());
        } else {
            return Err(anyhow!("unexpected extra sequence line '{}'", line));
        }
    }
    match seq {
        Some(s) => Ok(Some((header, s))),
        None => Ok(None),
    }
}

/// Reads exactly two records (query then target) from a FASTA-like
/// stream: an optional `>id` header line followed by one sequence line,
/// blank-line separated. Mirrors the teacher's `read_fasta_like`/`read_eval`
/// shape, generalized from one sequence to the query/target pair this
/// crate's predictors need.
pub fn read_two_sequences<R: BufRead>(reader: R) -> Result<(RnaSequence, RnaSequence)> {
    let mut lines = reader.lines();
    let (h1, s1) = read_one_record(&mut lines)?.ok_or_else(|| anyhow!("missing query sequence"))?;
    let (h2, s2) = read_one_record(&mut lines)?.ok_or_else(|| anyhow!("missing target sequence"))?;

    let id1 = h1.map(|h| h.trim_start_matches('>').to_string()).unwrap_or_else(|| "query".to_string());
    let id2 = h2.map(|h| h.trim_start_matches('>').to_string()).unwrap_or_else(|| "target".to_string());

    let seq1 = RnaSequence::new(id1, &s1)?;
    let seq2 = RnaSequence::new(id2, &s2)?;
    Ok((seq1, seq2))
}

macro_rules! define_input_variants {
    ($base:ident, $ret:ty) => {
        paste! {
            /// Read from a string buffer.
            pub fn [<$base _string>](s: &str) -> $ret {
                $base(Cursor::new(s))
            }

            /// Read from a file path.
            pub fn [<$base _file>]<P: AsRef<Path>>(path: P) -> $ret {
                let reader = BufReader::new(File::open(path)?);
                $base(reader)
            }

            /// Read from stdin.
            pub fn [<$base _stdin>]() -> $ret {
                let reader = BufReader::new(stdin());
                $base(reader)
            }

            /// Read either from stdin ("-") or a file path.
            pub fn [<$base _input>](s: &str) -> $ret {
                if s == "-" {
                    [<$base _stdin>]()
                } else {
                    [<$base _file>](s)
                }
            }
        }
    };
}

type TwoSeqResult = Result<(RnaSequence, RnaSequence)>;

define_input_variants!(read_two_sequences, TwoSeqResult);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_query_and_target_with_headers() {
        let input = ">q\nGGGCCC\n\n>t\nGGGCCC\n";
        let (s1, s2) = read_two_sequences_string(input).unwrap();
        assert_eq!(s1.id(), "q");
        assert_eq!(s2.id(), "t");
        assert_eq!(s1.size(), 6);
    }

    #[test]
    fn reads_without_headers() {
        let input = "GGGCCC\nAAAUUU\n";
        let (s1, s2) = read_two_sequences_string(input).unwrap();
        assert_eq!(s1.id(), "query");
        assert_eq!(s2.id(), "target");
    }

    #[test]
    fn missing_target_is_an_error() {
        let input = ">q\nGGGCCC\n";
        assert!(read_two_sequences_string(input).is_err());
    }
}
