use indoc::eprintdoc;
use needletail::{parse_fastx_file, parse_fastx_stdin, FastxReader};
use std::io::{stdout, BufWriter, Write};
use std::fs::File;
use thiserror::Error;

use crate::config::Config;
use crate::kmer::KmerSet;
use crate::quality::build_quality_vector;
use crate::read::Read;
use crate::scorer::{mean_length, score_from_quality_vector};
use crate::selector::{apply_thresholds, select};
use crate::trim::{split_range, trim_range};
use crate::utils::{comma, CompressionExt};

/// Errors raised while ingesting, processing or emitting reads. Distinct
/// from [`crate::config::ConfigError`], which only covers configuration
/// values themselves.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Error: cannot find file {0}")]
    FileNotFound(String),

    #[error("Error: failed to parse {0}")]
    ParseError(String),

    #[error("Error: incorrect FASTQ format for read {0}")]
    MalformedFastq(String),

    #[error("Error: FASTA input not supported without an external reference")]
    FastaWithoutReference,

    #[error("Error: failed to write output")]
    WriteError(#[from] std::io::Error),
}

/// Summary counters reported to stderr during a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub target_bases: Option<u64>,
    pub kept_bases: u64,
    pub not_enough: bool,
    pub trimmed: Option<(usize, u64)>,
    pub split: Option<(usize, u64)>,
    pub dropped_by_trim: usize,
}

/// Orchestrates the whole pipeline: ingest, reference-aware scoring,
/// optional trim/split, selection and emission.
///
/// Runs as a single buffered pass: all reads are parsed into owned
/// [`Read`] values up front, since `needletail`'s reader already hands
/// back one owned record at a time and there is no byte-offset re-read
/// path for a second pass over compressed/stdin input.
pub struct Engine<'a> {
    config: &'a Config,
    reference: Option<&'a KmerSet>,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a Config, reference: Option<&'a KmerSet>) -> Self {
        Engine { config, reference }
    }

    pub fn run(&self) -> Result<RunReport, EngineError> {
        let raw_reads = self.ingest()?;
        let input_reads = raw_reads.len();
        let input_bases: u64 = raw_reads.iter().map(|r| r.length() as u64).sum();

        let has_qualities = raw_reads.iter().any(|r| r.qualities.is_some());
        if !has_qualities && !raw_reads.is_empty() && self.reference.is_none() {
            return Err(EngineError::FastaWithoutReference);
        }

        let mean_len = mean_length(&raw_reads);

        let (flattened, dropped_by_trim, trimmed, split) =
            self.trim_and_split(raw_reads, mean_len);

        let mut reads = flattened;
        apply_thresholds(&mut reads, self.config);
        let selection = select(&reads, self.config);

        if let Some(target) = selection.budget {
            eprintln!("target: {} bp", comma(target));
        }
        if selection.not_enough {
            eprintln!("not enough reads to reach target");
        } else if selection.budget.is_some() {
            eprintln!("keeping {} bp", comma(selection.kept_bases));
        }

        self.emit(&reads, &selection.kept)?;

        if self.config.verbose > 0 {
            eprintdoc! {"
                nq-filter summary
                =================

                Reads in:     {input_reads} ({input_bases} bp)
                Reads kept:   {kept_reads} ({kept_bases} bp)
                Dropped by trim: {dropped_by_trim}
                ",
                input_reads = input_reads,
                input_bases = comma(input_bases),
                kept_reads = selection.kept.len(),
                kept_bases = comma(selection.kept_bases),
                dropped_by_trim = dropped_by_trim,
            }
        }

        Ok(RunReport {
            target_bases: selection.budget,
            kept_bases: selection.kept_bases,
            not_enough: selection.not_enough,
            trimmed,
            split,
            dropped_by_trim,
        })
    }

    fn ingest(&self) -> Result<Vec<Read>, EngineError> {
        let mut reads = Vec::new();
        let mut order = 0usize;

        if self.config.inputs.is_empty() {
            let reader = parse_fastx_stdin().map_err(|e| EngineError::ParseError(e.to_string()))?;
            self.ingest_reader(reader, &mut reads, &mut order)?;
        } else {
            for path in &self.config.inputs {
                let reader = parse_fastx_file(path)
                    .map_err(|_| EngineError::FileNotFound(path.display().to_string()))?;
                self.ingest_reader(reader, &mut reads, &mut order)?;
            }
        }
        Ok(reads)
    }

    fn ingest_reader(
        &self,
        mut reader: Box<dyn FastxReader>,
        reads: &mut Vec<Read>,
        order: &mut usize,
    ) -> Result<(), EngineError> {
        while let Some(record) = reader.next() {
            let rec = record.map_err(|e| EngineError::ParseError(e.to_string()))?;
            let header = String::from_utf8_lossy(rec.id()).into_owned();
            let sequence = rec.seq().into_owned();
            let qualities = rec.qual().map(|q| q.to_vec());

            if let Some(q) = &qualities {
                if q.len() != sequence.len() {
                    let name = header.split_whitespace().next().unwrap_or("").to_string();
                    return Err(EngineError::MalformedFastq(name));
                }
            }

            reads.push(Read::new(*order, header, sequence, qualities));
            *order += 1;
        }
        Ok(())
    }

    /// Trim and/or split every read, re-scoring each surviving sub-range
    /// against its own quality slice. Returns the flattened, scored reads
    /// (in output order), how many reads trim dropped entirely, and the
    /// post-trim / post-split `(count, bases)` pairs used for progress
    /// reporting.
    #[allow(clippy::type_complexity)]
    fn trim_and_split(
        &self,
        raw_reads: Vec<Read>,
        mean_len: f64,
    ) -> (Vec<Read>, usize, Option<(usize, u64)>, Option<(usize, u64)>) {
        let trimming = self.config.trim;
        let splitting = self.config.split;

        if !trimming && splitting.is_none() {
            let mut flattened = Vec::with_capacity(raw_reads.len());
            for read in raw_reads {
                flattened.push(self.score_whole(read, mean_len));
            }
            return (flattened, 0, None, None);
        }

        let window = self.config.window_size as usize;
        let min_length = self.config.min_length.map(|v| v as usize);

        let mut dropped_by_trim = 0usize;
        let mut post_trim_reads = 0usize;
        let mut post_trim_bases = 0u64;
        let mut flattened = Vec::new();
        let mut order = 0usize;

        for parent in raw_reads {
            let quality = build_quality_vector(
                &parent.sequence,
                parent.qualities.as_deref(),
                self.reference,
            );
            let length = parent.length();

            let range = if trimming {
                match trim_range(&quality, window, min_length) {
                    Some(r) => r,
                    None => {
                        dropped_by_trim += 1;
                        continue;
                    }
                }
            } else {
                (0, length)
            };

            if trimming {
                post_trim_reads += 1;
                post_trim_bases += (range.1 - range.0) as u64;
            }

            let ranges = match splitting {
                Some(n) => split_range(&quality, range, window, n as usize),
                None => vec![range],
            };

            let renamed = ranges.len() > 1 || range != (0, length);

            for (start, end) in ranges {
                let sub_seq = parent.sequence[start..end].to_vec();
                let sub_qual = parent.qualities.as_ref().map(|q| q[start..end].to_vec());
                let header = if renamed {
                    format!("{}_{}-{}", parent.name, start + 1, end)
                } else {
                    parent.header.clone()
                };

                let mut sub_read = Read::new(order, header, sub_seq, sub_qual);
                sub_read.scoring =
                    score_from_quality_vector(&quality[start..end], end - start, self.config, mean_len);
                flattened.push(sub_read);
                order += 1;
            }
        }

        let trimmed = trimming.then(|| (post_trim_reads, post_trim_bases));
        let split = splitting.map(|_| {
            let bases: u64 = flattened.iter().map(|r| r.length() as u64).sum();
            (flattened.len(), bases)
        });

        if let Some((n, bp)) = trimmed {
            eprintln!("after trimming: {} reads ({} bp)", comma(n as u64), comma(bp));
        }
        if let Some((n, bp)) = split {
            eprintln!("after splitting: {} reads ({} bp)", comma(n as u64), comma(bp));
        }

        (flattened, dropped_by_trim, trimmed, split)
    }

    fn score_whole(&self, mut read: Read, mean_len: f64) -> Read {
        let quality = build_quality_vector(&read.sequence, read.qualities.as_deref(), self.reference);
        read.scoring = score_from_quality_vector(&quality, read.length(), self.config, mean_len);
        read
    }

    fn emit(&self, reads: &[Read], kept: &[usize]) -> Result<(), EngineError> {
        let mut writer = self.build_writer()?;
        for &idx in kept {
            let read = &reads[idx];
            match &read.qualities {
                Some(q) => {
                    writeln!(writer, "@{}", read.header)?;
                    writer.write_all(&read.sequence)?;
                    writeln!(writer)?;
                    writeln!(writer, "+")?;
                    writer.write_all(q)?;
                    writeln!(writer)?;
                }
                None => {
                    writeln!(writer, ">{}", read.header)?;
                    writer.write_all(&read.sequence)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }

    fn build_writer(&self) -> Result<Box<dyn Write>, EngineError> {
        let writer = match &self.config.output {
            None => match self.config.output_type {
                None => Box::new(stdout()) as Box<dyn Write>,
                Some(fmt) => niffler::basic::get_writer(Box::new(stdout()), fmt, self.config.compress_level)
                    .map_err(|e| EngineError::ParseError(e.to_string()))?,
            },
            Some(path) => {
                let file = File::create(path).map_err(EngineError::WriteError)?;
                let handle = Box::new(BufWriter::new(file));
                let fmt = match self.config.output_type {
                    None => niffler::Format::from_path(path),
                    Some(f) => f,
                };
                niffler::get_writer(handle, fmt, self.config.compress_level)
                    .map_err(|e| EngineError::ParseError(e.to_string()))?
            }
        };
        Ok(writer)
    }
}
