use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rangebins::IntervalIndex;

extern crate fnv;
use fnv::FnvHashMap;

extern crate clap;
use clap::{Arg, ArgAction, Command};

use log::{debug, info};

// BED is already 0-based and half-open, so bounds go into the index as-is.
type SeqIndex = IntervalIndex<(i32, i32)>;

fn parse_bed_line(line: &str) -> Result<(&str, i32, i32)> {
    let mut fields = line.split('\t');
    let seqname = fields.next().unwrap_or("");
    let (start, stop) = match (fields.next(), fields.next()) {
        (Some(start), Some(stop)) => (start, stop),
        _ => bail!("expected at least three tab-separated fields"),
    };
    let start: i32 = start.trim().parse().with_context(|| format!("bad start {:?}", start))?;
    let stop: i32 = stop.trim().parse().with_context(|| format!("bad end {:?}", stop))?;
    Ok((seqname, start, stop))
}

// Headers and comments carry no intervals.
fn is_data_line(line: &str) -> bool {
    !(line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser"))
}

// Read a bed file into one index per sequence name
fn read_bed_file(path: &str) -> Result<FnvHashMap<String, SeqIndex>> {
    let mut ranges = FnvHashMap::<String, Vec<(i32, i32)>>::default();

    let now = Instant::now();

    let file = File::open(path).with_context(|| format!("opening {}", path))?;
    let rdr = BufReader::new(file);
    let mut line_count = 0;
    for (lineno, line) in rdr.lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path))?;
        let line = line.trim_end();
        if !is_data_line(line) {
            continue;
        }

        let (seqname, start, stop) =
            parse_bed_line(line).with_context(|| format!("{}:{}", path, lineno + 1))?;

        if let Some(seq_ranges) = ranges.get_mut(seqname) {
            seq_ranges.push((start, stop));
        } else {
            ranges.insert(seqname.to_string(), vec![(start, stop)]);
        }

        line_count += 1;
    }

    eprintln!("reading bed: {}s", now.elapsed().as_millis() as f64 / 1000.0);
    eprintln!("lines: {}", line_count);
    eprintln!("sequences: {}", ranges.len());

    let now = Instant::now();
    let mut indexes = FnvHashMap::<String, SeqIndex>::default();
    for (seqname, seq_ranges) in ranges {
        let index = IntervalIndex::from_intervals(seq_ranges);
        debug!("{}: {} intervals", seqname, index.len());
        index.log_bins();
        indexes.insert(seqname, index);
    }
    eprintln!("indexing: {}s", now.elapsed().as_millis() as f64 / 1000.0);

    Ok(indexes)
}

fn query_bed_files(filename_a: &str, filename_b: &str, coverage: bool) -> Result<()> {
    let indexes = read_bed_file(filename_a)?;

    let file = File::open(filename_b).with_context(|| format!("opening {}", filename_b))?;
    let rdr = BufReader::new(file);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut total_count: usize = 0;
    let now = Instant::now();

    for (lineno, line) in rdr.lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", filename_b))?;
        let line = line.trim_end();
        if !is_data_line(line) {
            continue;
        }

        let (seqname, start, stop) =
            parse_bed_line(line).with_context(|| format!("{}:{}", filename_b, lineno + 1))?;

        let (count, cov) = match indexes.get(seqname) {
            Some(index) if coverage => index.coverage(start, stop),
            Some(index) => (index.query_count(start, stop), 0),
            None => (0, 0),
        };

        if coverage {
            writeln!(out, "{}\t{}\t{}", line, count, cov)?;
        } else {
            writeln!(out, "{}\t{}", line, count)?;
        }

        total_count += count;
    }
    out.flush()?;

    eprintln!("overlap: {}s", now.elapsed().as_millis() as f64 / 1000.0);
    eprintln!("total overlaps: {}", total_count);
    info!("done querying {}", filename_b);

    Ok(())
}

fn main() {
    env_logger::init();

    let matches = Command::new("bed-overlap")
        .about("Find overlaps between two groups of intervals")
        .arg(
            Arg::new("input1")
                .help("intervals to index")
                .value_name("intervals.bed")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("input2")
                .help("query intervals")
                .value_name("queries.bed")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("coverage")
                .long("coverage")
                .short('c')
                .action(ArgAction::SetTrue)
                .help("also report how many positions of each query are covered"),
        )
        .get_matches();

    let input1 = matches.get_one::<String>("input1").map(String::as_str).unwrap_or_default();
    let input2 = matches.get_one::<String>("input2").map(String::as_str).unwrap_or_default();

    if let Err(err) = query_bed_files(input1, input2, matches.get_flag("coverage")) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
