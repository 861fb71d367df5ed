use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use cusf_parser::Document;
use cusf_protocol::SentenceId;
use cusf_solver::{check_document, compare, fill_document, pred_edges, CheckReport, EdgeMap};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fills in and checks CUSF frame annotation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add missing frames and arguments to FILE in place, then check it
    Check {
        file: PathBuf,
        /// Do not keep the previous version as FILE~
        #[arg(long)]
        no_backup: bool,
        /// Print the summary and warnings as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Fill CUSF (or plain CoNLL-U) from stdin and write CUSF to stdout
    Fill,
    /// Edge agreement between two annotators
    Agreement {
        file1: PathBuf,
        file2: PathBuf,
        /// Leave out predicates annotated in this file
        #[arg(long, value_name = "FILE")]
        ignore_preds: Option<PathBuf>,
        /// Compare coarse labels only
        #[arg(long)]
        simplify: bool,
    },
    /// Split FILE into numbered chunks of SIZE blocks
    Burst {
        file: PathBuf,
        #[arg(long, default_value_t = 50)]
        size: usize,
    },
    /// Add sent_id and text comments to whitespace-tokenized blocks on stdin
    Ids,
}

#[derive(Debug, Clone, Copy)]
struct CheckOptions {
    backup: bool,
    json: bool,
}

#[derive(Serialize)]
struct WarningRecord<'a> {
    sentence: &'a SentenceId,
    line: usize,
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct Summary<'a> {
    file: &'a Path,
    predicates: usize,
    annotated: usize,
    warnings: Vec<WarningRecord<'a>>,
}

fn summary<'a>(file: &'a Path, report: &'a CheckReport) -> Summary<'a> {
    Summary {
        file,
        predicates: report.predicates,
        annotated: report.annotated,
        warnings: report
            .warnings
            .iter()
            .map(|d| WarningRecord {
                sentence: &d.sentence,
                line: d.line,
                kind: d.warning.kind(),
                message: d.warning.to_string(),
            })
            .collect(),
    }
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    cusf_parser::read(BufReader::new(file)).with_context(|| format!("cannot read {}", path.display()))
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push("~");
    PathBuf::from(name)
}

/// Replaces `path` only once the new content is completely written.
fn write_atomically(path: &Path, doc: &Document) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create a temporary file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        doc.write(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path)
        .with_context(|| format!("cannot replace {}", path.display()))?;
    Ok(())
}

fn check_file(path: &Path, options: CheckOptions) -> anyhow::Result<CheckReport> {
    let mut doc = read_document(path)?;
    if options.backup {
        let backup = backup_path(path);
        fs::copy(path, &backup)
            .with_context(|| format!("cannot back up {} to {}", path.display(), backup.display()))?;
    }
    let stats = fill_document(&mut doc);
    info!(filled = stats.filled, skipped = stats.skipped, "filled {}", path.display());
    write_atomically(path, &doc)?;

    let doc = read_document(path)?;
    let report = check_document(&doc);
    info!("{}/{} predicates annotated", report.annotated, report.predicates);
    Ok(report)
}

fn fill_stream<R: BufRead, W: Write>(reader: R, writer: &mut W) -> anyhow::Result<()> {
    let mut doc = cusf_parser::read(reader)?;
    fill_document(&mut doc);
    doc.write(writer)?;
    Ok(())
}

fn ids_stream<R: BufRead, W: Write>(reader: R, writer: &mut W) -> anyhow::Result<()> {
    let blocks = cusf_blocks::read(reader).collect::<io::Result<Vec<_>>>()?;
    cusf_blocks::write_all(&cusf_parser::add_sentence_ids(blocks), writer)?;
    Ok(())
}

fn burst(path: &Path, size: usize) -> anyhow::Result<Vec<PathBuf>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let blocks = cusf_blocks::read(BufReader::new(file)).collect::<io::Result<Vec<_>>>()?;
    let mut written = Vec::new();
    for (i, chunk) in cusf_blocks::chunks(&blocks, size).enumerate() {
        let name = cusf_blocks::chunk_path(path, i)
            .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
        let mut writer = BufWriter::new(
            File::create(&name).with_context(|| format!("cannot create {}", name.display()))?,
        );
        cusf_blocks::write_all(chunk, &mut writer)?;
        writer.flush()?;
        written.push(name);
    }
    Ok(written)
}

fn edges(path: &Path) -> anyhow::Result<EdgeMap> {
    let doc = read_document(path)?;
    Ok(pred_edges(&doc.sentences))
}

fn print_ratio(who: &str, other: &str, matches: usize, edges: usize, ratio: Option<f64>) {
    match ratio {
        Some(r) => println!("{matches}/{edges} ({r:.4}) of {who}'s edges matched by {other}"),
        None => println!("{matches}/{edges} of {who}'s edges matched by {other}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { file, no_backup, json } => {
            let options = CheckOptions {
                backup: !no_backup,
                json,
            };
            let report = check_file(&file, options)?;
            if options.json {
                println!("{}", serde_json::to_string_pretty(&summary(&file, &report))?);
            }
        }
        Command::Fill => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            fill_stream(io::stdin().lock(), &mut out)?;
            out.flush()?;
        }
        Command::Agreement {
            file1,
            file2,
            ignore_preds,
            simplify,
        } => {
            let ignore = match ignore_preds {
                Some(path) => edges(&path)?,
                None => EdgeMap::new(),
            };
            let report = compare(&edges(&file1)?, &edges(&file2)?, &ignore, simplify);
            println!("{} common predicates", report.common);
            print_ratio("annotator 1", "annotator 2", report.matches1, report.edges1, report.ratio1());
            print_ratio("annotator 2", "annotator 1", report.matches2, report.edges2, report.ratio2());
        }
        Command::Burst { file, size } => {
            let written = burst(&file, size)?;
            info!("wrote {} chunks", written.len());
        }
        Command::Ids => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            ids_stream(io::stdin().lock(), &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CONLLU: &str = "\
# sent_id = s1
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tloves\t_\t_\t_\t_\t0\troot\t_\t_
3\tSandy\t_\t_\t_\t_\t2\tobj\t_\t_

";

    #[test]
    fn test_check_file_fills_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kim.cusf");
        fs::write(&path, CONLLU).unwrap();

        let report = check_file(&path, CheckOptions { backup: true, json: false }).unwrap();
        assert_eq!((report.predicates, report.annotated), (3, 0));
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), CONLLU);

        let filled = fs::read_to_string(&path).unwrap();
        assert!(filled.starts_with(CONLLU));
        assert!(filled.contains("[] Kim loves Sandy (2)\n[] Kim (1)\n[] Sandy (3)\n"));

        // A second run changes nothing.
        check_file(&path, CheckOptions { backup: false, json: false }).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), filled);
    }

    #[test]
    fn test_check_missing_file() {
        let dir = tempdir().unwrap();
        let err = check_file(&dir.path().join("missing.cusf"), CheckOptions { backup: true, json: false })
            .unwrap_err();
        assert!(err.to_string().contains("cannot open"));
    }

    #[test]
    fn test_json_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kim.cusf");
        fs::write(&path, format!("{CONLLU}[SCENE-BOGUS] loves (2)\n\n")).unwrap();
        let report = check_file(&path, CheckOptions { backup: false, json: true }).unwrap();

        let value = serde_json::to_value(summary(&path, &report)).unwrap();
        assert_eq!(value["predicates"], 3);
        assert_eq!(value["warnings"][0]["sentence"], "s1");
        assert_eq!(value["warnings"][0]["kind"], "unknown-frame-label");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_fill_and_ids_streams() {
        let mut out = Vec::new();
        fill_stream(CONLLU.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("[] Sandy (3)\n\n"));

        let mut out = Vec::new();
        ids_stream("1 Kim\n2 sleeps\n".as_bytes(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# sent_id = 1\n# text = Kim sleeps\n1 Kim\n2 sleeps\n\n"
        );
    }

    #[test]
    fn test_burst() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.cusf");
        fs::write(&path, "a\n\nb\n\nc\n\n").unwrap();

        let written = burst(&path, 2).unwrap();
        assert_eq!(written, vec![dir.path().join("corpus.00.cusf"), dir.path().join("corpus.01.cusf")]);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "a\n\nb\n\n");
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), "c\n\n");

        assert!(burst(&dir.path().join("missing.cusf"), 2).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["cusf-check", "agreement", "a.cusf", "b.cusf", "--simplify"]).unwrap();
        assert!(matches!(cli.command, Command::Agreement { simplify: true, ignore_preds: None, .. }));

        let cli = Cli::try_parse_from(["cusf-check", "burst", "x.cusf"]).unwrap();
        assert!(matches!(cli.command, Command::Burst { size: 50, .. }));
    }
}
