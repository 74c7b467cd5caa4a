//! Subcommand implementations.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use figport::codec::{
    self, DecodeOptions, EncodeOptions, ExportReport, ImportReport, apply_document, decode_document, encode_document,
};
use figport::presets;

use crate::config::{ExportConfig, ImportConfig};
use crate::snapshot;

/// Fails when `forbidden_dir` exists under `base`.
///
/// Guards against running an export or import from inside the deployment it
/// would overwrite.
pub fn check_guard(base: &Path, forbidden_dir: &str) -> Result<()> {
    if forbidden_dir.is_empty() {
        return Ok(());
    }
    if base.join(forbidden_dir).is_dir() {
        bail!("You cannot run this command from a {} deployment (found ./{}/)", forbidden_dir, forbidden_dir);
    }
    Ok(())
}

/// Formats a byte count in bytes, KB, MB or GB with two decimals.
pub fn convert_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b < KB => format!("{} bytes", b),
        b if b < MB => format!("{:.2} KB", b as f64 / KB as f64),
        b if b < GB => format!("{:.2} MB", b as f64 / MB as f64),
        b => format!("{:.2} GB", b as f64 / GB as f64),
    }
}

/// Outcome of the import confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Cancel,
    TimedOut,
}

/// Waits for a line reading `proceed` or `cancel` (any case).
///
/// Other lines are ignored. End of input counts as cancel.
pub fn confirm<R>(input: R, timeout: Duration) -> Confirmation
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(line) => match line.trim().to_lowercase().as_str() {
                "proceed" => return Confirmation::Proceed,
                "cancel" => return Confirmation::Cancel,
                other => debug!(answer = other, "ignoring confirmation answer"),
            },
            Err(RecvTimeoutError::Timeout) => return Confirmation::TimedOut,
            Err(RecvTimeoutError::Disconnected) => return Confirmation::Cancel,
        }
    }
}

/// Reads the snapshot, encodes it with the CarFigures table and writes the
/// compressed document.
pub fn export(config: &ExportConfig, base: &Path, snapshot_path: &Path, output: Option<&Path>) -> Result<ExportReport> {
    check_guard(base, &config.forbidden_dir)?;

    let output: PathBuf = base.join(output.unwrap_or(config.output.as_path()));
    let store = snapshot::load(snapshot_path)?;

    println!("Migrating...");
    let started = Instant::now();

    let encoded = encode_document(presets::carfigures_export(), &store, &EncodeOptions::new())?;
    for section in &encoded.report.sections {
        println!("Migrated {} {}", section.records, section.label);
    }

    let file = File::create(&output).with_context(|| format!("failed to create {}", output.display()))?;
    codec::write_document(BufWriter::new(file), &encoded.text, config.compression_level)?;

    let elapsed = started.elapsed().as_secs_f64();
    let size = std::fs::metadata(&output)
        .with_context(|| format!("failed to stat {}", output.display()))?
        .len();
    println!(
        "Finished migrating in {:.3}s! File was saved to {} ({})",
        elapsed,
        output.display(),
        convert_size(size)
    );
    info!(records = encoded.report.total_records(), path = %output.display(), "export complete");

    Ok(encoded.report)
}

/// Result of [`import`].
#[derive(Debug)]
pub enum ImportOutcome {
    Imported(ImportReport),
    Canceled(Confirmation),
}

/// Clears the destination snapshot and fills it from a compressed document
/// using the Ballsdex tables.
pub fn import<R>(
    config: &ImportConfig,
    base: &Path,
    input: Option<&Path>,
    snapshot_path: &Path,
    answers: Option<R>,
) -> Result<ImportOutcome>
where
    R: BufRead + Send + 'static,
{
    check_guard(base, &config.forbidden_dir)?;

    let input: PathBuf = base.join(input.unwrap_or(config.input.as_path()));
    if !input.is_file() {
        bail!("Could not find `{}` migration file.", input.display());
    }

    if let Some(answers) = answers {
        println!("WARNING: All existing data in {} will be CLEARED.", snapshot_path.display());
        println!("Type `proceed` if you wish to proceed.");
        println!("Type `cancel` if you wish to cancel.");
        std::io::stdout().flush().context("failed to flush stdout")?;

        match confirm(answers, config.confirm_timeout()) {
            Confirmation::Proceed => {}
            Confirmation::TimedOut => {
                println!("Canceled due to response timeout.");
                return Ok(ImportOutcome::Canceled(Confirmation::TimedOut));
            }
            Confirmation::Cancel => {
                println!("Canceled due to message response.");
                return Ok(ImportOutcome::Canceled(Confirmation::Cancel));
            }
        }
    }

    let file = File::open(&input).with_context(|| format!("failed to open {}", input.display()))?;
    let text = codec::read_document(BufReader::new(file))?;

    let started = Instant::now();

    let mut options = DecodeOptions::new().expect_digest(presets::carfigures_export().defaults_digest());
    if config.strict_digest {
        options = options.strict();
    }
    // Decode fully before touching the destination
    let doc = decode_document(&text, presets::ballsdex_import(), presets::ballsdex_schema(), &options)?;

    let mut store = snapshot::load_or_empty(snapshot_path)?;
    let cleared: usize = store.types().map(|t| store.count(t)).sum();
    store.clear();
    if cleared > 0 {
        warn!(records = cleared, "cleared existing data");
    }

    let result = apply_document(doc, &mut store);
    // Persist whatever was inserted, even if a later type failed
    snapshot::save(&store, snapshot_path)?;
    let report = result?;

    for inserted in &report.inserted {
        println!("- Added {} {} objects.", inserted.records, inserted.target_type);
    }
    println!("Ended migration in {:.3}s", started.elapsed().as_secs_f64());

    Ok(ImportOutcome::Imported(report))
}

/// Per-section summary printed by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub code: String,
    pub line: usize,
    pub records: usize,
    /// Widest record line, in cells.
    pub max_cells: usize,
    /// Cells the import table expects for this code.
    pub expected_cells: usize,
}

/// Prints the header and section layout of a compressed document without
/// decoding any record.
pub fn inspect(input: &Path) -> Result<Vec<RunSummary>> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let text = codec::read_document(BufReader::new(file))?;
    let registry = presets::ballsdex_import();
    let parts = codec::split(&text, registry)?;

    for comment in &parts.header.comments {
        println!("// {}", comment);
    }
    match parts.header.defaults_digest {
        Some(digest) if digest == presets::carfigures_export().defaults_digest() => {
            println!("defaults digest {} matches the built-in export table", digest)
        }
        Some(digest) => println!("defaults digest {} differs from the built-in export table", digest),
        None => println!("no defaults digest"),
    }

    let mut summaries = Vec::with_capacity(parts.runs.len());
    for run in &parts.runs {
        let expected_cells = registry.resolve(run.code)?.width();
        let max_cells = run
            .lines
            .iter()
            .map(|(_, l)| l.split(codec::scalar::FIELD_SEPARATOR).count())
            .max()
            .unwrap_or(0);
        println!(
            ":{} (line {}): {} records, up to {} cells, import table reads {}",
            run.code,
            run.marker_line,
            run.lines.len(),
            max_cells,
            expected_cells
        );
        summaries.push(RunSummary {
            code: run.code.to_string(),
            line: run.marker_line,
            records: run.lines.len(),
            max_cells,
            expected_cells,
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use figport::{Record, Scalar};

    #[test]
    fn test_convert_size() {
        assert_eq!(convert_size(512), "512 bytes");
        assert_eq!(convert_size(1536), "1.50 KB");
        assert_eq!(convert_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(convert_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_guard() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_guard(dir.path(), "ballsdex").is_ok());
        std::fs::create_dir(dir.path().join("ballsdex")).unwrap();
        let err = check_guard(dir.path(), "ballsdex").unwrap_err();
        assert!(err.to_string().contains("You cannot run this command"));
        assert!(check_guard(dir.path(), "").is_ok());
    }

    #[test]
    fn test_confirm() {
        let t = Duration::from_secs(5);
        assert_eq!(confirm(Cursor::new("maybe\nPROCEED\n"), t), Confirmation::Proceed);
        assert_eq!(confirm(Cursor::new(" cancel \nproceed\n"), t), Confirmation::Cancel);
        assert_eq!(confirm(Cursor::new("what\n"), t), Confirmation::Cancel);
    }

    #[test]
    fn test_confirm_times_out() {
        let (_keep_open, reader) = blocking_reader();
        assert_eq!(confirm(reader, Duration::from_millis(50)), Confirmation::TimedOut);
    }

    /// A reader that blocks until the returned sender is dropped.
    fn blocking_reader() -> (mpsc::Sender<Vec<u8>>, BufReader<ChannelReader>) {
        let (tx, rx) = mpsc::channel();
        (tx, BufReader::new(ChannelReader(rx)))
    }

    struct ChannelReader(mpsc::Receiver<Vec<u8>>);

    impl std::io::Read for ChannelReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.recv() {
                Ok(bytes) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Err(_) => Ok(0),
            }
        }
    }

    #[test]
    fn test_export_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("carfigures.json");
        std::fs::write(
            &snapshot_path,
            r#"{"Player": [{"id": 1, "discord_id": 42, "donationPolicy": 1, "privacyPolicy": 2}]}"#,
        )
        .unwrap();
        let output = dir.path().join("out.txt.zst");

        let report = export(&ExportConfig::default(), dir.path(), &snapshot_path, Some(&output)).unwrap();
        assert_eq!(report.section("P").unwrap().records, 1);
        assert_eq!(report.total_records(), 1);

        let text = codec::read_document(File::open(&output).unwrap()).unwrap();
        assert!(text.ends_with(":P\n42╵╵2\n"));
    }

    #[test]
    fn test_export_refuses_inside_destination() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ballsdex")).unwrap();
        let result = export(&ExportConfig::default(), dir.path(), &dir.path().join("x.json"), None);
        assert!(result.is_err());
    }

    fn write_document(path: &Path, text: &str) {
        let file = File::create(path).unwrap();
        codec::write_document(file, text, 3).unwrap();
    }

    #[test]
    fn test_import_replaces_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("migration.txt.zst");
        write_document(&input, ":R\nbg.png╵Democracy╵1\n:P\n1╵100╵7╵1\n╵200╵8╵\n");

        let snapshot_path = dir.path().join("ballsdex.json");
        std::fs::write(&snapshot_path, r#"{"Regime": [{"id": 9, "name": "Old"}]}"#).unwrap();

        let outcome = import(
            &ImportConfig::default(),
            dir.path(),
            Some(&input),
            &snapshot_path,
            Some(Cursor::new("proceed\n")),
        )
        .unwrap();
        let ImportOutcome::Imported(report) = outcome else {
            panic!("import was canceled");
        };
        assert_eq!(report.total_records(), 3);

        let store = snapshot::load(&snapshot_path).unwrap();
        let regimes: Vec<&Record> = store.get_all("Regime").collect();
        assert_eq!(regimes.len(), 1);
        assert_eq!(regimes[0].get("name"), Some(&Scalar::Text("Democracy".into())));
        let players: Vec<&Record> = store.get_all("Player").collect();
        assert_eq!(players[1].get("discord_id"), Some(&Scalar::Integer(200)));
        assert!(!players[1].contains("donation_policy"));
    }

    #[test]
    fn test_import_cancel_leaves_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("migration.txt.zst");
        write_document(&input, ":P\n╵1\n");
        let snapshot_path = dir.path().join("ballsdex.json");
        std::fs::write(&snapshot_path, r#"{"Player": [{"id": 1}]}"#).unwrap();

        let outcome = import(
            &ImportConfig::default(),
            dir.path(),
            Some(&input),
            &snapshot_path,
            Some(Cursor::new("cancel\n")),
        )
        .unwrap();
        assert!(matches!(outcome, ImportOutcome::Canceled(Confirmation::Cancel)));
        assert_eq!(snapshot::load(&snapshot_path).unwrap().count("Player"), 1);
    }

    #[test]
    fn test_import_decode_error_leaves_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("migration.txt.zst");
        write_document(&input, ":P\n╵1\n:XX\n1\n");
        let snapshot_path = dir.path().join("ballsdex.json");
        std::fs::write(&snapshot_path, r#"{"Player": [{"id": 1}]}"#).unwrap();

        let err = import::<Cursor<&str>>(&ImportConfig::default(), dir.path(), Some(&input), &snapshot_path, None)
            .unwrap_err();
        assert!(err.to_string().contains("invalid section \"XX\" detected on line 3"));
        assert_eq!(snapshot::load(&snapshot_path).unwrap().count("Player"), 1);
    }

    #[test]
    fn test_import_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = import::<Cursor<&str>>(
            &ImportConfig::default(),
            dir.path(),
            None,
            &dir.path().join("db.json"),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Could not find"));
    }

    #[test]
    fn test_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("migration.txt.zst");
        write_document(&input, "// format: 1\n\n:P\n1╵2\n1╵2╵3╵4╵5\n:GC\n9\n");

        let runs = inspect(&input).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[0],
            RunSummary {
                code: "P".into(),
                line: 3,
                records: 2,
                max_cells: 5,
                expected_cells: 4,
            }
        );
        assert_eq!(runs[1].code, "GC");
    }
}
