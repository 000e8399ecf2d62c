//! Print the records of a BIFF stream, one per line.
//!
//! Accepts either an `.xls` (OLE compound file, the `Workbook`/`Book` stream is used) or, with
//! `--raw`, a file holding a bare record stream.

use std::env;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use biff_records::{FrameFormatError, RecordStream};

const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug)]
struct Args {
    path: PathBuf,
    raw: bool,
    max: Option<usize>,
}

impl Args {
    fn parse() -> Result<Self, io::Error> {
        let mut path: Option<PathBuf> = None;
        let mut raw = false;
        let mut max: Option<usize> = None;

        let mut it = env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--raw" => raw = true,
                "--max" => {
                    let value = it.next().ok_or_else(|| {
                        io::Error::new(io::ErrorKind::InvalidInput, "--max expects <n>")
                    })?;
                    max = Some(parse_max(&value)?);
                }
                _ if arg.starts_with("--max=") => {
                    max = Some(parse_max(&arg["--max=".len()..])?);
                }
                _ if arg.starts_with('-') => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("unknown option: {arg}"),
                    ));
                }
                _ => {
                    if path.is_some() {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "expected a single <path>",
                        ));
                    }
                    path = Some(PathBuf::from(arg));
                }
            }
        }

        let path = path
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "missing <path>"))?;
        Ok(Self { path, raw, max })
    }
}

fn parse_max(value: &str) -> Result<usize, io::Error> {
    value.parse().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid --max value: {value}"),
        )
    })
}

fn print_usage() {
    eprintln!("usage: biff-dump <path> [--raw] [--max <n>]");
    eprintln!();
    eprintln!("  --raw      treat <path> as a bare BIFF record stream instead of an .xls file");
    eprintln!("  --max <n>  stop after <n> records");
}

fn is_ole_file(path: &Path) -> io::Result<bool> {
    let mut magic = [0u8; 8];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == OLE_MAGIC),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

fn open_stream(args: &Args) -> io::Result<Box<dyn Read>> {
    if args.raw || !is_ole_file(&args.path)? {
        return Ok(Box::new(BufReader::new(File::open(&args.path)?)));
    }

    let mut comp = cfb::open(&args.path)?;
    for candidate in ["/Workbook", "/Book", "Workbook", "Book"] {
        if let Ok(stream) = comp.open_stream(candidate) {
            return Ok(Box::new(BufReader::new(stream)));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "missing workbook stream (expected `Workbook` or `Book`)",
    ))
}

fn dump(args: &Args, out: &mut impl Write) -> io::Result<bool> {
    let stream = open_stream(args)?;
    let mut records = match RecordStream::new(stream) {
        Ok(records) => records,
        Err(FrameFormatError::Io(err)) => return Err(err),
        Err(err) => {
            writeln!(out, "error: {err}")?;
            return Ok(false);
        }
    };

    let mut count = 0usize;
    let mut errors = 0usize;
    for (idx, item) in records.by_ref().enumerate() {
        if args.max.is_some_and(|max| idx >= max) {
            break;
        }
        match item {
            Ok(record) => {
                count += 1;
                writeln!(out, "{idx:>6}  0x{:04X}  {record}", record.tag())?;
            }
            Err(err) => {
                errors += 1;
                writeln!(out, "{idx:>6}  error: {err}")?;
            }
        }
    }

    writeln!(
        out,
        "records={count} errors={errors} frames={}",
        records.reader().frames_read()
    )?;
    Ok(errors == 0)
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            std::process::exit(2);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dump(&args, &mut out) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        // Downstream consumer (e.g. `| head`) went away.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
