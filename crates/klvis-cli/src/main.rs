mod input;

use distplot::{CancelToken, SolveOptions};
use scatterdraw::Color;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const PALETTE: [(&str, [u8; 3]); 8] = [
    ("red", [0xff, 0x00, 0x00]),
    ("green", [0x00, 0xff, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("orange", [0xff, 0x80, 0x00]),
    ("purple", [0x80, 0x00, 0xff]),
];

#[derive(Debug)]
pub(crate) enum CliError {
    Usage(&'static str),
    Input(String),
    TooManyNames { names: usize, colors: usize },
    Io(std::io::Error),
    Csv(csv::Error),
    Signal(ctrlc::Error),
    Solve(distplot::Error),
    Draw(scatterdraw::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "read input: {msg}"),
            CliError::TooManyNames { names, colors } => {
                write!(f, "not enough colors: {names} names but only {colors} colors")
            }
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Csv(err) => write!(f, "read input: {err}"),
            CliError::Signal(err) => write!(f, "failed to install Ctrl-C handler: {err}"),
            CliError::Solve(err) => write!(f, "{err}"),
            CliError::Draw(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for CliError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<ctrlc::Error> for CliError {
    fn from(value: ctrlc::Error) -> Self {
        Self::Signal(value)
    }
}

impl From<distplot::Error> for CliError {
    fn from(value: distplot::Error) -> Self {
        Self::Solve(value)
    }
}

impl From<scatterdraw::Error> for CliError {
    fn from(value: scatterdraw::Error) -> Self {
        Self::Draw(value)
    }
}

#[derive(Debug)]
struct Args {
    input: Option<String>,
    out_dir: PathBuf,
    plot_size: u32,
    seed: u64,
    iterations: Option<usize>,
    log_interval: Duration,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            out_dir: PathBuf::from("."),
            plot_size: 512,
            seed: 0,
            iterations: None,
            log_interval: Duration::from_secs(1),
        }
    }
}

fn usage() -> &'static str {
    "klvis\n\
\n\
USAGE:\n\
  klvis --in <csv> [--out <dir>] [--size <px>] [--seed <n>] [--iterations <n>] [--log-interval-ms <ms>]\n\
\n\
NOTES:\n\
  - The input CSV has no header; each line is `a,b,D(a|b)`.\n\
  - Solving runs until Ctrl-C, or until --iterations iterations have run.\n\
  - Writes <dir>/distplot.png and <dir>/legend.txt.\n\
  - Flags may be written with one or two dashes (-in, --in).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    fn value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a str, CliError> {
        it.next()
            .map(String::as_str)
            .ok_or(CliError::Usage(usage()))
    }

    let mut args = Args::default();
    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let flag = a.strip_prefix("--").or_else(|| a.strip_prefix('-'));
        match flag {
            Some("help" | "h") => return Err(CliError::Usage(usage())),
            Some("in") => args.input = Some(value(&mut it)?.to_string()),
            Some("out") => args.out_dir = PathBuf::from(value(&mut it)?),
            Some("size") => {
                args.plot_size = value(&mut it)?
                    .parse::<u32>()
                    .ok()
                    .filter(|v| *v > 0)
                    .ok_or(CliError::Usage(usage()))?;
            }
            Some("seed") => {
                args.seed = value(&mut it)?
                    .parse::<u64>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            Some("iterations") => {
                args.iterations = Some(
                    value(&mut it)?
                        .parse::<usize>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            Some("log-interval-ms") => {
                let ms = value(&mut it)?
                    .parse::<u64>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.log_interval = Duration::from_millis(ms);
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if args.input.is_none() {
        return Err(CliError::Usage("Missing --in flag. See --help for more."));
    }
    Ok(args)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("klvis=info,distplot=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_outputs(out_dir: &Path, png: &[u8], names: &[String]) -> Result<Vec<String>, CliError> {
    std::fs::create_dir_all(out_dir)?;

    let plot_path = out_dir.join("distplot.png");
    tracing::info!("Saving distplot to {}...", plot_path.display());
    std::fs::write(&plot_path, png)?;

    let labels = names
        .iter()
        .zip(PALETTE.iter())
        .map(|(name, (color, _))| format!("{color}={name}"))
        .collect::<Vec<_>>();
    let mut legend = labels.join("\n");
    legend.push('\n');
    std::fs::write(out_dir.join("legend.txt"), legend)?;
    Ok(labels)
}

fn run(args: Args) -> Result<(), CliError> {
    let Some(input) = args.input.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let divergences = input::read_divergences(input)?;
    let (mut points, names) = input::build_points(&divergences);
    if names.len() > PALETTE.len() {
        return Err(CliError::TooManyNames {
            names: names.len(),
            colors: PALETTE.len(),
        });
    }

    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;
    if args.iterations == Some(0) {
        token.cancel();
    }

    tracing::info!(points = points.len(), "Solving distplot (ctrl+c to end)...");
    let options = SolveOptions {
        random_seed: args.seed,
        ..Default::default()
    };
    let stop = token.clone();
    let mut next_log = Instant::now() + args.log_interval;
    let report = distplot::solve(
        &mut points,
        &token,
        Some(|iter: usize, cost: f64| {
            if Instant::now() >= next_log {
                tracing::info!("iter {iter}: cost={cost}");
                next_log = Instant::now() + args.log_interval;
            }
            if args.iterations.is_some_and(|n| iter + 1 >= n) {
                stop.cancel();
            }
        }),
        &options,
    )?;
    tracing::info!(
        iterations = report.iterations,
        cost = ?report.last_cost,
        "solve finished"
    );
    report.ensure_finite(&points)?;

    let colors = PALETTE
        .iter()
        .map(|(_, [r, g, b])| Color::from_rgba8(*r, *g, *b, 0xff))
        .collect::<Vec<_>>();
    let pixmap = scatterdraw::draw_distplot(&points, &colors, args.plot_size)?;
    let png = scatterdraw::encode_png(&pixmap)?;

    let labels = write_outputs(&args.out_dir, &png, &names)?;
    tracing::info!("Labels: {}", labels.join(" "));
    Ok(())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
