use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use pbxgen_project::{
    generate_project, scan, ExtensionFilter, GenerateOptions, GenerateReport, ManifestStore,
    ProjectManifest, MANIFEST_FILE,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pbxgen",
    about = "Regenerates Xcode project descriptors from source directories",
    author,
    version
)]
struct Cli {
    /// 專案根目錄；預設為目前目錄。 / Project root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,
    /// 提高日誌詳細程度（可重複）。 / Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 掃描來源並寫入 project.pbxproj。 / Scan sources and write project.pbxproj.
    Generate(GenerateArgs),
    /// 列出目錄中符合副檔名的檔案。 / List files under a directory matching extensions.
    Scan(ScanArgs),
    /// 寫入預設的 pbxgen.json。 / Write the default pbxgen.json manifest.
    Init(InitArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// 設定檔路徑；預設為 <root>/pbxgen.json。 / Manifest path; defaults to <root>/pbxgen.json.
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// 放置 .xcodeproj 的資料夾。 / Directory receiving the .xcodeproj bundle.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// 只輸出內容而不寫檔。 / Print the descriptor instead of writing it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ScanArgs {
    /// 要掃描的資料夾。 / Directory to scan.
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// 副檔名（可重複）。 / File extension to match (repeatable).
    #[arg(long = "ext", value_name = "EXT", default_value = "swift")]
    extensions: Vec<String>,

    /// 以 JSON 輸出。 / Emit a JSON report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InitArgs {
    /// 輸出的設定檔路徑。 / Manifest path to create.
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// 覆寫既有設定檔。 / Overwrite an existing manifest.
    #[arg(long)]
    force: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        root,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);
    let root = resolve_root(root)?;
    debug!(root = %root.display(), "resolved project root");

    match command {
        Commands::Generate(args) => execute_generate(args, &root),
        Commands::Scan(args) => execute_scan(args, &root),
        Commands::Init(args) => execute_init(args, &root),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute_generate(args: GenerateArgs, root: &Path) -> Result<()> {
    let (manifest, base_dir) = load_manifest(args.manifest.as_deref(), root)?;
    let options = GenerateOptions {
        output_dir: args.output.map(|dir| resolve_input_path(&dir, root)),
        dry_run: args.dry_run,
    };

    let report = generate_project(&manifest, &base_dir, &options)
        .with_context(|| format!("failed to generate project {}", manifest.name))?;

    if args.dry_run {
        print!("{}", report.contents);
    } else {
        print_generate_report(&report);
    }
    Ok(())
}

fn print_generate_report(report: &GenerateReport) {
    if report.written {
        println!("Generated {}", report.pbxproj.display());
    } else {
        println!("{} is up to date", report.pbxproj.display());
    }
    for target in &report.targets {
        println!(
            "  {}: {} sources, {} resources",
            target.name, target.sources, target.resources
        );
    }
}

/// Loads the manifest, falling back to the built-in layout when the default
/// location holds none. An explicitly named manifest must exist.
fn load_manifest(explicit: Option<&Path>, root: &Path) -> Result<(ProjectManifest, PathBuf)> {
    let path = match explicit {
        Some(path) => resolve_input_path(path, root),
        None => root.join(MANIFEST_FILE),
    };
    let store = ManifestStore::new(&path);
    let loaded = store
        .load()
        .with_context(|| format!("failed to load manifest {}", path.display()))?;
    match loaded {
        Some(manifest) => {
            info!(path = %path.display(), "using manifest");
            Ok((manifest, store.base_dir().to_path_buf()))
        }
        None if explicit.is_some() => bail!("manifest '{}' does not exist", path.display()),
        None => {
            info!("no {MANIFEST_FILE} found; using built-in project layout");
            Ok((ProjectManifest::default(), root.to_path_buf()))
        }
    }
}

fn execute_scan(args: ScanArgs, root: &Path) -> Result<()> {
    let dir = resolve_input_path(&args.dir, root);
    let filter = ExtensionFilter::new(&args.extensions);
    let report = scan(&dir, &filter).with_context(|| format!("failed to scan {}", dir.display()))?;

    if args.json {
        let payload =
            serde_json::to_string_pretty(&report).context("failed to serialise scan report")?;
        println!("{payload}");
    } else {
        for file in &report.files {
            println!("{}", file.display());
        }
    }
    Ok(())
}

fn execute_init(args: InitArgs, root: &Path) -> Result<()> {
    let path = match args.manifest {
        Some(path) => resolve_input_path(&path, root),
        None => root.join(MANIFEST_FILE),
    };
    if path.exists() && !args.force {
        bail!(
            "manifest '{}' already exists; pass --force to overwrite",
            path.display()
        );
    }
    ManifestStore::new(&path)
        .save(&ProjectManifest::default())
        .with_context(|| format!("failed to write manifest {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let current = std::env::current_dir().context("determine current directory")?;
    Ok(match root {
        Some(path) if path.is_absolute() => path,
        Some(path) => current.join(path),
        None => current,
    })
}

fn resolve_input_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
