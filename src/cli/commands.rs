use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arc_swap::ArcSwap;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::cache::{self, write_table};
use crate::hot_reload::watch_manifest_with_threshold;
use crate::manifest::load_registry;
use crate::pattern::HttpMethod;
use crate::router::SealedRegistry;
use crate::runtime_config::RuntimeConfig;
use crate::RouteError;

/// Command-line interface for wildroute
#[derive(Parser)]
#[command(name = "wildroute")]
#[command(about = "Compile, inspect and resolve wildcard route manifests", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print every route, its concrete variants and compiled regexes
    Inspect {
        /// Route manifest (YAML, JSON or TOML)
        #[arg(short, long, env = "WILDROUTE_ROUTES")]
        routes: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Resolve request paths against the manifest
    Resolve {
        #[arg(short, long, env = "WILDROUTE_ROUTES")]
        routes: PathBuf,

        /// Compiled table to load instead of recompiling (overrides WILDROUTE_TABLE_CACHE)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Resolve as a request with this HTTP method and report its handler
        #[arg(short, long)]
        method: Option<String>,

        /// Exit with an error if any path has no route
        #[arg(long, default_value_t = false)]
        fail_on_miss: bool,

        /// Request paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Compile the manifest and write the persisted route table
    Compile {
        #[arg(short, long, env = "WILDROUTE_ROUTES")]
        routes: PathBuf,

        /// Output path for the compiled table (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Resolve paths read from stdin while hot-reloading the manifest
    Watch {
        #[arg(short, long, env = "WILDROUTE_ROUTES")]
        routes: PathBuf,

        /// Compile once and never reload (overrides WILDROUTE_HOT_RELOAD)
        #[arg(long, default_value_t = false)]
        no_reload: bool,
    },
}

/// Parse the process arguments and run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = RuntimeConfig::from_env();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_config(cli, &config, &mut out)
}

/// Run `cli` against `config`, writing command output to `out`.
pub fn run_with_config(cli: Cli, config: &RuntimeConfig, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Inspect { routes, format } => {
            let registry = load_registry(&routes)?;
            match format {
                OutputFormat::Text => write_inspection(&registry, out)?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &registry.to_table())?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Resolve {
            routes,
            cache,
            method,
            fail_on_miss,
            paths,
        } => {
            let method = method
                .map(|m| {
                    m.to_uppercase()
                        .parse::<HttpMethod>()
                        .map_err(|e| anyhow::anyhow!(e))
                })
                .transpose()?;
            let cache = cache.or_else(|| config.table_cache.clone());
            let registry = open_registry(&routes, cache.as_deref(), config)?;
            let mut misses = 0usize;
            for path in &paths {
                if !write_resolution(&registry, path, method, out)? {
                    misses += 1;
                }
            }
            if fail_on_miss && misses > 0 {
                bail!("{} of {} paths did not resolve", misses, paths.len());
            }
        }
        Commands::Compile { routes, out: table_path } => {
            let registry = load_registry(&routes)?;
            let mut table = registry.to_table();
            let content = fs::read(&routes)
                .with_context(|| format!("failed to read `{}`", routes.display()))?;
            table.source_hash = Some(cache::source_hash(&content));
            write_table(&table_path, &table)
                .with_context(|| format!("failed to write `{}`", table_path.display()))?;
            writeln!(
                out,
                "compiled {} routes ({} table rows) into {}",
                table.routes.len(),
                table.entries.len(),
                table_path.display()
            )?;
        }
        Commands::Watch { routes, no_reload } => {
            let registry = load_registry(&routes)?.with_slow_threshold(config.slow_resolve);
            let shared = Arc::new(ArcSwap::from_pointee(registry));
            let _watcher = if config.hot_reload && !no_reload {
                let watcher = watch_manifest_with_threshold(
                    &routes,
                    Arc::clone(&shared),
                    Some(config.slow_resolve),
                    |registry| info!(routes_count = registry.len(), "watch: serving reloaded routes"),
                )
                .with_context(|| format!("failed to watch `{}`", routes.display()))?;
                Some(watcher)
            } else {
                None
            };
            let stdin = io::stdin();
            serve_lines(&shared, stdin.lock(), out)?;
        }
    }
    Ok(())
}

/// Resolve each non-empty line of `input` against the registry currently in `shared`.
pub fn serve_lines<R: BufRead>(
    shared: &ArcSwap<SealedRegistry>,
    input: R,
    out: &mut dyn Write,
) -> Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read path from stdin")?;
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        let registry = shared.load();
        write_resolution(&registry, path, None, out)?;
        out.flush()?;
    }
    Ok(())
}

fn open_registry(
    routes: &Path,
    cache: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<SealedRegistry> {
    let registry = match cache {
        Some(cache) => cache::load_or_rebuild(cache, Some(routes), || load_registry(routes))?,
        None => load_registry(routes)?,
    };
    Ok(registry.with_slow_threshold(config.slow_resolve))
}

fn write_inspection(registry: &SealedRegistry, out: &mut dyn Write) -> Result<()> {
    for (id, route) in registry.routes().iter().enumerate() {
        write!(out, "#{} {} [{}]", id, route.uri(), route.kind())?;
        if let Some(name) = route.name() {
            write!(out, " name={}", name)?;
        }
        if let Some(origin) = route.provenance() {
            write!(out, " from={}", origin)?;
        }
        writeln!(out)?;
        for (method, binding) in route.methods() {
            let derived = if binding.derived { " (derived)" } else { "" };
            writeln!(out, "    {} -> {}{}", method, binding.handler, derived)?;
        }
        if !route.middlewares().is_empty() {
            writeln!(out, "    middlewares: {}", route.middlewares().join(", "))?;
        }
        for variant in route.variants() {
            writeln!(
                out,
                "    {}  {}  {:?}",
                variant.pattern, variant.regex, variant.indices
            )?;
        }
    }
    writeln!(
        out,
        "{} routes, {} table rows",
        registry.len(),
        registry.entries().len()
    )?;
    Ok(())
}

/// Returns whether `path` resolved.
fn write_resolution(
    registry: &SealedRegistry,
    path: &str,
    method: Option<HttpMethod>,
    out: &mut dyn Write,
) -> Result<bool> {
    let resolved = match method {
        Some(method) => registry.resolve_method(path, method),
        None => registry.resolve(path),
    };
    match resolved {
        Ok(resolved) => {
            write!(out, "{} -> {} {}", path, resolved.id, resolved.route.uri())?;
            if let Some(name) = resolved.route.name() {
                write!(out, " ({})", name)?;
            }
            for (name, value) in &resolved.params {
                write!(out, " {}={}", name, value)?;
            }
            if let Some(method) = method {
                match resolved.handler(method) {
                    Some(handler) => write!(out, " {}={}", method, handler)?,
                    None => write!(out, " {}=<unbound>", method)?,
                }
            }
            writeln!(out)?;
            Ok(true)
        }
        Err(RouteError::RouteNotFound { .. }) => {
            writeln!(out, "{} -> no route", path)?;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
