//! Schema Forms CLI
//!
//! Command-line interface for resolving conditional schemas and previewing
//! the forms they produce.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use schema_forms::{
    build_form, load_data, load_errors, load_json_str, load_schema, path, render_outline, resolve,
    ErrorMap, LoadError, RenderOptions, RequirementTable, ResolveOptions, RevealToggles,
    SchemaRegistry, ValueTree,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-forms")]
#[command(about = "Resolve conditional schemas and preview schema-driven forms")]
#[command(version)]
struct Cli {
    /// Log resolution diagnostics (repeat for more detail)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Current form data (JSON file); defaults to an empty object
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory of named schema fragments for $ref lookups
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Maximum fixpoint passes per schema node
    #[arg(long, default_value_t = schema_forms::DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// Maximum nesting depth for resolution
    #[arg(long, default_value_t = schema_forms::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Exit with code 1 when resolution does not converge
    #[arg(long)]
    deny_divergence: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a schema against form data and print the effective schema
    Resolve {
        /// Schema file
        schema: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Classify a schema into form fields and print them
    Render {
        /// Schema file
        schema: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Error map file: { "<path>": "<message>" }
        #[arg(long)]
        errors: Option<PathBuf>,

        /// Schema whose allOf conditions decide extra required fields
        #[arg(long)]
        required_table: Option<PathBuf>,

        /// Masked field paths to show in clear text
        #[arg(long = "reveal")]
        reveal: Vec<String>,

        /// Nesting level past which fields degrade to plain text
        #[arg(long, default_value_t = schema_forms::DEFAULT_RENDER_DEPTH)]
        render_depth: usize,

        /// Output field descriptors as JSON instead of an outline
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the value at a dot path
    Get {
        /// Data file
        data: PathBuf,

        /// Dot path, e.g. source.bucket or columns.0.name
        path: String,
    },

    /// Store a JSON value at a dot path and print the new data
    Set {
        /// Data file
        data: PathBuf,

        /// Dot path, e.g. source.bucket or columns.0.name
        path: String,

        /// JSON value; bare words are stored as strings
        value: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            schema,
            engine,
            output,
            pretty,
        } => run_resolve(&schema, &engine, output, pretty),

        Commands::Render {
            schema,
            engine,
            errors,
            required_table,
            reveal,
            render_depth,
            json,
            pretty,
        } => run_render(RenderArgs {
            schema,
            engine,
            errors,
            required_table,
            reveal,
            render_depth,
            json_output: json,
            pretty,
        }),

        Commands::Get { data, path } => run_get(&data, &path),

        Commands::Set {
            data,
            path,
            value,
            pretty,
        } => run_set(&data, &path, &value, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn report(context: &str, e: &LoadError) -> u8 {
    eprintln!("Error {}: {}", context, e);
    e.exit_code() as u8
}

fn resolve_options(engine: &EngineArgs) -> ResolveOptions {
    ResolveOptions::new()
        .max_passes(engine.max_passes)
        .max_depth(engine.max_depth)
}

/// Load the schema, data and registry shared by `resolve` and `render`.
fn load_inputs(
    schema_path: &Path,
    engine: &EngineArgs,
) -> Result<(schema_forms::SchemaNode, ValueTree, SchemaRegistry), u8> {
    let schema = load_schema(schema_path).map_err(|e| report("loading schema", &e))?;

    let data = match &engine.data {
        Some(path) => load_data(path).map_err(|e| report("loading data", &e))?,
        None => ValueTree::empty_object(),
    };

    let registry = match &engine.registry {
        Some(dir) => SchemaRegistry::load_dir(dir).map_err(|e| report("loading registry", &e))?,
        None => SchemaRegistry::new(),
    };

    Ok((schema, data, registry))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn check_divergence(
    engine: &EngineArgs,
    divergences: &[schema_forms::Divergence],
) -> Result<(), u8> {
    for divergence in divergences {
        let at = if divergence.path.is_empty() {
            "<root>"
        } else {
            divergence.path.as_str()
        };
        eprintln!(
            "Warning: resolution did not converge at {} after {} passes",
            at, divergence.passes
        );
    }

    if engine.deny_divergence && !divergences.is_empty() {
        Err(1)
    } else {
        Ok(())
    }
}

fn run_resolve(
    schema_path: &Path,
    engine: &EngineArgs,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let (schema, data, registry) = load_inputs(schema_path, engine)?;

    let resolution = resolve(&schema, &data, &registry, &resolve_options(engine));
    let json_output = to_json(&resolution.schema, pretty)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    check_divergence(engine, &resolution.divergences)
}

struct RenderArgs {
    schema: PathBuf,
    engine: EngineArgs,
    errors: Option<PathBuf>,
    required_table: Option<PathBuf>,
    reveal: Vec<String>,
    render_depth: usize,
    json_output: bool,
    pretty: bool,
}

fn run_render(args: RenderArgs) -> Result<(), u8> {
    let RenderArgs {
        schema: schema_path,
        engine,
        errors,
        required_table,
        reveal,
        render_depth,
        json_output,
        pretty,
    } = args;

    let (schema, data, registry) = load_inputs(&schema_path, &engine)?;

    let errors: ErrorMap = match &errors {
        Some(path) => load_errors(path).map_err(|e| report("loading errors", &e))?,
        None => ErrorMap::new(),
    };

    let table = match &required_table {
        Some(path) => {
            let table_schema =
                load_schema(path).map_err(|e| report("loading required table", &e))?;
            Some(RequirementTable::new(table_schema).with_registry(registry.clone()))
        }
        None => None,
    };

    let mut ctx = schema_forms::FormContext::new(&registry)
        .with_errors(&errors)
        .with_resolve_options(resolve_options(&engine))
        .with_render_options(RenderOptions::new().max_depth(render_depth));
    if let Some(table) = &table {
        ctx = ctx.with_required_override(table);
    }

    let form = build_form(&schema, &data, &ctx);

    if json_output {
        println!("{}", to_json(&form.fields, pretty)?);
    } else {
        let mut toggles = RevealToggles::new();
        for path in &reveal {
            toggles.toggle(path);
        }
        println!("{}", render_outline(&form, &toggles));
    }

    check_divergence(&engine, &form.divergences)
}

fn run_get(data_path: &Path, dot_path: &str) -> Result<(), u8> {
    let data = load_data(data_path).map_err(|e| report("loading data", &e))?;

    match path::get(&data, dot_path) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => {
            eprintln!("Error: no value at {}", dot_path);
            Err(1)
        }
    }
}

fn run_set(data_path: &Path, dot_path: &str, raw: &str, pretty: bool) -> Result<(), u8> {
    let data = load_data(data_path).map_err(|e| report("loading data", &e))?;

    // Bare words that aren't JSON are stored as strings
    let value = load_json_str(raw)
        .map(ValueTree::from)
        .unwrap_or_else(|_| ValueTree::from(raw));

    let updated = path::set(&data, dot_path, value);
    println!("{}", to_json(&updated, pretty)?);
    Ok(())
}
