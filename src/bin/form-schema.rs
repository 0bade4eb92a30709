//! Form Schema CLI
//!
//! Command-line interface for inspecting and editing JSON Schema forms as
//! element lists.

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use form_schema_builder::{
    add_card, add_section, check_unsupported_features, delete_element, load_document, move_down,
    move_up, propagate_definition_changes, rename_element, reorder, write_document, CategoryHash,
    EditContext, Mods, SchemaPair,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "form-schema")]
#[command(about = "Inspect and edit JSON Schema forms as element lists")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Documents every command reads.
#[derive(Args)]
struct DocumentArgs {
    /// JSON Schema file
    #[arg(long)]
    schema: PathBuf,

    /// UI schema file (empty object if not specified)
    #[arg(long)]
    ui_schema: Option<PathBuf>,

    /// Host customisation file (custom inputs, new element defaults)
    #[arg(long)]
    mods: Option<PathBuf>,
}

/// Where edited documents go.
#[derive(Args)]
struct OutputArgs {
    /// Write the edited schema here instead of printing the pair
    #[arg(long, requires = "out_ui_schema")]
    out_schema: Option<PathBuf>,

    /// Write the edited UI schema here instead of printing the pair
    #[arg(long, requires = "out_schema")]
    out_ui_schema: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the element list of the schema root
    Elements {
        #[command(flatten)]
        documents: DocumentArgs,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List features the editor cannot display
    Audit {
        #[command(flatten)]
        documents: DocumentArgs,

        /// Output findings as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Add a new card (appended unless --index is given)
    AddCard {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        /// Position of the new card
        #[arg(long)]
        index: Option<usize>,
    },

    /// Add a new section (appended unless --index is given)
    AddSection {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        /// Position of the new section
        #[arg(long)]
        index: Option<usize>,
    },

    /// Delete the element at an index
    Delete {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        index: usize,
    },

    /// Swap the element at an index with the one before it
    MoveUp {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        index: usize,
    },

    /// Swap the element at an index with the one after it
    MoveDown {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        index: usize,
    },

    /// Swap the elements at two indices
    Reorder {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        source: usize,
        destination: usize,
    },

    /// Rename an element, rejecting names already used by a sibling
    Rename {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,

        old: String,
        new: String,
    },

    /// Rewrite sections so definition content is up to date
    Propagate {
        #[command(flatten)]
        documents: DocumentArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Elements { documents, pretty } => run_elements(&documents, pretty),
        Commands::Audit { documents, json } => run_audit(&documents, json),
        Commands::AddCard {
            documents,
            output,
            index,
        } => run_edit(&documents, &output, |ctx| {
            add_card(ctx, index).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::AddSection {
            documents,
            output,
            index,
        } => run_edit(&documents, &output, |ctx| {
            add_section(ctx, index).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::Delete {
            documents,
            output,
            index,
        } => run_edit(&documents, &output, |ctx| {
            delete_element(ctx, index).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::MoveUp {
            documents,
            output,
            index,
        } => run_edit(&documents, &output, |ctx| {
            move_up(ctx, index).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::MoveDown {
            documents,
            output,
            index,
        } => run_edit(&documents, &output, |ctx| {
            move_down(ctx, index).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::Reorder {
            documents,
            output,
            source,
            destination,
        } => run_edit(&documents, &output, |ctx| {
            reorder(ctx, source, destination).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::Rename {
            documents,
            output,
            old,
            new,
        } => run_edit(&documents, &output, |ctx| {
            rename_element(ctx, &old, &new).map_err(|e| fail(&e, e.exit_code()))
        }),
        Commands::Propagate { documents, output } => run_edit(&documents, &output, |ctx| {
            propagate_definition_changes(ctx.schema, ctx.uischema, ctx.category_hash)
                .map_err(|e| fail(&e, e.exit_code()))
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Documents and configuration loaded from the command line.
struct Loaded {
    schema: Value,
    uischema: Value,
    mods: Mods,
    category_hash: CategoryHash,
}

impl DocumentArgs {
    fn load(&self) -> Result<Loaded, u8> {
        let schema = load_document(&self.schema).map_err(|e| fail(&e, e.exit_code()))?;
        let uischema = match &self.ui_schema {
            Some(path) => load_document(path).map_err(|e| fail(&e, e.exit_code()))?,
            None => Value::Object(Default::default()),
        };
        let mods = match &self.mods {
            Some(path) => Mods::load(path).map_err(|e| fail(&e, e.exit_code()))?,
            None => Mods::default(),
        };
        let category_hash = mods
            .category_hash()
            .map_err(|e| fail(&e, e.exit_code()))?;

        Ok(Loaded {
            schema,
            uischema,
            mods,
            category_hash,
        })
    }
}

fn run_elements(documents: &DocumentArgs, pretty: bool) -> Result<(), u8> {
    let loaded = documents.load()?;
    let ctx = EditContext::new(&loaded.schema, &loaded.uischema, &loaded.category_hash);
    let elements = ctx.elements().map_err(|e| fail(&e, e.exit_code()))?;
    println!("{}", to_json(&elements, pretty)?);
    Ok(())
}

fn run_audit(documents: &DocumentArgs, json: bool) -> Result<(), u8> {
    let loaded = documents.load()?;
    let findings =
        check_unsupported_features(&loaded.schema, &loaded.uischema, &loaded.mods.registry());

    if json {
        println!("{}", to_json(&findings, false)?);
    } else {
        for finding in &findings {
            println!("{}", finding);
        }
    }
    Ok(())
}

fn run_edit(
    documents: &DocumentArgs,
    output: &OutputArgs,
    edit: impl FnOnce(&EditContext<'_>) -> Result<SchemaPair, u8>,
) -> Result<(), u8> {
    let loaded = documents.load()?;
    let ctx = EditContext::new(&loaded.schema, &loaded.uischema, &loaded.category_hash)
        .with_mods(&loaded.mods);
    let pair = edit(&ctx)?;

    match (&output.out_schema, &output.out_ui_schema) {
        (Some(schema_path), Some(ui_path)) => {
            write_document(schema_path, &pair.schema, output.pretty)
                .map_err(|e| fail(&e, e.exit_code()))?;
            write_document(ui_path, &pair.ui_schema, output.pretty)
                .map_err(|e| fail(&e, e.exit_code()))?;
        }
        _ => println!("{}", to_json(&pair, output.pretty)?),
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
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

/// Report an error on stderr and turn it into an exit status.
fn fail(error: &impl Display, code: i32) -> u8 {
    eprintln!("Error: {}", error);
    code as u8
}
