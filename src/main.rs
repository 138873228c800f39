#![allow(unused_assignments)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Glow Configuration Completion
///
/// Schema-driven completion for the Glow device configuration DSL.
#[derive(Parser)]
#[command(name = "glow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print completion suggestions for a position in a document
    Complete {
        /// Document to complete ("-" for stdin)
        file: PathBuf,

        /// Zero-based cursor line
        #[arg(short, long)]
        line: usize,

        /// Zero-based cursor column
        #[arg(short, long)]
        column: usize,

        /// Schema JSON file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Start Language Server Protocol server
    Lsp {
        /// Schema JSON file
        #[arg(short, long)]
        schema: PathBuf,

        /// Use stdio transport (default)
        #[arg(long)]
        stdio: bool,
    },

    /// Internal: Parse a document and print its tree (for debugging)
    #[command(hide = true)]
    Parse {
        /// Document to parse
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // Set up miette for nice error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Complete {
            file,
            line,
            column,
            schema,
        } => cmd_complete(file, line, column, schema),
        Commands::Lsp { schema, stdio } => cmd_lsp(schema, stdio),
        Commands::Parse { file } => cmd_parse(file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let exit_code = match &e {
                glow::GlowError::IoError { .. } => ExitCode::from(3),
                _ => ExitCode::from(1),
            };
            eprintln!("{:?}", miette::Report::new(e));
            exit_code
        }
    }
}

fn read_document(file: &PathBuf) -> glow::GlowResult<String> {
    if file.to_str() == Some("-") || file.to_str() == Some("/dev/stdin") {
        use std::io::Read;
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| glow::GlowError::io_error("<stdin>", &e))?;
        Ok(text)
    } else {
        std::fs::read_to_string(file).map_err(|e| glow::GlowError::io_error(file, &e))
    }
}

fn load_schema(path: &PathBuf) -> glow::GlowResult<glow::CoreSchema> {
    let data = std::fs::read_to_string(path).map_err(|e| glow::GlowError::io_error(path, &e))?;
    glow::CoreSchema::from_json(&data)
}

fn cmd_complete(
    file: PathBuf,
    line: usize,
    column: usize,
    schema: PathBuf,
) -> glow::GlowResult<()> {
    let core = load_schema(&schema)?;
    let text = read_document(&file)?;

    // The engine clamps positions; an out-of-range line from the CLI is a
    // caller mistake worth reporting instead.
    if line >= text.split('\n').count() {
        return Err(glow::GlowError::InvalidPosition { line, column });
    }

    let engine = glow::CompletionEngine::new(&core);
    let suggestions = engine.complete(&text, line, column);

    let json = serde_json::to_string_pretty(&suggestions).map_err(|e| {
        glow::GlowError::SchemaData {
            message: e.to_string(),
        }
    })?;
    println!("{}", json);

    Ok(())
}

fn cmd_lsp(schema: PathBuf, _stdio: bool) -> glow::GlowResult<()> {
    let core = load_schema(&schema)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| glow::GlowError::io_error("<runtime>", &e))?;

    rt.block_on(glow::lsp::run_server(core));
    Ok(())
}

fn cmd_parse(file: PathBuf) -> glow::GlowResult<()> {
    let text = read_document(&file)?;
    let tree = glow::DocumentTree::parse(&text);

    println!("Tree from {}:", file.display());
    println!("{:-<60}", "");
    print!("{}", tree.render_debug());

    Ok(())
}
