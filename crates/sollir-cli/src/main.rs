use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sollir_codegen::{CodegenOptions, DeployPlatform, OptLevel, SourceUnit, Target};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sollir")]
#[command(about = "SOLLIR - lower typed contract functions into block graphs")]
#[command(version = "0.1.0")]
#[command(author = "Gianluca Brigandi <gbrigand@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Compile {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "emit-ir")]
        action: Action,

        #[arg(long, value_enum, default_value = "ewasm")]
        target: TargetArg,

        #[arg(long, value_enum, default_value = "chain")]
        deploy: DeployArg,

        #[arg(short = 'O', long = "opt-level", default_value = "0")]
        opt_level: OptLevel,

        #[arg(long)]
        runtime: bool,

        #[arg(long)]
        hide_unreachable: bool,

        #[arg(long)]
        color: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    Debug {
        input: PathBuf,

        #[arg(short = 'O', long = "opt-level", default_value = "0")]
        opt_level: OptLevel,

        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    SyntaxOnly,
    AstDump,
    EmitIr,
    EmitJson,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    Ewasm,
    Evm,
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Ewasm => Target::Ewasm,
            TargetArg::Evm => Target::Evm,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeployArg {
    Normal,
    Chain,
}

impl From<DeployArg> for DeployPlatform {
    fn from(deploy: DeployArg) -> Self {
        match deploy {
            DeployArg::Normal => DeployPlatform::Normal,
            DeployArg::Chain => DeployPlatform::Chain,
        }
    }
}

struct CompileArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    action: Action,
    options: CodegenOptions,
    hide_unreachable: bool,
    color: bool,
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output,
            action,
            target,
            deploy,
            opt_level,
            runtime,
            hide_unreachable,
            color,
            verbose,
        } => {
            init_tracing(verbose);
            cmd_compile(CompileArgs {
                input,
                output,
                action,
                options: CodegenOptions {
                    target: target.into(),
                    deploy: deploy.into(),
                    opt_level,
                    runtime,
                },
                hide_unreachable,
                color,
                verbose,
            })
        }
        Commands::Debug {
            input,
            opt_level,
            verbose,
        } => {
            init_tracing(verbose);
            cmd_debug(input, opt_level, verbose)
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_unit(input: &Path) -> Result<SourceUnit> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", input.display()))
}

fn cmd_compile(args: CompileArgs) -> Result<()> {
    use colored::*;
    use sollir_emit::{write_contract, EmitterConfig, OutputFormat, VerbosityLevel};
    use std::fs;
    use std::time::Instant;

    if args.verbose {
        eprintln!("{}", " SOLLIR Compiler".bright_blue().bold());
        eprintln!("{}", "=".repeat(50).bright_blue());
        eprintln!(" Input: {}", args.input.display());
        if let Some(ref out) = args.output {
            eprintln!(" Output: {}", out.display());
        }
        eprintln!(" Action: {:?}", args.action);
        eprintln!(
            " Target: {:?}, deploy: {:?}, -{}",
            args.options.target, args.options.deploy, args.options.opt_level
        );
        eprintln!();
    }

    let start = Instant::now();
    let unit = load_unit(&args.input)?;

    let rendered = match args.action {
        Action::SyntaxOnly => {
            if args.verbose {
                eprintln!(
                    " {} {} function(s), {} event(s)",
                    "OK:".bright_green().bold(),
                    unit.functions.len(),
                    unit.events.len()
                );
            }
            return Ok(());
        }
        Action::AstDump => {
            let mut text = serde_json::to_string_pretty(&unit)?;
            text.push('\n');
            text
        }
        Action::EmitIr | Action::EmitJson => {
            let contract = sollir_codegen::compile_unit(&unit, args.options)
                .with_context(|| format!("failed to compile contract `{}`", unit.contract))?;
            debug!(
                target: "driver",
                contract = %contract.name,
                functions = contract.functions.len(),
                "compiled"
            );

            let config = EmitterConfig {
                use_colors: args.color && args.output.is_none(),
                show_unreachable: !args.hide_unreachable,
                verbosity: if args.verbose {
                    VerbosityLevel::Verbose
                } else {
                    VerbosityLevel::Normal
                },
                ..EmitterConfig::default()
            };
            let format = if args.action == Action::EmitJson {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };

            let mut buffer = Vec::new();
            write_contract(&mut buffer, &contract, format, &config)?;
            String::from_utf8(buffer)?
        }
    };

    if let Some(output_path) = args.output {
        fs::write(&output_path, &rendered)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        if args.verbose {
            eprintln!(
                "\n {} Compilation successful!",
                "SUCCESS:".bright_green().bold()
            );
            eprintln!("   Time: {:.3}s", start.elapsed().as_secs_f64());
            eprintln!("   Output: {}", output_path.display());
        }
    } else {
        print!("{}", rendered);
    }

    Ok(())
}

fn cmd_debug(input: PathBuf, opt_level: OptLevel, verbose: bool) -> Result<()> {
    use colored::*;

    let unit = load_unit(&input)?;
    let options = CodegenOptions {
        opt_level,
        ..CodegenOptions::default()
    };
    let contract = sollir_codegen::compile_unit(&unit, options)
        .with_context(|| format!("failed to compile contract `{}`", unit.contract))?;

    println!(
        "{}",
        format!(" Contract: {}", contract.name).bright_green().bold()
    );
    println!("{}", "=".repeat(60).bright_green());
    println!("Functions: {}", contract.functions.len());
    println!("Events: {}", contract.events.len());

    for function in contract.functions.values() {
        let unreachable = function
            .body
            .blocks
            .values()
            .filter(|b| !b.metadata.is_reachable)
            .count();

        println!("\n  {}", format!(" Function: {}", function.name()).bright_yellow());
        println!("     Signature: {}", function.signature.canonical());
        println!("     Blocks: {} ({} unreachable)", function.body.blocks.len(), unreachable);
        println!("     Locals: {}", function.body.locals.len());

        if verbose {
            for block in function.body.blocks.values() {
                println!(
                    "       {} {}: {} instructions{}",
                    block.id,
                    block.label,
                    block.instructions.len(),
                    if block.metadata.is_reachable {
                        ""
                    } else {
                        ", unreachable"
                    }
                );
            }
        }
    }

    Ok(())
}
