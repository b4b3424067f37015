use clap::{Parser, Subcommand};
use ruc::cli::{
    decrypt_file, encrypt_file, export_schedule, hash_bytes, hash_file, show_info,
    DecryptOptions, EncryptOptions, HashOptions, ScheduleOptions,
};
use ruc::{Execution, KeyFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Version info from build.rs
const VERSION: &str = env!("RUC_VERSION");
const PROFILE: &str = env!("RUC_PROFILE");
const GIT_HASH: &str = env!("RUC_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "ruc")]
#[command(author, about = "Random Universe Cipher: batch block encryption and SHAKE256 tooling", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into an authenticated envelope
    #[command(alias = "e")]
    Encrypt {
        /// Master key
        #[arg(long, required = true)]
        key: String,

        /// How to read the key
        #[arg(long, default_value = "text", value_parser = parse_key_format)]
        key_format: KeyFormat,

        /// Block scheduling
        #[arg(long, default_value = "parallel", value_parser = parse_execution)]
        execution: Execution,

        /// Exported key schedule to reuse instead of deriving
        #[arg(long)]
        schedule: Option<PathBuf>,

        /// Input file
        input: PathBuf,

        /// Output envelope
        output: PathBuf,
    },

    /// Verify and decrypt an envelope
    #[command(alias = "d")]
    Decrypt {
        /// Master key
        #[arg(long, required = true)]
        key: String,

        /// How to read the key
        #[arg(long, default_value = "text", value_parser = parse_key_format)]
        key_format: KeyFormat,

        /// Block scheduling
        #[arg(long, default_value = "parallel", value_parser = parse_execution)]
        execution: Execution,

        /// Exported key schedule to reuse instead of deriving
        #[arg(long)]
        schedule: Option<PathBuf>,

        /// Input envelope
        input: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// SHAKE256 of a file or a string
    #[command(alias = "h")]
    Hash {
        /// Output length in bytes
        #[arg(long, default_value = "32")]
        length: usize,

        /// Hash this string instead of a file
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// File to hash
        file: Option<PathBuf>,
    },

    /// Derive a key schedule and export it as JSON
    #[command(alias = "s")]
    Schedule {
        /// Master key
        #[arg(long, required = true)]
        key: String,

        /// How to read the key
        #[arg(long, default_value = "text", value_parser = parse_key_format)]
        key_format: KeyFormat,

        /// Output JSON file
        output: PathBuf,
    },

    /// Show information about an envelope
    #[command(alias = "i")]
    Info {
        /// Envelope to inspect
        file: PathBuf,
    },
}

fn parse_key_format(s: &str) -> Result<KeyFormat, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_execution(s: &str) -> Result<Execution, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("ruc {}", get_version());
        return ExitCode::SUCCESS;
    }

    init_logging(&cli.log_level);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Encrypt {
            key,
            key_format,
            execution,
            schedule,
            input,
            output,
        } => {
            let options = EncryptOptions {
                key,
                key_format,
                execution,
                schedule,
            };
            encrypt_file(&input, &output, &options).map(|written| {
                println!("Encrypted {} -> {} ({} bytes)", input.display(), output.display(), written);
            })
        }

        Commands::Decrypt {
            key,
            key_format,
            execution,
            schedule,
            input,
            output,
        } => {
            let options = DecryptOptions {
                key,
                key_format,
                execution,
                schedule,
            };
            decrypt_file(&input, &output, &options).map(|written| {
                println!("Decrypted {} -> {} ({} bytes)", input.display(), output.display(), written);
            })
        }

        Commands::Hash { length, text, file } => {
            let options = HashOptions { length };
            let digest = match (text, file) {
                (Some(text), _) => hash_bytes(text.as_bytes(), &options),
                (None, Some(file)) => hash_file(&file, &options),
                (None, None) => hash_bytes(b"", &options),
            };
            digest.map(|d| println!("{}", d))
        }

        Commands::Schedule {
            key,
            key_format,
            output,
        } => {
            let options = ScheduleOptions { key, key_format };
            export_schedule(&output, &options)
                .map(|()| println!("Key schedule written to {}", output.display()))
        }

        Commands::Info { file } => show_info(&file).map(|info| print!("{}", info)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
