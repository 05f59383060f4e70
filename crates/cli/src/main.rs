use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use newsletter_core::email::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use newsletter_core::model::{DEFAULT_API_BASE, DEFAULT_MODEL};
use newsletter_core::{
    EmailRequest, Emailer, GeneratorConfig, OperationResult, ScrapeFailurePolicy, SmtpConfig, SmtpMailer, build_link,
    generate_content_with_config,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{print_banner, print_detail, print_error, print_info, print_step, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draft AI newsletters from reference pages, build blog links and mail announcements
#[derive(Parser, Debug)]
#[command(name = "newsletter")]
#[command(author = "Newsletter Contributors")]
#[command(version)]
#[command(about = "Draft AI newsletters from reference pages and mail them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write the JSON result to a file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a reference page and draft a newsletter from it
    Generate(GenerateArgs),
    /// Build a shareable blog page link
    Link(LinkArgs),
    /// Mail a newsletter announcement over SMTP
    Send(SendArgs),
    /// Print a shell completion script
    Completions {
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Prompt the newsletter title is derived from
    #[arg(long)]
    title: String,

    /// Category label stored on the draft
    #[arg(long)]
    category: String,

    /// Reference page URL
    #[arg(long, value_name = "URL")]
    link: String,

    /// Generative Language API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, value_name = "KEY")]
    api_key: String,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API base URL
    #[arg(long, default_value = DEFAULT_API_BASE, value_name = "URL")]
    api_base: String,

    /// Reference fetch timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for reference fetches
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Feed scrape errors to the model instead of failing
    #[arg(long)]
    pass_through_scrape_errors: bool,
}

#[derive(Args, Debug)]
struct LinkArgs {
    /// Blog page title
    #[arg(long)]
    title: String,

    /// Deployment kind (local, live)
    #[arg(long, value_name = "TYPE")]
    domain_type: String,

    /// Host name, optionally with a port
    #[arg(long, value_name = "DOMAIN")]
    domain_name: String,
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Recipient address
    #[arg(long, value_name = "EMAIL")]
    to: String,

    /// Sender address, also the SMTP username
    #[arg(long, value_name = "EMAIL")]
    from: String,

    /// Application password for the sender account
    #[arg(long, env = "SMTP_APP_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    app_password: String,

    /// Blog page URL the mail points to
    #[arg(long, value_name = "URL")]
    link: String,

    /// Newsletter title
    #[arg(long)]
    title: String,

    /// Short description shown under the title
    #[arg(long)]
    description: String,

    /// Mail subject
    #[arg(long)]
    subject: String,

    /// SMTP host
    #[arg(long, default_value = DEFAULT_SMTP_HOST, value_name = "HOST")]
    smtp_host: String,

    /// SMTP port (STARTTLS)
    #[arg(long, default_value_t = DEFAULT_SMTP_PORT, value_name = "PORT")]
    smtp_port: u16,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "warn,newsletter_core=debug,newsletter=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn write_output<T: Serialize>(cli: &Cli, value: &T) -> anyhow::Result<()> {
    let json = if cli.pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    let json = json.context("Failed to serialize result")?;

    match &cli.output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn report<T: Serialize>(cli: &Cli, result: &OperationResult<T>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(value) => {
            write_output(cli, value)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            write_output(cli, failure)?;
            print_error(&failure.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_generate(cli: &Cli, args: &GenerateArgs) -> anyhow::Result<ExitCode> {
    let policy =
        if args.pass_through_scrape_errors { ScrapeFailurePolicy::PassThrough } else { ScrapeFailurePolicy::Abort };

    let mut builder = GeneratorConfig::builder()
        .model(args.model.as_str())
        .api_base(args.api_base.as_str())
        .scrape_timeout(args.timeout)
        .on_scrape_failure(policy);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.as_str());
    }
    let config = builder.build();
    tracing::debug!(model = %config.model.model, api_base = %config.model.api_base, timeout = args.timeout, "generator configured");

    if cli.verbose {
        print_step(1, 2, &format!("Drafting from {}", args.link.bright_white().underline()));
        print_detail("Model", &config.model.model);
        print_detail("Category", &args.category);
        eprintln!();
    }

    let result = generate_content_with_config(&args.title, &args.category, &args.link, &args.api_key, &config).await;

    if cli.verbose {
        if let Ok(draft) = &result {
            print_detail("Title", &draft.title);
            print_detail("Sections", &draft.content.len().to_string());
            eprintln!();
        }
        print_step(2, 2, "Writing output");
    }

    report(cli, &result)
}

fn run_link(cli: &Cli, args: &LinkArgs) -> anyhow::Result<ExitCode> {
    if cli.verbose {
        print_step(1, 1, &format!("Building {} link for {}", args.domain_type, args.domain_name.bright_white()));
    }

    report(cli, &build_link(&args.title, &args.domain_type, &args.domain_name))
}

async fn run_send(cli: &Cli, args: &SendArgs) -> anyhow::Result<ExitCode> {
    let config = SmtpConfig { host: args.smtp_host.clone(), port: args.smtp_port };

    if cli.verbose {
        print_step(1, 2, &format!("Sending to {}", args.to.bright_white()));
        print_detail("Server", &format!("{}:{}", config.host, config.port));
        eprintln!();
    }

    let request = EmailRequest {
        to: &args.to,
        from: &args.from,
        subject: &args.subject,
        link: &args.link,
        title: &args.title,
        description: &args.description,
    };
    let mailer = SmtpMailer::new(config, args.from.as_str(), args.app_password.as_str());
    let result = Emailer::new(mailer).send(&request).await;

    if cli.verbose {
        print_step(2, 2, "Writing output");
    }

    report(cli, &result)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        if let Ok(path) = &dotenv {
            print_detail("Env file", &path.display().to_string());
        }
        eprintln!();
    }

    match &cli.command {
        Command::Generate(args) => run_generate(&cli, args).await,
        Command::Link(args) => run_link(&cli, args),
        Command::Send(args) => run_send(&cli, args).await,
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "newsletter", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
