mod echo;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use telepress_core::{
    AccountDetails, ClientConfig, PageOptions, Telegraph, ViewsPeriod, html_to_nodes, serialize_nodes,
};

use echo::{format_size, print_banner, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Publish articles to telegra.ph
#[derive(Parser, Debug)]
#[command(name = "telepress")]
#[command(author = "Telepress Contributors")]
#[command(version)]
#[command(about = "Publish articles to telegra.ph", long_about = None)]
struct Args {
    /// Access token (falls back to the TELEGRAPH_TOKEN environment variable)
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Enable verbose progress output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an HTML file to a telegra.ph content tree without publishing
    Convert {
        /// HTML file to convert, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Create a Telegraph account and print its access token
    CreateAccount {
        /// Account name shown in the editor
        #[arg(value_name = "SHORT_NAME")]
        short_name: String,

        /// Default author name used when creating new articles
        #[arg(long, value_name = "NAME")]
        author_name: Option<String>,

        /// Default profile link
        #[arg(long, value_name = "URL")]
        author_url: Option<String>,
    },

    /// Publish an HTML file as a new page
    Publish {
        /// HTML file to publish, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Page title
        #[arg(short, long, value_name = "TITLE")]
        title: String,

        /// Author name shown below the title
        #[arg(long, value_name = "NAME")]
        author_name: Option<String>,

        /// Profile link shown below the title
        #[arg(long, value_name = "URL")]
        author_url: Option<String>,
    },

    /// Replace the content of an existing page
    Edit {
        /// Path of the page to edit (the part after telegra.ph/)
        #[arg(value_name = "PATH")]
        path: String,

        /// HTML file with the new content, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// New page title
        #[arg(short, long, value_name = "TITLE")]
        title: String,
    },

    /// Fetch a page and print it as JSON
    Get {
        /// Path of the page
        #[arg(value_name = "PATH")]
        path: String,

        /// Include the content tree
        #[arg(long)]
        content: bool,
    },

    /// List pages belonging to the account
    List {
        /// Number of pages to return
        #[arg(long, default_value = "50", value_name = "NUM")]
        limit: u32,

        /// Sequence number of the first page to return
        #[arg(long, default_value = "0", value_name = "NUM")]
        offset: u32,
    },

    /// Show the view counter for a page
    Views {
        /// Path of the page
        #[arg(value_name = "PATH")]
        path: String,

        /// Limit the counter to a year
        #[arg(long, value_name = "YEAR")]
        year: Option<u16>,

        /// Limit the counter to a month (requires --year)
        #[arg(long, value_name = "MONTH")]
        month: Option<u8>,

        /// Limit the counter to a day (requires --month)
        #[arg(long, value_name = "DAY")]
        day: Option<u8>,

        /// Limit the counter to an hour (requires --day)
        #[arg(long, value_name = "HOUR")]
        hour: Option<u8>,
    },

    /// Upload an image or video to telegra.ph
    Upload {
        /// File to upload
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Read HTML from a file path or stdin when the input is "-".
fn read_input(input: &str, verbose: bool) -> anyhow::Result<String> {
    if input == "-" {
        if verbose {
            print_step(1, 2, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        if verbose {
            print_step(1, 2, &format!("Reading from file {}", input.bright_white()));
        }
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn resolve_token(args: &Args) -> Option<String> {
    args.token.clone().or_else(|| env::var("TELEGRAPH_TOKEN").ok())
}

fn build_client(args: &Args, require_token: bool) -> anyhow::Result<Telegraph> {
    let token = resolve_token(args);
    if require_token && token.is_none() {
        anyhow::bail!("No access token; pass --token or set TELEGRAPH_TOKEN");
    }

    let config = ClientConfig { timeout: args.timeout, ..Default::default() };
    Telegraph::with_config(config, token).context("Failed to build HTTP client")
}

fn write_output(output: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", content),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        print_banner();
    }

    match &args.command {
        Command::Convert { input, output, pretty } => {
            let html = read_input(input, args.verbose)?;
            if args.verbose {
                eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
                print_step(2, 2, "Converting to content tree");
            }

            let nodes = html_to_nodes(&html);
            let values = serialize_nodes(&nodes).context("Failed to serialize content tree")?;
            let json = if *pretty {
                serde_json::to_string_pretty(&values)?
            } else {
                serde_json::to_string(&values)?
            };
            write_output(output.as_ref(), &json)?;
        }

        Command::CreateAccount { short_name, author_name, author_url } => {
            let mut client = build_client(&args, false)?;
            if args.verbose {
                print_step(1, 1, &format!("Creating account {}", short_name.bright_white()));
            }

            let details = AccountDetails {
                author_name: author_name.clone(),
                author_url: author_url.clone(),
            };
            let account = client
                .create_account(short_name, &details, true)
                .await
                .context("Failed to create account")?;

            print_success("Account created");
            if let Some(token) = account.access_token {
                println!("{}", token);
            }
            if let Some(auth_url) = account.auth_url {
                print_info(&format!("Authorize a browser at {}", auth_url));
            }
        }

        Command::Publish { input, title, author_name, author_url } => {
            let html = read_input(input, args.verbose)?;
            let client = build_client(&args, false)?;
            if client.access_token().is_none() {
                print_warning("Publishing without a token; the page will not be editable later");
            }
            if args.verbose {
                print_step(2, 2, &format!("Publishing {}", title.bright_white()));
            }

            let options = PageOptions {
                author_name: author_name.clone(),
                author_url: author_url.clone(),
                return_content: false,
            };
            let page = client
                .create_page_html(title, &html, &options)
                .await
                .context("Failed to create page")?;

            print_success("Page published");
            println!("{}", page.url);
        }

        Command::Edit { path, input, title } => {
            let html = read_input(input, args.verbose)?;
            let client = build_client(&args, true)?;
            if args.verbose {
                print_step(2, 2, &format!("Editing {}", path.bright_white()));
            }

            let page = client
                .edit_page_html(path, title, &html, &PageOptions::default())
                .await
                .context("Failed to edit page")?;

            print_success("Page updated");
            println!("{}", page.url);
        }

        Command::Get { path, content } => {
            let client = build_client(&args, false)?;
            let page = client.get_page(path, *content).await.context("Failed to get page")?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }

        Command::List { limit, offset } => {
            let client = build_client(&args, true)?;
            let list = client
                .get_page_list(*limit, *offset)
                .await
                .context("Failed to list pages")?;

            if args.verbose {
                print_info(&format!("{} pages total", list.total_count));
            }
            for page in list.pages {
                println!("{}\t{}\t{}", page.path, page.views, page.title);
            }
        }

        Command::Views { path, year, month, day, hour } => {
            let client = build_client(&args, false)?;
            let period = ViewsPeriod { year: *year, month: *month, day: *day, hour: *hour };
            let views = client.get_views(path, &period).await.context("Failed to get views")?;
            println!("{}", views);
        }

        Command::Upload { file } => {
            let client = build_client(&args, false)?;
            if args.verbose {
                print_step(1, 1, &format!("Uploading {}", file.display().bright_white()));
            }

            let uploaded = client.upload_file(file).await.context("Failed to upload file")?;
            print_success("File uploaded");
            println!("https://telegra.ph{}", uploaded.src);
        }
    }

    Ok(())
}
