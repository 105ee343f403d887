use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("telepress")
        .version("0.3.0")
        .author("Telepress Contributors")
        .about("Publish articles to telegra.ph")
        .arg(clap::arg!(--token <TOKEN> "Access token (falls back to TELEGRAPH_TOKEN)").global(true))
        .arg(
            clap::arg!(--timeout <SECS> "HTTP timeout in seconds")
                .default_value("30")
                .global(true),
        )
        .arg(clap::arg!(-v --verbose "Enable verbose progress output").global(true))
        .subcommand(
            clap::Command::new("convert")
                .about("Convert an HTML file to a telegra.ph content tree")
                .arg(clap::arg!(<INPUT> "HTML file to convert, or '-' for stdin"))
                .arg(
                    clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(clap::arg!(--pretty "Pretty-print the JSON output")),
        )
        .subcommand(
            clap::Command::new("create-account")
                .about("Create a Telegraph account and print its access token")
                .arg(clap::arg!(<SHORT_NAME> "Account name shown in the editor"))
                .arg(clap::arg!(--author_name <NAME> "Default author name"))
                .arg(clap::arg!(--author_url <URL> "Default profile link")),
        )
        .subcommand(
            clap::Command::new("publish")
                .about("Publish an HTML file as a new page")
                .arg(clap::arg!(<INPUT> "HTML file to publish, or '-' for stdin"))
                .arg(clap::arg!(-t --title <TITLE> "Page title").required(true))
                .arg(clap::arg!(--author_name <NAME> "Author name shown below the title"))
                .arg(clap::arg!(--author_url <URL> "Profile link shown below the title")),
        )
        .subcommand(
            clap::Command::new("edit")
                .about("Replace the content of an existing page")
                .arg(clap::arg!(<PATH> "Path of the page to edit"))
                .arg(clap::arg!(<INPUT> "HTML file with the new content, or '-' for stdin"))
                .arg(clap::arg!(-t --title <TITLE> "New page title").required(true)),
        )
        .subcommand(
            clap::Command::new("get")
                .about("Fetch a page and print it as JSON")
                .arg(clap::arg!(<PATH> "Path of the page"))
                .arg(clap::arg!(--content "Include the content tree")),
        )
        .subcommand(
            clap::Command::new("list")
                .about("List pages belonging to the account")
                .arg(clap::arg!(--limit <NUM> "Number of pages to return").default_value("50"))
                .arg(clap::arg!(--offset <NUM> "Sequence number of the first page").default_value("0")),
        )
        .subcommand(
            clap::Command::new("views")
                .about("Show the view counter for a page")
                .arg(clap::arg!(<PATH> "Path of the page"))
                .arg(clap::arg!(--year <YEAR> "Limit to a year"))
                .arg(clap::arg!(--month <MONTH> "Limit to a month"))
                .arg(clap::arg!(--day <DAY> "Limit to a day"))
                .arg(clap::arg!(--hour <HOUR> "Limit to an hour")),
        )
        .subcommand(
            clap::Command::new("upload")
                .about("Upload an image or video to telegra.ph")
                .arg(
                    clap::arg!(<FILE> "File to upload")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "telepress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "telepress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "telepress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "telepress", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
