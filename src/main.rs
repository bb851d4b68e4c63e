use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::path::Path;
use tickle::output::{formatter_for, FormatOptions, OutputFormat};
use tickle::scanner::ScanOptions;
use tickle::{cli, config, filters, git, scanner, Config, Summary};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose);
    run(cli)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: cli::Cli) -> Result<()> {
    ensure!(cli.path.exists(), "Path does not exist: {}", cli.path.display());

    let config = config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut ignore_patterns = config.ignore.clone();
    ignore_patterns.extend(cli.ignore.iter().cloned());

    let options = ScanOptions {
        markers: cli.markers.clone().or(config.markers.clone()),
        ignore_patterns,
        sort_by: cli.sort.unwrap_or(config.sort_by),
        ignore_hidden: !(cli.include_hidden || config.include_hidden),
    };

    let format = cli.format.or(config.format);
    if cli.init_config {
        return init_config(&Config {
            markers: options.markers.clone(),
            ignore: options.ignore_patterns.clone(),
            sort_by: options.sort_by,
            include_hidden: !options.ignore_hidden,
            format,
        });
    }

    debug!(path = %cli.path.display(), ?options, "scanning");

    let mut tasks = scanner::scan_directory(&cli.path, &options);

    if cli.wants_attribution() {
        let repo = git::get_repository(&cli.path)?;
        if repo.is_none() {
            debug!("no git repository found, skipping attribution");
        }
        tasks = git::attribute_tasks(repo.as_ref(), tasks);
    }

    if let Some(ref older_than) = cli.older_than {
        tasks = filters::filter_by_age(tasks, older_than).context("Failed to filter by age")?;
    }

    if let Some(ref author) = cli.author {
        tasks = filters::filter_by_author(tasks, author);
    }

    let format = format.unwrap_or_default();
    let format_options = FormatOptions {
        color: !cli.no_color && cli.output.is_none(),
        verbose_attribution: cli.git_verbose,
    };

    let mut rendered = String::new();
    if format == OutputFormat::Text && !cli.no_summary {
        if let Some(panel) = Summary::from_tasks(&tasks).render(format_options.color) {
            rendered.push_str(&panel);
            rendered.push('\n');
        }
    }
    rendered.push_str(
        &formatter_for(format, format_options)
            .format(&tasks)
            .context("Failed to format tasks")?,
    );

    tickle::output::write_output(&rendered, cli.output.as_deref())
}

fn init_config(settings: &Config) -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);
    ensure!(!path.exists(), "{} already exists", path.display());

    config::save_config(settings, path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
