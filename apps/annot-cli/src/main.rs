//! Annot CLI - article dashboard, entry coding and export
//!
//! Each invocation runs one interaction cycle against the configured
//! codebook, catalog and annotation database.

mod cli;
mod render;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use annot_core::{
    AnnotConfig, AnnotationKey, Annotator, DashboardQuery, Notice, NoticeLevel, Session,
};

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = AnnotConfig::load(cli.config.as_deref())?;
    let mut annotator = Annotator::open(&config)?;
    for notice in annotator.startup_notices() {
        eprintln!("{}", notice);
    }

    match cli.command {
        Commands::Dashboard {
            status,
            search,
            sort,
            desc,
            group,
        } => {
            let query = DashboardQuery {
                status,
                search,
                sort,
                descending: desc,
            };
            let page = annotator.dashboard(&query);
            if let Some(notice) = &page.notice {
                eprintln!("{}", notice);
            }
            print!("{}", render::dashboard(&page, group.as_deref()));
        }

        Commands::Show {
            article_index,
            experiment,
            mode,
        } => {
            let session = match article_index {
                Some(index) => {
                    let key = AnnotationKey::new(index, experiment);
                    let row = annotator
                        .find_row(&key)
                        .ok_or_else(|| format!("{} is not in the catalog", key))?;
                    let mut session = Session::new();
                    session.select(row)?;
                    session
                }
                None => Session::from_query(mode.as_deref()),
            };
            match annotator.open_entry(&session) {
                Ok(form) => print!("{}", render::form(&form)),
                Err(notice) => report(&notice)?,
            }
        }

        Commands::Annotate {
            article_index,
            experiment,
            values,
            metadata,
            clear,
        } => {
            let key = AnnotationKey::new(article_index, experiment);
            let row = annotator
                .find_row(&key)
                .ok_or_else(|| format!("{} is not in the catalog", key))?;

            let mut session = Session::new();
            session.select(row)?;
            let mut form = annotator
                .open_entry(&session)
                .map_err(|notice| notice.message)?;

            if clear {
                form.request_clear();
                form.confirm_clear();
            }
            for (name, value) in &metadata {
                form.set_metadata(name, value)?;
            }
            for (code, value) in &values {
                form.set_from_str(code, value)?;
            }

            report(&annotator.submit(&form))?;
            session.return_to_dashboard()?;
        }

        Commands::Export => report(&annotator.export())?,

        Commands::Codebook => print!("{}", render::codebook(&annotator.codebook_listing())),
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a notice; error notices become the process error.
fn report(notice: &Notice) -> Result<(), Box<dyn std::error::Error>> {
    match notice.level {
        NoticeLevel::Error => Err(notice.message.clone().into()),
        NoticeLevel::Warning => {
            eprintln!("{}", notice);
            Ok(())
        }
        NoticeLevel::Success | NoticeLevel::Info => {
            println!("{}", notice.message);
            Ok(())
        }
    }
}
