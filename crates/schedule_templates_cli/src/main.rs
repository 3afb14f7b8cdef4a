//! Command-line front end for the schedule template repository.
//!
//! # Responsibility
//! - Stand in for the settings page: list, upload, select, delete, export.
//! - Enforce the `.xlsx` upload filter before handing files to core.

use clap::{Parser, Subcommand};
use log::info;
use schedule_templates_core::db::open_db;
use schedule_templates_core::{
    init_logging, ExportResolver, HttpTemplateFetcher, SqliteStore, Template, TemplateConfig,
    TemplateService,
};
use std::error::Error;
use std::path::{Path, PathBuf};

const UPLOAD_SUFFIX: &str = ".xlsx";

#[derive(Parser, Debug)]
#[command(name = "schedule-templates")]
#[command(version)]
#[command(about = "Manage spreadsheet templates used for schedule exports", long_about = None)]
struct Cli {
    /// SQLite file holding custom templates and the active selection
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Base URL that built-in template locators are fetched from
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "SCHEDULE_TEMPLATES_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in and custom templates
    #[clap(visible_alias = "ls")]
    List,
    /// Upload an .xlsx file as a new custom template
    Upload { path: PathBuf },
    /// Select the template used for the next export
    Select { id: String },
    /// Delete a custom template
    #[clap(visible_alias = "rm")]
    Delete { id: String },
    /// Show the active template
    Active,
    /// Write a template's spreadsheet bytes to a file
    Export {
        /// Template id; defaults to the active template
        #[arg(long)]
        id: Option<String>,
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = build_config(&cli)?;
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let service = TemplateService::new(SqliteStore::new(&conn));

    match cli.command {
        Commands::List => {
            let active_id = service.get_active_id();
            for template in service.list_all() {
                println!("{}", describe(&template, template.id == active_id));
            }
        }
        Commands::Upload { path } => {
            check_upload_suffix(&path)?;
            let template = service.ingest_file(&path)?;
            println!("uploaded {} ({})", template.id, template.name);
        }
        Commands::Select { id } => {
            service.set_active(&id)?;
            println!("active template: {id}");
        }
        Commands::Delete { id } => {
            if !service.delete_custom(&id)? {
                return Err(format!("custom template not found: {id}").into());
            }
            println!("deleted {id}");
        }
        Commands::Active => match service.get_active() {
            Some(template) => println!("{}", describe(&template, true)),
            None => println!("{} (missing)", service.get_active_id()),
        },
        Commands::Export { id, out } => {
            let resolver = ExportResolver::new(HttpTemplateFetcher::new(&config)?);
            let file = match id {
                Some(id) => {
                    let template = service
                        .find(&id)
                        .ok_or_else(|| format!("template not found: {id}"))?;
                    resolver.resolve(&template)?
                }
                None => resolver.resolve_active(&service)?,
            };
            file.write_to(&out)?;
            info!(
                "event=template_export module=cli status=ok bytes={}",
                file.len()
            );
            println!("wrote {} bytes to {}", file.len(), out.display());
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<TemplateConfig, Box<dyn Error>> {
    let mut config = TemplateConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.asset_base_url =
            schedule_templates_core::config::parse_base_url("--base-url", base_url)?;
    }
    Ok(config)
}

fn check_upload_suffix(path: &Path) -> Result<(), String> {
    let is_xlsx = path
        .file_name()
        .map(|name| name.to_string_lossy().ends_with(UPLOAD_SUFFIX))
        .unwrap_or(false);
    if is_xlsx {
        Ok(())
    } else {
        Err(format!(
            "`{}` must be an {UPLOAD_SUFFIX} file",
            path.display()
        ))
    }
}

fn describe(template: &Template, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    let kind = if template.is_built_in { "built-in" } else { "custom" };
    format!("{marker} {:<40} {:<8} {}", template.id, kind, template.name)
}

#[cfg(test)]
mod tests {
    use super::{check_upload_suffix, describe, Cli, Commands};
    use clap::Parser;
    use schedule_templates_core::built_in_templates;
    use std::path::{Path, PathBuf};

    #[test]
    fn upload_filter_accepts_only_xlsx() {
        assert!(check_upload_suffix(Path::new("/tmp/plan.xlsx")).is_ok());
        assert!(check_upload_suffix(Path::new("/tmp/plan.xls")).is_err());
        assert!(check_upload_suffix(Path::new("/tmp/plan.csv")).is_err());
    }

    #[test]
    fn export_parses_with_global_flags() {
        let cli = Cli::try_parse_from([
            "schedule-templates",
            "export",
            "--out",
            "out.xlsx",
            "--db",
            "/tmp/t.db",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
        match cli.command {
            Commands::Export { id, out } => {
                assert_eq!(id, None);
                assert_eq!(out, PathBuf::from("out.xlsx"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn describe_marks_active_template() {
        let line = describe(&built_in_templates()[0], true);
        assert!(line.starts_with("* template-1"));
        assert!(line.contains("built-in"));
    }
}
