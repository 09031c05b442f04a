//! `apae` - CLI for apae-records
//!
//! Runs the HTTP server and offers direct access to the collection files.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::Value;
use tracing::{debug, info, warn};

use apae_records::cli::{Cli, Command, ConfigCommand, RecordsCommand, ServeCommand};
use apae_records::{init_logging, server, Catalog, Config, Fields, Resource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands load the file themselves
    if let Command::Config(config_cmd) = cli.command {
        return handle_config(cli.config, config_cmd);
    }

    let config = Config::load_from(cli.config.clone())?;
    debug!(data_dir = %config.data_dir().display(), "Configuration loaded");

    let catalog = Catalog::from_config(&config);

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, catalog, serve_cmd).await,
        Command::Init => handle_init(&catalog).await,
        Command::Status(status_cmd) => handle_status(&config, &catalog, status_cmd.json).await,
        Command::Records(records_cmd) => handle_records(&catalog, records_cmd).await,
        Command::Config(_) => Ok(()),
    }
}

async fn handle_serve(
    mut config: Config,
    catalog: Catalog,
    cmd: ServeCommand,
) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    if config.storage.create_missing {
        catalog.ensure_all().await?;
    } else {
        warn!("storage.create_missing is off, requests to missing collection files will fail");
    }

    info!(
        data_dir = %config.data_dir().display(),
        id_policy = %config.storage.id_policy,
        concurrency = %config.storage.concurrency,
        "Starting apae-records"
    );
    server::serve(Arc::new(catalog), &config.server).await?;
    Ok(())
}

async fn handle_init(catalog: &Catalog) -> anyhow::Result<()> {
    let created = catalog.ensure_all().await?;
    if created.is_empty() {
        println!("All collection files already exist.");
    } else {
        for resource in created {
            println!("Created empty collection: {resource}");
        }
    }
    Ok(())
}

async fn handle_status(config: &Config, catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    let mut rows = Vec::with_capacity(catalog.len());
    for (resource, collection) in catalog.iter() {
        let schema = collection.schema();
        let count = collection.count().await.map_err(|e| e.to_string());
        rows.push((resource, config.collection_path(schema), schema.mode, count));
    }

    if json {
        let status: Vec<Value> = rows
            .iter()
            .map(|(resource, path, mode, count)| {
                serde_json::json!({
                    "resource": resource,
                    "path": path,
                    "mode": mode,
                    "count": count.as_ref().ok(),
                    "error": count.as_ref().err(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("apae status");
        println!("-----------");
        println!("Data dir:      {}", config.data_dir().display());
        println!("Id policy:     {}", config.storage.id_policy);
        println!("Concurrency:   {}", config.storage.concurrency);
        println!();
        for (resource, path, mode, count) in &rows {
            let count = match count {
                Ok(n) => n.to_string(),
                Err(e) => format!("unreadable ({e})"),
            };
            println!(
                "{:<14} {:<14} {count:>8}  {}",
                resource.as_str(),
                mode.to_string(),
                path.display()
            );
        }
    }
    Ok(())
}

async fn handle_records(catalog: &Catalog, cmd: RecordsCommand) -> anyhow::Result<()> {
    let output = match cmd {
        RecordsCommand::List { resource } => {
            serde_json::to_value(lookup(catalog, resource.into())?.list().await?)?
        }
        RecordsCommand::Get { resource, id } => {
            serde_json::to_value(lookup(catalog, resource.into())?.get(&id).await?)?
        }
        RecordsCommand::Create { resource, data } => {
            let fields = parse_fields(&data)?;
            serde_json::to_value(lookup(catalog, resource.into())?.create(&fields).await?)?
        }
        RecordsCommand::Update { resource, id, data } => {
            let fields = parse_fields(&data)?;
            serde_json::to_value(
                lookup(catalog, resource.into())?
                    .update(&id, &fields)
                    .await?,
            )?
        }
        RecordsCommand::Delete { resource, id } => {
            let resource = Resource::from(resource);
            lookup(catalog, resource)?.delete(&id).await?;
            println!("Deleted {resource} {id}");
            return Ok(());
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn lookup(
    catalog: &Catalog,
    resource: Resource,
) -> anyhow::Result<Arc<dyn apae_records::RecordCollection>> {
    catalog
        .get(resource)
        .with_context(|| format!("no collection registered for {resource}"))
}

fn parse_fields(data: &str) -> anyhow::Result<Fields> {
    let value: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
    match value {
        Value::Object(fields) => Ok(fields),
        other => bail!("--data must be a JSON object, got {other}"),
    }
}

fn handle_config(
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data dir:        {}", config.data_dir().display());
                println!("  Id policy:       {}", config.storage.id_policy);
                println!("  Concurrency:     {}", config.storage.concurrency);
                println!("  Create missing:  {}", config.storage.create_missing);
                println!();
                println!("[Server]");
                println!("  Address:         {}", config.server.socket_addr());
                println!("  API prefix:      {}", config.server.api_prefix);
                println!("  CORS:            {}", config.server.cors);
                println!();
                println!("[Collections]");
                for resource in Resource::ALL {
                    let schema = resource.schema(&config.collections);
                    println!(
                        "  {:<14} {} ({})",
                        resource.as_str(),
                        schema.file_name,
                        schema.mode
                    );
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(config_path);
            let shown = path
                .clone()
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", shown.display());
            Config::load_from(path)?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
