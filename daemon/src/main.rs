use std::{fs::File, io::Write, path::Path, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use earn_common::time::SystemClock;
use earn_daemon::{
    core::{config::Config, earning::EarningEngine, storage::RocksStorage},
    rpc::EarningRpcServer,
};
use env_logger::Env;
use log::{error, info};

#[actix_web::main]
async fn main() -> Result<()> {
    let mut config = Config::parse();
    if let Some(path) = config.config_file.as_ref() {
        if config.generate_config_template {
            if Path::new(path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let mut file = File::create(path).context("Error while creating config file")?;
            let json = serde_json::to_string_pretty(&config)
                .context("Error while serializing config file")?;
            file.write_all(json.as_bytes())
                .context("Error while writing config file")?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        let file = File::open(path).context("Error while opening config file")?;
        config = serde_json::from_reader(file).context("Error while reading config file")?;
    } else if config.generate_config_template {
        eprintln!("Provided config file path is required to generate the template with --config-file");
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .format_timestamp_millis()
        .init();

    info!("Opening storage at {}", config.dir_path);
    let storage = RocksStorage::new(&config.dir_path, &config.rocksdb)
        .context("Error while opening storage")?;

    let engine = Arc::new(EarningEngine::new(
        Arc::new(storage),
        &config.earning,
        Arc::new(SystemClock),
    ));
    engine
        .seed_plan_catalog()
        .await
        .context("Error while seeding the plan catalog")?;

    let server = EarningRpcServer::new(
        Arc::clone(&engine),
        &config.rpc_bind_address,
        config.rpc_threads,
    )
    .await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Error while waiting for shutdown signal: {}", e);
    }
    server.stop().await;

    Ok(())
}
