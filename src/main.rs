mod options;

use std::env;

use structopt::StructOpt;
use tx_viewer_lib::config::Config;
use tx_viewer_lib::error::ViewerError;
use tx_viewer_lib::eth::parse_secret_key;
use tx_viewer_lib::model::TransactionPayload;
use tx_viewer_lib::runtime::{start_app, AppRuntime};
use tx_viewer_lib::server::run_server;
use tx_viewer_lib::view::{render_detail_text, render_list_text, DetailView, ListView};
use tx_viewer_lib::{err_custom_create, err_from};

use crate::options::{CliOptions, Command, SendOptions};

async fn send(runtime: &AppRuntime, options: &SendOptions) -> Result<(), ViewerError> {
    let wallet = runtime.connector.connect().await?;
    if let Some(wallet) = &wallet {
        println!("Active account: {:#x}", wallet.address);
    }

    let payload = TransactionPayload {
        recipient: options.recipient.clone(),
        amount: options.amount.clone(),
    };
    let record = runtime
        .flow
        .submit_reporting(wallet.as_ref(), &payload, |state| println!("{:?}", state))
        .await
        .map_err(|e| err_custom_create!("{}", e))?;
    println!("Transaction recorded, navigate to {}", runtime.router.location());
    println!(
        "{}",
        render_detail_text(&DetailView::Loaded(record), runtime.currency_symbol())
    );
    Ok(())
}

async fn main_internal() -> Result<(), ViewerError> {
    let dotenv_result = dotenv::dotenv();
    env_logger::init();
    if let Err(err) = dotenv_result {
        log::debug!("No .env file loaded: {}", err);
    }

    let cli = CliOptions::from_args();
    let mut config = Config::load(&cli.config)?;
    let secret_key = match env::var("ETH_PRIVATE_KEY") {
        Ok(key) => Some(parse_secret_key(&key)?),
        Err(_) => None,
    };

    match cli.command {
        Command::List => {
            let runtime = start_app(&config, secret_key)?;
            let view = ListView::load(runtime.repository.as_ref()).await;
            println!("{}", render_list_text(&view, runtime.currency_symbol()));
        }
        Command::Show { hash } => {
            let runtime = start_app(&config, secret_key)?;
            let view = DetailView::load(runtime.repository.as_ref(), &hash).await;
            println!("{}", render_detail_text(&view, runtime.currency_symbol()));
        }
        Command::Connect => {
            let runtime = start_app(&config, secret_key)?;
            match runtime.connector.connect().await? {
                Some(wallet) => println!("{:#x}", wallet.address),
                None => println!("No account available"),
            }
        }
        Command::Send(options) => {
            let runtime = start_app(&config, secret_key)?;
            send(&runtime, &options).await?;
        }
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            let runtime = start_app(&config, secret_key)?;
            run_server(runtime).await.map_err(err_from!())?;
        }
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), ViewerError> {
    match main_internal().await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}
