use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use tokio::sync::Mutex;

use crate::model::{TransactionPayload, TransactionRecord};
use crate::runtime::AppRuntime;
use crate::submission::SubmissionError;
use crate::view::{
    render_detail_html, render_header_html, render_list_html, DetailView, ListView,
};
use crate::wallet::ConnectedWallet;

pub struct ServerData {
    pub runtime: AppRuntime,
    pub wallet: Mutex<Option<ConnectedWallet>>,
}

impl ServerData {
    pub fn new(runtime: AppRuntime) -> Self {
        Self {
            runtime,
            wallet: Mutex::new(None),
        }
    }

    async fn account(&self) -> Option<String> {
        self.wallet
            .lock()
            .await
            .as_ref()
            .map(|w| format!("{:#x}", w.address))
    }

    /// Keeps the previous connection when the provider has no account or fails.
    async fn connect(&self) -> Result<Option<String>, String> {
        match self.runtime.connector.connect().await {
            Ok(Some(wallet)) => {
                let account = format!("{:#x}", wallet.address);
                *self.wallet.lock().await = Some(wallet);
                Ok(Some(account))
            }
            Ok(None) => Ok(self.account().await),
            Err(err) => {
                log::error!("Wallet connection failed: {}", err);
                Err(err.to_string())
            }
        }
    }

    async fn submit(
        &self,
        payload: &TransactionPayload,
    ) -> Result<TransactionRecord, SubmissionError> {
        let wallet = self.wallet.lock().await.clone();
        self.runtime.flow.submit(wallet.as_ref(), payload).await
    }
}

macro_rules! return_on_error {
    ( $e:expr ) => {
        match $e {
            Ok(x) => x,
            Err(err) => {
                return web::Json(json!({
                    "error": err.to_string()
                }))
            },
        }
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

pub async fn list_page(data: Data<Box<ServerData>>) -> impl Responder {
    let view = ListView::load(data.runtime.repository.as_ref()).await;
    let header = render_header_html(data.account().await.as_deref());
    html(render_list_html(
        &view,
        data.runtime.currency_symbol(),
        &header,
    ))
}

pub async fn transaction_page(data: Data<Box<ServerData>>, req: HttpRequest) -> impl Responder {
    let hash = req.match_info().get("hash").unwrap_or_default().to_string();
    let view = DetailView::load(data.runtime.repository.as_ref(), &hash).await;
    let header = render_header_html(data.account().await.as_deref());
    html(render_detail_html(
        &view,
        data.runtime.currency_symbol(),
        &header,
    ))
}

pub async fn connect_form(data: Data<Box<ServerData>>) -> impl Responder {
    match data.connect().await {
        Ok(Some(account)) => log::debug!("Form connect, active account {}", account),
        Ok(None) => log::debug!("Form connect, no account available"),
        Err(err) => log::debug!("Form connect failed, keeping previous state: {}", err),
    }
    redirect("/")
}

pub async fn send_form(
    data: Data<Box<ServerData>>,
    form: web::Form<TransactionPayload>,
) -> impl Responder {
    match data.submit(&form).await {
        Ok(_) => redirect(&data.runtime.router.location()),
        Err(_) => redirect("/"),
    }
}

pub async fn transactions(data: Data<Box<ServerData>>) -> impl Responder {
    let txs = return_on_error!(data.runtime.repository.fetch_all().await);
    web::Json(json!({
        "transactions": txs,
    }))
}

pub async fn transaction_details(
    data: Data<Box<ServerData>>,
    req: HttpRequest,
) -> impl Responder {
    let hash = return_on_error!(req.match_info().get("hash").ok_or("No hash provided"));
    let tx = return_on_error!(data.runtime.repository.fetch_by_hash(hash).await);
    match tx {
        Some(tx) => web::Json(json!({ "transaction": tx })),
        None => web::Json(json!({ "error": format!("Transaction {} not found", hash) })),
    }
}

pub async fn state(data: Data<Box<ServerData>>) -> impl Responder {
    web::Json(json!({
        "submission": data.runtime.flow.status().get(),
        "location": data.runtime.router.location(),
        "route": data.runtime.router.current(),
        "account": data.account().await,
    }))
}

pub async fn connect(data: Data<Box<ServerData>>) -> impl Responder {
    let account = return_on_error!(data.connect().await);
    web::Json(json!({
        "account": account,
    }))
}

pub async fn send(
    data: Data<Box<ServerData>>,
    payload: web::Json<TransactionPayload>,
) -> impl Responder {
    match data.submit(&payload).await {
        Ok(record) => web::Json(json!({
            "hash": record.hash,
            "location": data.runtime.router.location(),
        })),
        Err(SubmissionError::Unrecorded { tx_hash, source }) => web::Json(json!({
            "error": format!("transaction is on chain but was not recorded: {}", source),
            "stage": "Persisting",
            "txHash": tx_hash,
        })),
        Err(err) => web::Json(json!({
            "error": err.to_string(),
            "stage": err.stage(),
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list_page))
        .route("/transaction/{hash}", web::get().to(transaction_page))
        .route("/connect", web::post().to(connect_form))
        .route("/send", web::post().to(send_form))
        .route("/api/transactions", web::get().to(transactions))
        .route("/api/transaction/{hash}", web::get().to(transaction_details))
        .route("/api/state", web::get().to(state))
        .route("/api/connect", web::post().to(connect))
        .route("/api/send", web::post().to(send));
}

pub async fn run_server(runtime: AppRuntime) -> std::io::Result<()> {
    let listen = runtime.setup.listen.clone();
    let server_data = Data::new(Box::new(ServerData::new(runtime)));
    log::info!("Listening on http://{}", listen);
    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(server_data.clone())
            .configure(configure)
    })
    .bind(listen)?
    .run()
    .await
}
