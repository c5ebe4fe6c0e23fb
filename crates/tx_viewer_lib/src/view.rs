use serde::Serialize;

use crate::model::TransactionRecord;
use crate::repository::TransactionRepository;
use crate::router::transaction_path;
use crate::utils::format_value;

pub const EMPTY_LIST_MESSAGE: &str = "No transactions available yet";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum ListView {
    Loading,
    Error(String),
    Loaded(Vec<TransactionRecord>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum DetailView {
    Loading,
    Error(String),
    NotFound(String),
    Loaded(TransactionRecord),
}

impl ListView {
    pub async fn load(repository: &dyn TransactionRepository) -> Self {
        match repository.fetch_all().await {
            Ok(records) => ListView::Loaded(records),
            Err(err) => {
                log::warn!("Failed to load transactions: {}", err);
                ListView::Error(err.to_string())
            }
        }
    }
}

impl DetailView {
    pub async fn load(repository: &dyn TransactionRepository, hash: &str) -> Self {
        match repository.fetch_by_hash(hash).await {
            Ok(Some(record)) => DetailView::Loaded(record),
            Ok(None) => DetailView::NotFound(hash.to_string()),
            Err(err) => {
                log::warn!("Failed to load transaction {}: {}", hash, err);
                DetailView::Error(err.to_string())
            }
        }
    }
}

pub fn entry_line(record: &TransactionRecord, symbol: &str) -> String {
    format!(
        "{} {} sent from {} to {}",
        format_value(Some(record.value.as_str())),
        symbol,
        record.from,
        record.to
    )
}

fn detail_fields(record: &TransactionRecord, symbol: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Hash", record.hash.clone()),
        ("From", record.from.clone()),
        ("To", record.to.clone()),
        (
            "Value",
            format!("{} {}", format_value(Some(record.value.as_str())), symbol),
        ),
        ("Gas limit", record.gas_limit.clone()),
        ("Gas price", record.gas_price.clone()),
        ("Chain id", record.chain_id.clone()),
        ("Data", record.data.clone().unwrap_or_default()),
    ]
}

pub fn render_list_text(view: &ListView, symbol: &str) -> String {
    match view {
        ListView::Loading => "Loading...".to_string(),
        ListView::Error(msg) => format!("Error: {}", msg),
        ListView::Loaded(records) if records.is_empty() => EMPTY_LIST_MESSAGE.to_string(),
        ListView::Loaded(records) => records
            .iter()
            .map(|r| format!("{}  {}", entry_line(r, symbol), transaction_path(&r.hash)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_detail_text(view: &DetailView, symbol: &str) -> String {
    match view {
        DetailView::Loading => "Loading...".to_string(),
        DetailView::Error(msg) => format!("Error: {}", msg),
        DetailView::NotFound(hash) => format!("Transaction {} not found", hash),
        DetailView::Loaded(record) => detail_fields(record, symbol)
            .iter()
            .map(|(name, value)| format!("{:<10} {}", format!("{}:", name), value))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, header: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<header>{}</header>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        header,
        body
    )
}

pub fn render_list_html(view: &ListView, symbol: &str, header: &str) -> String {
    let body = match view {
        ListView::Loading => "<div class=\"loading\">Loading...</div>".to_string(),
        ListView::Error(msg) => format!("<div class=\"error\">Error: {}</div>", escape(msg)),
        ListView::Loaded(records) if records.is_empty() => {
            format!("<p>{}</p>", EMPTY_LIST_MESSAGE)
        }
        ListView::Loaded(records) => records
            .iter()
            .map(|r| {
                format!(
                    "<a class=\"transaction\" href=\"{}\"><b>{} {}</b> sent from <b>{}</b> to <b>{}</b></a>",
                    escape(&transaction_path(&r.hash)),
                    format_value(Some(r.value.as_str())),
                    escape(symbol),
                    escape(&r.from),
                    escape(&r.to)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };
    page("Transactions List", header, &body)
}

pub fn render_detail_html(view: &DetailView, symbol: &str, header: &str) -> String {
    let body = match view {
        DetailView::Loading => "<div class=\"loading\">Loading...</div>".to_string(),
        DetailView::Error(msg) => format!("<div class=\"error\">Error: {}</div>", escape(msg)),
        DetailView::NotFound(hash) => {
            format!("<p>Transaction {} not found</p>", escape(hash))
        }
        DetailView::Loaded(record) => {
            let rows = detail_fields(record, symbol)
                .iter()
                .map(|(name, value)| format!("<tr><th>{}</th><td>{}</td></tr>", name, escape(value)))
                .collect::<Vec<_>>()
                .join("\n");
            format!("<table>\n{}\n</table>\n<a href=\"/\">Back</a>", rows)
        }
    };
    page("Transaction", header, &body)
}

/// Navigation header: the active account, or a connect form when none is connected.
pub fn render_header_html(account: Option<&str>) -> String {
    match account {
        Some(account) => format!(
            "<a href=\"/\">Transactions List</a> <form method=\"post\" action=\"/send\"><input name=\"recipient\" placeholder=\"Recipient\"><input name=\"amount\" placeholder=\"Amount\"><button type=\"submit\">Send</button></form> <span class=\"account\">{}</span>",
            escape(account)
        ),
        None => "<a href=\"/\">Transactions List</a> <form method=\"post\" action=\"/connect\"><button type=\"submit\">Connect Wallet</button></form>".to_string(),
    }
}
