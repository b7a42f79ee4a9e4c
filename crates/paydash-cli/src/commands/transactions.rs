use std::io::{self, BufRead, Write};

use paydash_core::dashboard::TransactionsPage;
use paydash_core::list_view::{FilterEffect, FilterUpdate, ListFilters, ListSnapshot};
use paydash_core::models::{Transaction, TransactionDetail, TransactionStatus};
use paydash_core::{DashboardApi, HttpDashboardApi};
use serde::Serialize;

use crate::cli::{TransactionCommands, TransactionListArgs};
use crate::commands::common::{format_transaction_lines, now_ms, relative_label, Context};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct TransactionListOutput<'a> {
    page: u32,
    total: u64,
    has_more: bool,
    transactions: &'a [Transaction],
}

pub async fn run_transactions(
    command: Option<TransactionCommands>,
    context: Context,
) -> Result<(), CliError> {
    context.require_session()?;
    let command = command.unwrap_or(TransactionCommands::List {
        query: TransactionListArgs::default(),
        json: false,
    });
    let limit = match &command {
        TransactionCommands::List { query, .. } | TransactionCommands::Browse { query } => {
            query.limit
        }
        TransactionCommands::Show { .. } => None,
    };
    let page_size = context.page_size(limit);
    let page = TransactionsPage::with_page_size(context.guard, context.api, page_size);

    match command {
        TransactionCommands::List { query, json } => {
            preset(&page, &query)?;
            page.list().refresh().await?;
            let snapshot = page.list().snapshot();
            if json {
                let output = TransactionListOutput {
                    page: snapshot.page,
                    total: snapshot.total,
                    has_more: snapshot.has_more,
                    transactions: &snapshot.items,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        TransactionCommands::Show { id, json } => {
            let detail = page.detail(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                for line in format_detail_lines(&detail)? {
                    println!("{line}");
                }
            }
        }
        TransactionCommands::Browse { query } => {
            preset(&page, &query)?;
            page.list().refresh().await?;
            print_snapshot(&page.list().snapshot());
            browse(&page).await?;
        }
    }
    Ok(())
}

fn preset<A: DashboardApi + Clone>(
    page: &TransactionsPage<A>,
    args: &TransactionListArgs,
) -> Result<(), CliError> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<TransactionStatus>)
        .transpose()?;
    let search = args
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(ToString::to_string);
    page.list().preset(ListFilters { search, status }, args.page);
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Page(u32),
    /// Update the search draft without fetching
    Search(String),
    /// Apply the search draft
    Submit,
    Status(Option<TransactionStatus>),
    Refresh,
    Show(String),
    Help,
    Quit,
}

pub fn parse_browse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    match verb {
        "" | "go" => Ok(BrowseCommand::Submit),
        "n" | "next" => Ok(BrowseCommand::Next),
        "p" | "prev" => Ok(BrowseCommand::Previous),
        "page" => rest
            .parse::<u32>()
            .map(BrowseCommand::Page)
            .map_err(|_| format!("'{rest}' is not a page number")),
        "/" | "s" | "search" => Ok(BrowseCommand::Search(rest.to_string())),
        "status" => match rest {
            "" | "all" => Ok(BrowseCommand::Status(None)),
            other => other
                .parse::<TransactionStatus>()
                .map(|status| BrowseCommand::Status(Some(status)))
                .map_err(|error| error.to_string()),
        },
        "r" | "refresh" => Ok(BrowseCommand::Refresh),
        "show" if !rest.is_empty() => Ok(BrowseCommand::Show(rest.to_string())),
        "h" | "help" | "?" => Ok(BrowseCommand::Help),
        "q" | "quit" | "exit" => Ok(BrowseCommand::Quit),
        other => line
            .strip_prefix('/')
            .map(|text| BrowseCommand::Search(text.trim().to_string()))
            .ok_or_else(|| format!("Unknown command '{other}'. Type 'help' for commands.")),
    }
}

const NO_MORE_PAGES: &str = "No more pages.";

const BROWSE_HELP: &str = "\
n, next             next page
p, prev             previous page
page <n>            jump to page n
/<text>, s <text>   edit search (press enter to apply)
status <s|all>      filter by pending, settled or failed
r, refresh          reload current page
show <id>           transaction detail
q, quit             leave";

async fn browse(page: &TransactionsPage<HttpDashboardApi>) -> Result<(), CliError> {
    let stdin = io::stdin();
    loop {
        let draft = page.list().snapshot().search_draft;
        if draft.is_empty() {
            eprint!("> ");
        } else {
            eprint!("[search: {draft}] > ");
        }
        io::stderr().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let command = match parse_browse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        let list = page.list();
        let (outcome, unchanged) = match command {
            BrowseCommand::Quit => return Ok(()),
            BrowseCommand::Help => {
                println!("{BROWSE_HELP}");
                continue;
            }
            BrowseCommand::Search(text) => {
                list.set_search_text(text);
                continue;
            }
            BrowseCommand::Show(id) => {
                match page.detail(&id).await {
                    Ok(detail) => {
                        for line in format_detail_lines(&detail)? {
                            println!("{line}");
                        }
                    }
                    Err(error) if error.is_session_invalid() => return Err(error.into()),
                    Err(error) => eprintln!("{error}"),
                }
                continue;
            }
            BrowseCommand::Submit => (list.submit_search().await, "Search unchanged."),
            BrowseCommand::Next => (list.next_page().await, NO_MORE_PAGES),
            BrowseCommand::Previous => (list.previous_page().await, NO_MORE_PAGES),
            BrowseCommand::Page(number) => (list.set_page(number).await, NO_MORE_PAGES),
            BrowseCommand::Status(status) => (
                list.set_filter(FilterUpdate::status(status))
                    .await
                    .map(|effect| effect == FilterEffect::Refetched),
                "Status filter unchanged.",
            ),
            BrowseCommand::Refresh => (list.refresh().await.map(|()| true), ""),
        };

        match outcome {
            Ok(true) => print_snapshot(&list.snapshot()),
            Ok(false) => eprintln!("{unchanged}"),
            Err(error) if error.is_session_invalid() => return Err(error.into()),
            Err(error) if error.is_retryable() => eprintln!("{error} (type 'r' to retry)"),
            Err(error) => eprintln!("{error}"),
        }
    }
}

pub fn snapshot_header(snapshot: &ListSnapshot<Transaction, TransactionStatus>) -> String {
    let mut header = format!("Page {} | {} total", snapshot.page, snapshot.total);
    if let Some(status) = snapshot.filters.status {
        header.push_str(&format!(" | status {status}"));
    }
    if let Some(search) = snapshot.filters.search.as_deref() {
        header.push_str(&format!(" | search \"{search}\""));
    }
    header
}

fn print_snapshot(snapshot: &ListSnapshot<Transaction, TransactionStatus>) {
    println!("{}", snapshot_header(snapshot));
    if snapshot.items.is_empty() {
        println!("No transactions match.");
        return;
    }
    for line in format_transaction_lines(&snapshot.items, now_ms()) {
        println!("{line}");
    }
    if snapshot.has_more {
        println!("(more on page {})", snapshot.page + 1);
    }
}

pub fn format_detail_lines(detail: &TransactionDetail) -> Result<Vec<String>, CliError> {
    let tx = &detail.transaction;
    let mut lines = vec![
        format!("id:        {}", tx.id),
        format!("type:      {}", tx.tx_type),
        format!("amount:    {} {}", tx.amount, tx.currency),
        format!("status:    {}", tx.status),
        format!(
            "customer:  {}",
            tx.customer_email.as_deref().unwrap_or("-")
        ),
        format!(
            "created:   {} ({})",
            tx.created_at,
            relative_label(&tx.created_at, now_ms())
        ),
    ];
    if let Some(metadata) = detail.metadata.as_ref().filter(|value| !value.is_null()) {
        lines.push("metadata:".to_string());
        lines.extend(
            serde_json::to_string_pretty(metadata)?
                .lines()
                .map(|line| format!("  {line}")),
        );
    }
    Ok(lines)
}
