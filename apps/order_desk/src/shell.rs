//! Line-oriented front end over [`OrderDesk`], one command per line.

use client_core::OrderDesk;
use shared::domain::OrderId;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::render;

pub const HELP: &str = "\
commands:
  list              refresh the order list
  toggle            switch between SOAP and REST
  name <text>       set the product name
  qty <text>        set the quantity (non-numeric becomes 0)
  status <text>     set the status
  edit <id>         load an order into the form
  cancel            clear the form and stop editing
  submit            create, or update the order being edited
  delete <id>       delete an order
  show              print the current view
  help              print this help
  quit              leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Toggle,
    Name(String),
    Quantity(String),
    Status(String),
    Edit(OrderId),
    Cancel,
    Submit,
    Delete(OrderId),
    Show,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let id = |rest: &str| {
        if rest.is_empty() {
            Err(format!("{verb} needs an order id"))
        } else {
            Ok(OrderId::new(rest))
        }
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "refresh" => ShellCommand::List,
        "toggle" => ShellCommand::Toggle,
        "name" => ShellCommand::Name(rest.to_string()),
        "qty" | "quantity" => ShellCommand::Quantity(rest.to_string()),
        "status" => ShellCommand::Status(rest.to_string()),
        "edit" => ShellCommand::Edit(id(rest)?),
        "cancel" => ShellCommand::Cancel,
        "submit" => ShellCommand::Submit,
        "delete" | "rm" => ShellCommand::Delete(id(rest)?),
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}; try help")),
    };
    Ok(Some(command))
}

/// Runs commands until `quit` or end of input. Failed operations are
/// reported and the loop continues.
pub async fn run(desk: &OrderDesk) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    // The view below shows the recorded error; keep the shell open.
    if let Err(error) = desk.mount().await {
        warn!(%error, "initial order load failed");
    }
    stdout
        .write_all(render::desk_view(&desk.snapshot().await).as_bytes())
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                stdout.write_all(format!("{message}\n").as_bytes()).await?;
                continue;
            }
        };

        let result = match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                stdout.write_all(format!("{HELP}\n").as_bytes()).await?;
                continue;
            }
            ShellCommand::Show => Ok(()),
            ShellCommand::List => desk.refresh().await,
            ShellCommand::Toggle => desk.toggle_protocol().await.map(|_| ()),
            ShellCommand::Name(value) => {
                desk.update_form(|form| form.set_product_name(value)).await;
                Ok(())
            }
            ShellCommand::Quantity(value) => {
                desk.update_form(|form| form.set_quantity_input(&value)).await;
                Ok(())
            }
            ShellCommand::Status(value) => {
                desk.update_form(|form| form.set_status(value)).await;
                Ok(())
            }
            ShellCommand::Edit(id) => desk.edit(&id).await,
            ShellCommand::Cancel => {
                desk.cancel_edit().await;
                Ok(())
            }
            ShellCommand::Submit => desk.submit().await,
            ShellCommand::Delete(id) => desk.delete(&id).await,
        };

        if let Err(error) = result {
            stdout.write_all(format!("error: {error}\n").as_bytes()).await?;
        }
        stdout
            .write_all(render::desk_view(&desk.snapshot().await).as_bytes())
            .await?;
    }

    Ok(())
}
