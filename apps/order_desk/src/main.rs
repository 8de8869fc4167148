use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{OrderDesk, Protocol};
use shared::domain::{Order, OrderDraft, OrderId};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

#[derive(Parser, Debug)]
#[command(name = "order_desk", about = "View and edit orders over SOAP or REST")]
struct Args {
    /// Backend protocol: soap or rest.
    #[arg(long, global = true)]
    protocol: Option<Protocol>,
    #[arg(long, global = true)]
    soap_url: Option<String>,
    /// Base url of the REST surface; `/api/Order` is appended.
    #[arg(long, global = true)]
    rest_url: Option<String>,
    /// Orders per SOAP `GetOrders` page.
    #[arg(long, global = true)]
    page_size: Option<u32>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current order list.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create an order.
    Create(OrderFields),
    /// Update an order; fields not given keep their current value.
    Update {
        id: String,
        #[command(flatten)]
        fields: OrderFields,
    },
    /// Delete an order.
    Delete { id: String },
    /// Interactive session.
    Shell,
}

#[derive(ClapArgs, Debug)]
struct OrderFields {
    #[arg(long)]
    product_name: Option<String>,
    /// Parsed like a form field: non-numeric input becomes 0.
    #[arg(long)]
    quantity: Option<String>,
    #[arg(long)]
    status: Option<String>,
}

impl OrderFields {
    /// The full order when every field was given, so no lookup is needed.
    fn complete(&self, id: &OrderId) -> Option<Order> {
        let product_name = self.product_name.clone()?;
        let quantity = client_core::view_model::coerce_quantity(self.quantity.as_deref()?);
        let status = self.status.clone()?;
        Some(OrderDraft::new(product_name, quantity, status).with_id(id.clone()))
    }

    async fn apply(self, desk: &OrderDesk) {
        desk.update_form(|form| {
            if let Some(v) = self.product_name {
                form.set_product_name(v);
            }
            if let Some(v) = self.quantity {
                form.set_quantity_input(&v);
            }
            if let Some(v) = self.status {
                form.set_status(v);
            }
        })
        .await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(protocol) = args.protocol {
        settings.protocol = protocol;
    }
    if let Some(url) = args.soap_url {
        settings.soap_url = url;
    }
    if let Some(url) = args.rest_url {
        settings.rest_base_url = url;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }

    let desk = OrderDesk::from_settings(&settings).context("invalid client settings")?;

    match args.command {
        Command::List { json } => {
            desk.mount().await.context("failed to fetch orders")?;
            let state = desk.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(state.orders())?);
            } else {
                print!("{}", render::orders_table(state.orders()));
            }
        }
        Command::Create(fields) => {
            fields.apply(&desk).await;
            desk.submit().await.context("failed to create order")?;
            print!("{}", render::orders_table(desk.snapshot().await.orders()));
        }
        Command::Update { id, fields } => {
            let id = OrderId::new(id);
            match fields.complete(&id) {
                Some(order) => desk.edit_order(&order).await,
                None => {
                    // Partial updates need the current values from the list,
                    // which in SOAP mode is a single page.
                    desk.mount().await.context("failed to fetch orders")?;
                    desk.edit(&id).await.with_context(|| {
                        format!(
                            "order {id} is not in the fetched list; raise --page-size \
                             or pass --product-name, --quantity and --status"
                        )
                    })?;
                    fields.apply(&desk).await;
                }
            }
            desk.submit()
                .await
                .with_context(|| format!("failed to update order {id}"))?;
            print!("{}", render::orders_table(desk.snapshot().await.orders()));
        }
        Command::Delete { id } => {
            let id = OrderId::new(id);
            desk.delete(&id)
                .await
                .with_context(|| format!("failed to delete order {id}"))?;
            print!("{}", render::orders_table(desk.snapshot().await.orders()));
        }
        Command::Shell => shell::run(&desk).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args = Args::try_parse_from([
            "order_desk",
            "update",
            "12",
            "--quantity",
            "abc",
            "--protocol",
            "rest",
        ])
        .expect("args");
        assert_eq!(args.protocol, Some(Protocol::Rest));
        match args.command {
            Command::Update { id, fields } => {
                assert_eq!(id, "12");
                assert_eq!(fields.quantity.as_deref(), Some("abc"));
                assert!(fields.product_name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_with_every_field_needs_no_lookup() {
        let args = Args::try_parse_from([
            "order_desk",
            "update",
            "12",
            "--product-name",
            "Lamp",
            "--quantity",
            "3x",
            "--status",
            "Shipped",
        ])
        .expect("args");
        let Command::Update { id, fields } = args.command else {
            panic!("expected update");
        };
        let id = OrderId::new(id);
        assert_eq!(
            fields.complete(&id),
            Some(OrderDraft::new("Lamp", 3, "Shipped").with_id(OrderId::new("12")))
        );
    }

    #[test]
    fn partial_update_falls_back_to_the_list() {
        let fields = OrderFields {
            product_name: None,
            quantity: None,
            status: Some("Shipped".into()),
        };
        assert!(fields.complete(&OrderId::new("12")).is_none());
    }

    #[tokio::test]
    async fn complete_update_reaches_an_order_past_the_first_page() {
        use std::sync::Arc;

        use client_core::{BackendSet, ClientResult, OrderBackend};
        use tokio::sync::Mutex;

        #[derive(Default)]
        struct FirstPageOnly {
            updates: Mutex<Vec<(OrderId, OrderDraft)>>,
        }

        #[async_trait::async_trait]
        impl OrderBackend for FirstPageOnly {
            fn protocol(&self) -> Protocol {
                Protocol::Soap
            }
            async fn list_orders(&self) -> ClientResult<Vec<Order>> {
                Ok((1..=10u32)
                    .map(|n| {
                        OrderDraft::new("Item", n, "Open").with_id(OrderId::from(u64::from(n)))
                    })
                    .collect())
            }
            async fn create_order(&self, _draft: &OrderDraft) -> ClientResult<()> {
                Ok(())
            }
            async fn update_order(&self, id: &OrderId, draft: &OrderDraft) -> ClientResult<()> {
                self.updates.lock().await.push((id.clone(), draft.clone()));
                Ok(())
            }
            async fn delete_order(&self, _id: &OrderId) -> ClientResult<()> {
                Ok(())
            }
        }

        let soap = Arc::new(FirstPageOnly::default());
        let desk = OrderDesk::new(
            BackendSet::new(soap.clone(), Arc::new(FirstPageOnly::default())),
            Protocol::Soap,
        );
        let id = OrderId::new("12");
        let fields = OrderFields {
            product_name: Some("Lamp".into()),
            quantity: Some("2".into()),
            status: Some("Shipped".into()),
        };

        let order = fields.complete(&id).expect("complete");
        desk.edit_order(&order).await;
        desk.submit().await.expect("submit");

        assert_eq!(
            *soap.updates.lock().await,
            vec![(id, OrderDraft::new("Lamp", 2, "Shipped"))]
        );
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        assert!(Args::try_parse_from(["order_desk", "--protocol", "grpc", "list"]).is_err());
    }
}
