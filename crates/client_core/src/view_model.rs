//! UI state for the order desk and the pure transitions over it.
//!
//! Nothing here performs I/O. [`crate::OrderDesk`] runs the network calls and
//! feeds their results back through these functions.

use shared::domain::{Order, OrderDraft, OrderId};

use crate::{backend::Protocol, error::ClientError};

/// Pending values of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub product_name: String,
    pub quantity: u32,
    pub status: String,
}

impl OrderForm {
    pub fn set_product_name(&mut self, value: impl Into<String>) {
        self.product_name = value.into();
    }

    /// Stores the integer prefix of `raw`; anything else becomes 0.
    pub fn set_quantity_input(&mut self, raw: &str) {
        self.quantity = coerce_quantity(raw);
    }

    pub fn set_status(&mut self, value: impl Into<String>) {
        self.status = value.into();
    }

    pub fn to_draft(&self) -> OrderDraft {
        OrderDraft::new(self.product_name.clone(), self.quantity, self.status.clone())
    }

    fn validate(&self) -> Result<OrderDraft, ClientError> {
        if self.product_name.trim().is_empty() {
            return Err(ClientError::Validation("product name is required".into()));
        }
        if self.status.trim().is_empty() {
            return Err(ClientError::Validation("status is required".into()));
        }
        Ok(self.to_draft())
    }
}

/// Integer-prefix parsing of a quantity field.
///
/// Leading whitespace and a sign are skipped, then digits are read until the
/// first non-digit. No digits, or a negative value, yields 0; values past
/// `u32::MAX` saturate.
pub fn coerce_quantity(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Sequence number of a list refresh. Later tickets win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(OrderDraft),
    Update { id: OrderId, draft: OrderDraft },
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    protocol: Protocol,
    orders: Vec<Order>,
    form: OrderForm,
    editing: Option<OrderId>,
    last_error: Option<String>,
    issued_refreshes: u64,
    applied_refresh: u64,
}

impl ViewState {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut OrderForm {
        &mut self.form
    }

    pub fn editing_id(&self) -> Option<&OrderId> {
        self.editing.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn toggle_label(&self) -> String {
        format!("Switch to {} Mode", self.protocol.toggled().as_str().to_uppercase())
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing.is_some() {
            "Update Order"
        } else {
            "Create Order"
        }
    }

    /// Flips the protocol and returns the ticket for the one refresh that
    /// must follow.
    pub fn toggle_protocol(&mut self) -> RefreshTicket {
        self.protocol = self.protocol.toggled();
        self.begin_refresh()
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_refreshes += 1;
        RefreshTicket(self.issued_refreshes)
    }

    /// Replaces the list unless a newer refresh has already landed.
    pub fn apply_orders(&mut self, ticket: RefreshTicket, orders: Vec<Order>) -> bool {
        if ticket.0 <= self.applied_refresh {
            return false;
        }
        self.applied_refresh = ticket.0;
        self.orders = orders;
        true
    }

    pub fn begin_edit(&mut self, order: &Order) {
        self.form = OrderForm {
            product_name: order.product_name.clone(),
            quantity: order.quantity,
            status: order.status.clone(),
        };
        self.editing = Some(order.id.clone());
    }

    pub fn begin_edit_by_id(&mut self, id: &OrderId) -> Result<(), ClientError> {
        let order = self
            .orders
            .iter()
            .find(|order| &order.id == id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownOrder(id.to_string()))?;
        self.begin_edit(&order);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.reset_form();
    }

    /// What submitting the form right now would send.
    pub fn submission(&self) -> Result<Submission, ClientError> {
        let draft = self.form.validate()?;
        Ok(match &self.editing {
            Some(id) => Submission::Update {
                id: id.clone(),
                draft,
            },
            None => Submission::Create(draft),
        })
    }

    pub fn finish_submit(&mut self) {
        self.reset_form();
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn reset_form(&mut self) {
        self.form = OrderForm::default();
        self.editing = None;
    }
}
