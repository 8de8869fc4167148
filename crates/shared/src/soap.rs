//! SOAP envelope codec for the order service.
//!
//! Envelopes are assembled as an [`XmlNode`] tree and serialized through
//! quick-xml, so text content is always escaped. Responses are parsed into
//! the same tree and queried by qualified tag name.

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::{
    domain::{Order, OrderDraft, OrderId},
    error::SoapError,
    protocol::{
        SoapOperation, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, ORDER_MODELS_NS, SOAP_ENVELOPE_NS,
        TEMPURI_NS, XML_SCHEMA_INSTANCE_NS,
    },
};

pub const ORDER_TAG: &str = "d4p1:Order";
pub const ORDER_ID_TAG: &str = "d4p1:Id";
pub const PRODUCT_NAME_TAG: &str = "d4p1:ProductName";
pub const QUANTITY_TAG: &str = "d4p1:Quantity";
pub const STATUS_TAG: &str = "d4p1:Status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    Element(XmlNode),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub content: Vec<XmlContent>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Leaf element holding only text.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(XmlContent::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.content.push(XmlContent::Element(child));
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.content
            .extend(children.into_iter().map(XmlContent::Element));
        self
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.content.iter().filter_map(|content| match content {
            XmlContent::Element(node) => Some(node),
            XmlContent::Text(_) => None,
        })
    }

    /// All elements with the given qualified name, this node included, in
    /// document order.
    pub fn elements_named<'a>(&'a self, name: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        self.collect(&mut |node: &XmlNode| node.name == name, &mut found);
        found
    }

    /// First descendant (excluding this node) with the given qualified name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        self.find_descendant(&|node: &XmlNode| node.name == name)
    }

    /// First descendant (excluding this node) with the given local name,
    /// whatever its prefix.
    pub fn find_local(&self, local: &str) -> Option<&XmlNode> {
        self.find_descendant(&|node: &XmlNode| node.local_name() == local)
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text_content(&mut out);
        out
    }

    fn push_text_content(&self, out: &mut String) {
        for content in &self.content {
            match content {
                XmlContent::Text(text) => out.push_str(text),
                XmlContent::Element(child) => child.push_text_content(out),
            }
        }
    }

    fn find_descendant(&self, pred: &dyn Fn(&XmlNode) -> bool) -> Option<&XmlNode> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    fn collect<'a>(&'a self, pred: &mut dyn FnMut(&XmlNode) -> bool, out: &mut Vec<&'a XmlNode>) {
        if pred(self) {
            out.push(self);
        }
        for child in self.child_elements() {
            child.collect(pred, out);
        }
    }
}

pub fn write_document(root: &XmlNode) -> Result<String, SoapError> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, root)?;
    String::from_utf8(writer.into_inner()).map_err(|e| SoapError::Write(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), SoapError> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.content.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| SoapError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| SoapError::Write(e.to_string()))?;
    for content in &node.content {
        match content {
            XmlContent::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| SoapError::Write(e.to_string()))?,
            XmlContent::Element(child) => write_node(writer, child)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(|e| SoapError::Write(e.to_string()))
}

pub fn parse_document(xml: &str) -> Result<XmlNode, SoapError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| SoapError::Malformed(e.to_string()))?
        {
            Event::Start(start) => stack.push(node_from_start(&start)?),
            Event::Empty(start) => {
                let node = node_from_start(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| SoapError::Malformed("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| SoapError::Malformed(e.to_string()))?;
                    parent.content.push(XmlContent::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.content.push(XmlContent::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SoapError::Malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| SoapError::Malformed("document has no root element".into()))
}

fn node_from_start(start: &BytesStart<'_>) -> Result<XmlNode, SoapError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| SoapError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| SoapError::Malformed(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), SoapError> {
    if let Some(parent) = stack.last_mut() {
        parent.content.push(XmlContent::Element(node));
        return Ok(());
    }
    if root.is_some() {
        return Err(SoapError::Malformed("multiple root elements".into()));
    }
    *root = Some(node);
    Ok(())
}

/// A call against the order service, as carried in a SOAP body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapRequest {
    GetOrders { page_number: u32, page_size: u32 },
    CreateOrder(OrderDraft),
    UpdateOrder { id: OrderId, draft: OrderDraft },
    DeleteOrder { id: OrderId },
}

impl SoapRequest {
    pub fn operation(&self) -> SoapOperation {
        match self {
            SoapRequest::GetOrders { .. } => SoapOperation::GetOrders,
            SoapRequest::CreateOrder(_) => SoapOperation::CreateOrder,
            SoapRequest::UpdateOrder { .. } => SoapOperation::UpdateOrder,
            SoapRequest::DeleteOrder { .. } => SoapOperation::DeleteOrder,
        }
    }

    fn payload(&self) -> Vec<XmlNode> {
        match self {
            SoapRequest::GetOrders {
                page_number,
                page_size,
            } => vec![
                XmlNode::text("tem:pageNumber", page_number.to_string()),
                XmlNode::text("tem:pageSize", page_size.to_string()),
            ],
            SoapRequest::CreateOrder(draft) => vec![order_body(None, draft)],
            SoapRequest::UpdateOrder { id, draft } => vec![
                XmlNode::text("tem:id", id.as_str()),
                order_body(Some(id), draft),
            ],
            SoapRequest::DeleteOrder { id } => vec![XmlNode::text("tem:id", id.as_str())],
        }
    }
}

// Children carry the d4p1 prefix bound on `tem:order`, so they land in the
// data-contract namespace rather than tempuri's.
fn order_body(id: Option<&OrderId>, draft: &OrderDraft) -> XmlNode {
    let mut order = XmlNode::new("tem:order").with_attribute("xmlns:d4p1", ORDER_MODELS_NS);
    if let Some(id) = id {
        order = order.with_child(XmlNode::text(ORDER_ID_TAG, id.as_str()));
    }
    order
        .with_child(XmlNode::text(PRODUCT_NAME_TAG, draft.product_name.as_str()))
        .with_child(XmlNode::text(QUANTITY_TAG, draft.quantity.to_string()))
        .with_child(XmlNode::text(STATUS_TAG, draft.status.as_str()))
}

/// Wraps `payload` in `<tem:{operation}>` inside the standard envelope.
pub fn build_envelope(operation: SoapOperation, payload: Vec<XmlNode>) -> XmlNode {
    let call = XmlNode::new(format!("tem:{}", operation.name())).with_children(payload);
    XmlNode::new("soap:Envelope")
        .with_attribute("xmlns:soap", SOAP_ENVELOPE_NS)
        .with_attribute("xmlns:tem", TEMPURI_NS)
        .with_child(XmlNode::new("soap:Header"))
        .with_child(XmlNode::new("soap:Body").with_child(call))
}

pub fn encode_request(request: &SoapRequest) -> Result<String, SoapError> {
    write_document(&build_envelope(request.operation(), request.payload()))
}

/// Decodes a request envelope. `hint` comes from the `SOAPAction` header and
/// wins over the body element name when present.
pub fn decode_request(xml: &str, hint: Option<SoapOperation>) -> Result<SoapRequest, SoapError> {
    let root = parse_document(xml)?;
    let body = root
        .find_local("Body")
        .ok_or(SoapError::MissingOperation)?;
    let call = body
        .child_elements()
        .next()
        .ok_or(SoapError::MissingOperation)?;
    let operation = match hint {
        Some(operation) => operation,
        None => call
            .local_name()
            .parse::<SoapOperation>()
            .map_err(|_| SoapError::Fault(format!("unknown operation {}", call.local_name())))?,
    };

    match operation {
        SoapOperation::GetOrders => Ok(SoapRequest::GetOrders {
            page_number: optional_u32(call, "pageNumber")?.unwrap_or(DEFAULT_PAGE_NUMBER),
            page_size: optional_u32(call, "pageSize")?.unwrap_or(DEFAULT_PAGE_SIZE),
        }),
        SoapOperation::CreateOrder => Ok(SoapRequest::CreateOrder(read_draft(call)?)),
        SoapOperation::UpdateOrder => {
            let draft = read_draft(call)?;
            let id = request_id(call)
                .or_else(|| {
                    call.find_local("order")
                        .and_then(|order| order.find_local("Id"))
                        .map(|node| OrderId::new(node.text_content().trim()))
                })
                .ok_or_else(|| missing(call, "id"))?;
            Ok(SoapRequest::UpdateOrder { id, draft })
        }
        SoapOperation::DeleteOrder => Ok(SoapRequest::DeleteOrder {
            id: request_id(call).ok_or_else(|| missing(call, "id"))?,
        }),
    }
}

fn request_id(call: &XmlNode) -> Option<OrderId> {
    call.child_elements()
        .find(|node| node.local_name() == "id")
        .map(|node| OrderId::new(node.text_content().trim()))
}

fn optional_u32(parent: &XmlNode, local: &str) -> Result<Option<u32>, SoapError> {
    parent
        .find_local(local)
        .map(|node| parse_number(parent, node))
        .transpose()
}

// Order fields are matched by local name so unprefixed children are accepted too.
fn read_draft(call: &XmlNode) -> Result<OrderDraft, SoapError> {
    let order = call
        .find_local("order")
        .ok_or_else(|| missing(call, "order"))?;
    let field = |local: &str| {
        order
            .find_local(local)
            .ok_or_else(|| missing(order, local))
    };
    Ok(OrderDraft {
        product_name: field("ProductName")?.text_content(),
        quantity: parse_number(order, field("Quantity")?)?,
        status: field("Status")?.text_content(),
    })
}

fn parse_number(parent: &XmlNode, node: &XmlNode) -> Result<u32, SoapError> {
    let raw = node.text_content();
    raw.trim()
        .parse()
        .map_err(|_| SoapError::InvalidNumber {
            element: parent.name.clone(),
            value: raw,
        })
}

fn missing(element: &XmlNode, field: &str) -> SoapError {
    SoapError::MissingField {
        element: element.name.clone(),
        field: field.to_string(),
    }
}

/// Returns the fault string when the document carries a `Fault` element.
pub fn fault_message(root: &XmlNode) -> Option<String> {
    let fault = if root.local_name() == "Fault" {
        root
    } else {
        root.find_local("Fault")?
    };
    let message = fault
        .find_local("faultstring")
        .map(XmlNode::text_content)
        .unwrap_or_else(|| fault.text_content());
    Some(message.trim().to_string())
}

/// Extracts every `d4p1:Order` element of a `GetOrders` response, in
/// document order.
pub fn decode_orders_response(xml: &str) -> Result<Vec<Order>, SoapError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let root = parse_document(xml)?;
    if let Some(message) = fault_message(&root) {
        return Err(SoapError::Fault(message));
    }

    root.elements_named(ORDER_TAG)
        .into_iter()
        .map(|element| -> Result<Order, SoapError> {
            let field = |tag: &str| {
                element
                    .find(tag)
                    .map(XmlNode::text_content)
                    .ok_or_else(|| missing(element, tag))
            };
            let quantity = field(QUANTITY_TAG)?;
            Ok(Order {
                id: OrderId::new(field(ORDER_ID_TAG)?),
                product_name: field(PRODUCT_NAME_TAG)?,
                quantity: quantity
                    .trim()
                    .parse()
                    .map_err(|_| SoapError::InvalidNumber {
                        element: element.name.clone(),
                        value: quantity.clone(),
                    })?,
                status: field(STATUS_TAG)?,
            })
        })
        .collect()
}

/// Checks a mutation response for a fault; the payload is otherwise ignored.
///
/// Only a well-formed document carrying a `Fault` is an error. Empty or
/// non-XML bodies count as an acknowledgement.
pub fn decode_ack_response(xml: &str) -> Result<(), SoapError> {
    let Ok(root) = parse_document(xml) else {
        return Ok(());
    };
    match fault_message(&root) {
        Some(message) => Err(SoapError::Fault(message)),
        None => Ok(()),
    }
}

fn response_envelope(body: XmlNode) -> XmlNode {
    XmlNode::new("s:Envelope")
        .with_attribute("xmlns:s", SOAP_ENVELOPE_NS)
        .with_child(XmlNode::new("s:Body").with_child(body))
}

fn order_element(order: &Order) -> XmlNode {
    XmlNode::new(ORDER_TAG)
        .with_child(XmlNode::text(ORDER_ID_TAG, order.id.as_str()))
        .with_child(XmlNode::text(PRODUCT_NAME_TAG, order.product_name.as_str()))
        .with_child(XmlNode::text(QUANTITY_TAG, order.quantity.to_string()))
        .with_child(XmlNode::text(STATUS_TAG, order.status.as_str()))
}

fn result_element(operation: SoapOperation) -> XmlNode {
    XmlNode::new(format!("{}Result", operation.name()))
        .with_attribute("xmlns:d4p1", ORDER_MODELS_NS)
        .with_attribute("xmlns:i", XML_SCHEMA_INSTANCE_NS)
}

/// Builds a `{Operation}Response` envelope. `orders` becomes the result
/// payload; an operation without a result (delete) passes an empty slice.
pub fn encode_response(operation: SoapOperation, orders: &[Order]) -> Result<String, SoapError> {
    let mut response =
        XmlNode::new(format!("{}Response", operation.name())).with_attribute("xmlns", TEMPURI_NS);
    match operation {
        SoapOperation::GetOrders => {
            response = response.with_child(
                result_element(operation).with_children(orders.iter().map(order_element)),
            );
        }
        SoapOperation::CreateOrder | SoapOperation::UpdateOrder => {
            if let Some(order) = orders.first() {
                let mut result = result_element(operation);
                result.content = order_element(order).content;
                response = response.with_child(result);
            }
        }
        SoapOperation::DeleteOrder => {}
    }
    write_document(&response_envelope(response))
}

pub fn encode_fault(code: &str, message: &str) -> Result<String, SoapError> {
    let fault = XmlNode::new("s:Fault")
        .with_child(XmlNode::text("faultcode", code))
        .with_child(XmlNode::text("faultstring", message));
    write_document(&response_envelope(fault))
}

#[cfg(test)]
#[path = "tests/soap_tests.rs"]
mod tests;
