use super::*;

const FOUR_ORDERS: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <GetOrdersResponse xmlns="http://tempuri.org/">
      <GetOrdersResult xmlns:d4p1="http://schemas.datacontract.org/2004/07/RestApiWithDb.Models" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <d4p1:Order><d4p1:Id>1</d4p1:Id><d4p1:ProductName>Widget</d4p1:ProductName><d4p1:Quantity>3</d4p1:Quantity><d4p1:Status>Pending</d4p1:Status></d4p1:Order>
        <d4p1:Order><d4p1:Id>2</d4p1:Id><d4p1:ProductName>Gadget &amp; Co</d4p1:ProductName><d4p1:Quantity>0</d4p1:Quantity><d4p1:Status>Shipped</d4p1:Status></d4p1:Order>
        <d4p1:Order><d4p1:Id>7</d4p1:Id><d4p1:ProductName><![CDATA[<Bolt>]]></d4p1:ProductName><d4p1:Quantity> 12 </d4p1:Quantity><d4p1:Status></d4p1:Status></d4p1:Order>
        <d4p1:Order><d4p1:Status>Open</d4p1:Status><d4p1:Quantity>5</d4p1:Quantity><d4p1:ProductName>Nut</d4p1:ProductName><d4p1:Id>abc-9</d4p1:Id></d4p1:Order>
      </GetOrdersResult>
    </GetOrdersResponse>
  </s:Body>
</s:Envelope>"#;

#[test]
fn decodes_four_orders_in_document_order() {
    let orders = decode_orders_response(FOUR_ORDERS).expect("orders");
    assert_eq!(
        orders,
        vec![
            Order {
                id: OrderId::new("1"),
                product_name: "Widget".into(),
                quantity: 3,
                status: "Pending".into(),
            },
            Order {
                id: OrderId::new("2"),
                product_name: "Gadget & Co".into(),
                quantity: 0,
                status: "Shipped".into(),
            },
            Order {
                id: OrderId::new("7"),
                product_name: "<Bolt>".into(),
                quantity: 12,
                status: String::new(),
            },
            Order {
                id: OrderId::new("abc-9"),
                product_name: "Nut".into(),
                quantity: 5,
                status: "Open".into(),
            },
        ]
    );
}

#[test]
fn response_without_orders_is_an_empty_list() {
    let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><GetOrdersResponse xmlns="http://tempuri.org/"><GetOrdersResult/></GetOrdersResponse></s:Body></s:Envelope>"#;
    assert!(decode_orders_response(xml).expect("orders").is_empty());
    assert!(decode_orders_response("  ").expect("orders").is_empty());
}

#[test]
fn missing_child_fails_the_whole_list() {
    let xml = r#"<r xmlns:d4p1="x"><d4p1:Order><d4p1:Id>1</d4p1:Id><d4p1:Quantity>1</d4p1:Quantity><d4p1:Status>s</d4p1:Status></d4p1:Order></r>"#;
    let err = decode_orders_response(xml).expect_err("must fail");
    assert!(matches!(
        err,
        SoapError::MissingField { ref field, .. } if field == PRODUCT_NAME_TAG
    ));
}

#[test]
fn non_numeric_quantity_is_rejected() {
    let xml = r#"<r xmlns:d4p1="x"><d4p1:Order><d4p1:Id>1</d4p1:Id><d4p1:ProductName>a</d4p1:ProductName><d4p1:Quantity>lots</d4p1:Quantity><d4p1:Status>s</d4p1:Status></d4p1:Order></r>"#;
    assert!(matches!(
        decode_orders_response(xml),
        Err(SoapError::InvalidNumber { .. })
    ));
}

#[test]
fn malformed_xml_is_reported() {
    assert!(matches!(
        decode_orders_response("<a><b></a>"),
        Err(SoapError::Malformed(_))
    ));
    assert!(matches!(
        decode_orders_response("<a>"),
        Err(SoapError::Malformed(_))
    ));
}

#[test]
fn fault_is_surfaced_with_its_message() {
    let xml = encode_fault("s:Client", "order 5 not found").expect("fault");
    assert!(matches!(
        decode_orders_response(&xml),
        Err(SoapError::Fault(ref message)) if message == "order 5 not found"
    ));
    assert!(matches!(
        decode_ack_response(&xml),
        Err(SoapError::Fault(_))
    ));
}

#[test]
fn get_orders_envelope_has_expected_shape() {
    let xml = encode_request(&SoapRequest::GetOrders {
        page_number: 1,
        page_size: 10,
    })
    .expect("xml");
    assert_eq!(
        xml,
        concat!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:tem="http://tempuri.org/">"#,
            "<soap:Header/><soap:Body><tem:GetOrders>",
            "<tem:pageNumber>1</tem:pageNumber><tem:pageSize>10</tem:pageSize>",
            "</tem:GetOrders></soap:Body></soap:Envelope>"
        )
    );
}

#[test]
fn create_envelope_omits_id_and_update_envelope_carries_it() {
    let draft = OrderDraft::new("Widget", 4, "New");

    let create_xml = encode_request(&SoapRequest::CreateOrder(draft.clone())).expect("xml");
    let create = parse_document(&create_xml).expect("parse");
    let call = create.find("tem:CreateOrder").expect("call");
    assert!(call.find("tem:id").is_none());
    let order = call.find("tem:order").expect("order");
    assert_eq!(order.attribute("xmlns:d4p1"), Some(ORDER_MODELS_NS));
    assert!(order.find(ORDER_ID_TAG).is_none());
    assert_eq!(order.find(PRODUCT_NAME_TAG).expect("name").text_content(), "Widget");

    let update = parse_document(
        &encode_request(&SoapRequest::UpdateOrder {
            id: OrderId::new("31"),
            draft,
        })
        .expect("xml"),
    )
    .expect("parse");
    let call = update.find("tem:UpdateOrder").expect("call");
    let names: Vec<&str> = call.child_elements().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["tem:id", "tem:order"]);
    assert_eq!(call.find("tem:id").expect("id").text_content(), "31");
    assert_eq!(call.find(ORDER_ID_TAG).expect("order id").text_content(), "31");
    assert_eq!(call.find(QUANTITY_TAG).expect("qty").text_content(), "4");
}

#[test]
fn markup_in_fields_is_escaped() {
    let xml = encode_request(&SoapRequest::CreateOrder(OrderDraft::new(
        "</tem:order><evil/>",
        1,
        "a & b",
    )))
    .expect("xml");
    assert!(!xml.contains("<evil/>"));

    let decoded = decode_request(&xml, None).expect("decode");
    assert_eq!(
        decoded,
        SoapRequest::CreateOrder(OrderDraft::new("</tem:order><evil/>", 1, "a & b"))
    );
}

#[test]
fn decode_request_prefers_header_hint_and_accepts_unprefixed_fields() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:tem="http://tempuri.org/">
      <soap:Header/>
      <soap:Body>
        <tem:UpdateOrder>
          <tem:id>8</tem:id>
          <tem:order xmlns:d4p1="http://schemas.datacontract.org/2004/07/RestApiWithDb.Models">
            <Id>8</Id>
            <ProductName>Lamp</ProductName>
            <Quantity>2</Quantity>
            <Status>Open</Status>
          </tem:order>
        </tem:UpdateOrder>
      </soap:Body>
    </soap:Envelope>"#;

    let decoded = decode_request(xml, Some(SoapOperation::UpdateOrder)).expect("decode");
    assert_eq!(
        decoded,
        SoapRequest::UpdateOrder {
            id: OrderId::new("8"),
            draft: OrderDraft::new("Lamp", 2, "Open"),
        }
    );
}

#[test]
fn get_orders_request_defaults_paging() {
    let xml = write_document(&build_envelope(SoapOperation::GetOrders, Vec::new())).expect("xml");
    assert_eq!(
        decode_request(&xml, None).expect("decode"),
        SoapRequest::GetOrders {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    );
}

#[test]
fn encoded_list_response_decodes_back_to_orders() {
    let orders = vec![
        OrderDraft::new("Widget", 1, "Open").with_id(OrderId::new("1")),
        OrderDraft::new("Gadget", 2, "Closed").with_id(OrderId::new("2")),
    ];
    let xml = encode_response(SoapOperation::GetOrders, &orders).expect("xml");
    assert_eq!(decode_orders_response(&xml).expect("orders"), orders);
    let ack = encode_response(SoapOperation::DeleteOrder, &[]).expect("xml");
    assert!(decode_ack_response(&ack).is_ok());
}

#[test]
fn ack_accepts_bodies_that_are_not_xml() {
    assert!(decode_ack_response("").is_ok());
    assert!(decode_ack_response("OK").is_ok());
    assert!(decode_ack_response("<unclosed>").is_ok());
}
